use std::io::{Read, Seek};
use std::path::Path;

/// A decoded mono sample at the render sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    frames: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, frames: Vec<f32>) -> Self {
        Self { sample_rate, frames }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate.max(1) as f64
    }

    /// Load a WAV file, mix it down to mono and resample to `target_rate`.
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, hound::Error> {
        let reader = hound::WavReader::open(path)?;
        Self::decode(reader, target_rate)
    }

    pub fn decode_wav<R: Read + Seek>(source: R, target_rate: u32) -> Result<Self, hound::Error> {
        let reader = hound::WavReader::new(source)?;
        Self::decode(reader, target_rate)
    }

    fn decode<R: Read>(mut reader: hound::WavReader<R>, target_rate: u32) -> Result<Self, hound::Error> {
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<_, _>>()?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mono: Vec<f32> = samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self {
            sample_rate: target_rate,
            frames: resample_linear(&mono, spec.sample_rate, target_rate),
        })
    }
}

/// Linear-interpolation resampler. Good enough for loops and ambience beds.
pub fn resample_linear(frames: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || source_rate == 0 || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let frac = (src_pos - idx as f64) as f32;
            frames[idx] * (1.0 - frac) + frames[idx + 1] * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn stereo_is_mixed_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[16_384, 0, 16_384, 0]);
        let buffer = SampleBuffer::decode_wav(Cursor::new(bytes), 8_000).unwrap();

        assert_eq!(buffer.len(), 2);
        assert!((buffer.frames()[0] - 0.25).abs() < 1e-4);
    }

    #[test]
    fn decoding_resamples_to_target() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &vec![1_000; 22_050]);
        let buffer = SampleBuffer::decode_wav(Cursor::new(bytes), 44_100).unwrap();

        assert_eq!(buffer.sample_rate(), 44_100);
        assert_eq!(buffer.len(), 44_100);
        assert!((buffer.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn resampling_interpolates_between_frames() {
        let out = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn garbage_is_an_error() {
        let result = SampleBuffer::decode_wav(Cursor::new(b"not a wav".to_vec()), 44_100);
        assert!(result.is_err());
    }
}
