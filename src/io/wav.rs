use std::fs;
use std::io::{Seek, Write};
use std::path::Path;

use tracing::{info, instrument};

use crate::error::{Error, RenderStage, Result};
use crate::render::RenderedAudio;

/// Write rendered audio as mono 16-bit PCM.
#[instrument(skip(audio), fields(path = %path.display(), frames = audio.samples.len()))]
pub fn write_wav(audio: &RenderedAudio, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| Error::render(RenderStage::Output, err))?;
    }
    let file = fs::File::create(path).map_err(|err| Error::render(RenderStage::Output, err))?;
    encode_wav(audio, std::io::BufWriter::new(file))?;
    info!("wav written");
    Ok(())
}

pub fn encode_wav<W: Write + Seek>(audio: &RenderedAudio, sink: W) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let output = |err: hound::Error| Error::render(RenderStage::Output, err);

    let mut writer = hound::WavWriter::new(sink, spec).map_err(output)?;
    for sample in &audio.samples {
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer.write_sample(quantized).map_err(output)?;
    }
    writer.finalize().map_err(output)?;
    Ok(())
}
