// Purpose - external interfaces: sample decoding, WAV output, live playback

#[cfg(feature = "playback")]
pub mod playback;
pub mod sample_buffer;
pub mod wav;

pub use sample_buffer::SampleBuffer;
pub use wav::{encode_wav, write_wav};
