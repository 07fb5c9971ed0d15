//! Live playback of a finished render through the default output device.
//!
//! The calling thread feeds samples into a lock-free ring buffer; the cpal
//! callback drains it, writing silence whenever the feeder falls behind.

use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{info, warn};

use crate::error::{Error, RenderStage, Result};
use crate::io::sample_buffer::resample_linear;
use crate::render::RenderedAudio;

const FEED_BACKOFF: Duration = Duration::from_millis(5);

/// Play `audio` and block until the device has consumed all of it.
pub fn play(audio: &RenderedAudio) -> Result<()> {
    let output = |err: &dyn std::fmt::Display| Error::render(RenderStage::Output, err.to_string());

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| output(&"no default output device available"))?;
    let config = device
        .default_output_config()
        .map_err(|err| output(&err))?;

    let device_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let samples = resample_linear(&audio.samples, audio.sample_rate, device_rate);

    // Half a second of headroom between feeder and callback.
    let capacity = (device_rate as usize / 2).max(1024);
    let (mut producer, mut consumer) = RingBuffer::<f32>::new(capacity);

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for frame in data.chunks_mut(channels) {
                    let sample = consumer.pop().unwrap_or(0.0);
                    frame.fill(sample);
                }
            },
            |err| warn!(%err, "audio output error"),
            None,
        )
        .map_err(|err| output(&err))?;
    stream.play().map_err(|err| output(&err))?;

    info!(
        device_rate,
        channels,
        seconds = audio.duration_seconds,
        "playback started"
    );

    for sample in samples {
        let mut pending = sample;
        while let Err(rtrb::PushError::Full(value)) = producer.push(pending) {
            pending = value;
            thread::sleep(FEED_BACKOFF);
        }
    }

    // Wait for the callback to drain what is left.
    while producer.slots() < capacity {
        thread::sleep(FEED_BACKOFF);
    }
    thread::sleep(Duration::from_millis(50));
    info!("playback finished");
    Ok(())
}
