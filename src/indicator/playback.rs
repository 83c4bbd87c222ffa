//! Audio output capability and its cpal implementation.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::wav::PcmBuffer;

/// Extra time the stream is kept alive after the buffer has drained.
const DRAIN_MARGIN: Duration = Duration::from_millis(100);

/// Accepts decoded PCM and starts hardware playback.
///
/// `submit` returns once playback has started; it does not wait for the
/// buffer to finish.
pub trait PlaybackSink: Send + Sync {
    /// Channel count the output expects.
    fn channels(&self) -> u16;

    fn submit(&self, buffer: PcmBuffer) -> Result<()>;
}

/// Plays buffers on the default cpal output device.
///
/// Each submission gets its own stream on a short-lived thread, since cpal
/// streams are not `Send` on every platform.
pub struct CpalPlayback {
    channels: u16,
    volume: f32,
}

impl CpalPlayback {
    pub fn new(channels: u16, volume: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available for audio feedback")?;

        let device_channels = match device.default_output_config() {
            Ok(config) => Some(config.channels()),
            Err(e) => {
                warn!("Could not query output config, assuming {} channels: {}", channels, e);
                None
            }
        };
        let channels = output_channels(device_channels, channels);

        info!(
            "Audio feedback using device: {} ({} channels)",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            channels
        );

        Ok(Self {
            channels,
            volume: volume.clamp(0.0, 1.0),
        })
    }
}

/// The device's own channel count wins; `fallback` is used only when the
/// device cannot report one.
fn output_channels(device: Option<u16>, fallback: u16) -> u16 {
    device.filter(|&c| c > 0).unwrap_or(fallback).max(1)
}

impl PlaybackSink for CpalPlayback {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn submit(&self, buffer: PcmBuffer) -> Result<()> {
        let volume = self.volume;
        let (started_tx, started_rx) = mpsc::channel::<Result<()>>();

        thread::Builder::new()
            .name("vox-playback".to_string())
            .spawn(move || {
                let linger = buffer.duration() + DRAIN_MARGIN;
                match start_stream(buffer, volume) {
                    Ok(stream) => {
                        let _ = started_tx.send(Ok(()));
                        thread::sleep(linger);
                        debug!("Playback stream finished");
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = started_tx.send(Err(e));
                    }
                }
            })
            .context("Failed to spawn playback thread")?;

        started_rx
            .recv()
            .map_err(|_| anyhow!("Playback thread exited before starting"))?
    }
}

fn start_stream(buffer: PcmBuffer, volume: f32) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No output device available for audio feedback")?;

    let config = cpal::StreamConfig {
        channels: buffer.channels,
        sample_rate: cpal::SampleRate(buffer.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let samples: Vec<i16> = buffer
        .samples
        .iter()
        .map(|&s| (f32::from(s) * volume) as i16)
        .collect();
    let mut position = 0usize;

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
            for out in data.iter_mut() {
                *out = samples.get(position).copied().unwrap_or(0);
                position += 1;
            }
        },
        |err| error!("Playback stream error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_channels_take_precedence() {
        assert_eq!(output_channels(Some(2), 1), 2);
        assert_eq!(output_channels(Some(1), 2), 1);
    }

    #[test]
    fn test_fallback_when_device_unknown() {
        assert_eq!(output_channels(None, 2), 2);
        assert_eq!(output_channels(Some(0), 2), 2);
        assert_eq!(output_channels(None, 0), 1);
    }
}
