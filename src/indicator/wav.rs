//! WAV decoding for feedback sounds.
//!
//! Only integer PCM up to 16 bits is accepted; everything is widened to
//! interleaved `i16` so the playback sink sees a single sample format.

use hound::{SampleFormat, WavReader};
use std::io::Cursor;
use std::time::Duration;

use super::error::IndicatorError;

/// Size of the canonical RIFF/WAVE header (RIFF + fmt + data descriptors).
pub const MIN_WAV_LEN: usize = 44;

/// Decoded, interleaved PCM ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl PcmBuffer {
    /// Duplicate every sample into a left/right pair. No-op unless mono.
    pub fn upmix_to_stereo(self) -> Self {
        if self.channels != 1 {
            return self;
        }

        let samples = self.samples.iter().flat_map(|&s| [s, s]).collect();
        Self {
            samples,
            channels: 2,
            sample_rate: self.sample_rate,
        }
    }

    pub fn duration(&self) -> Duration {
        let samples_per_sec = u64::from(self.sample_rate) * u64::from(self.channels.max(1));
        if samples_per_sec == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / samples_per_sec as f64)
    }
}

#[derive(Debug, Clone)]
pub struct DecodedSound {
    pub buffer: PcmBuffer,
    /// Bytes per second as declared by the source format.
    pub byte_rate: u32,
    /// Length of the source `data` chunk in bytes.
    pub data_len: usize,
}

impl DecodedSound {
    /// How long the source takes to play: `data_len / byte_rate`.
    pub fn playback_duration(&self) -> Duration {
        if self.byte_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.data_len as f64 / f64::from(self.byte_rate))
    }
}

pub fn decode(bytes: &[u8]) -> Result<DecodedSound, IndicatorError> {
    if bytes.len() < MIN_WAV_LEN {
        return Err(IndicatorError::Format(format!(
            "file too small to be a WAV file ({} bytes)",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(IndicatorError::Format(
            "missing RIFF/WAVE tags".to_string(),
        ));
    }

    let reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| IndicatorError::Format(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample > 16 {
        return Err(IndicatorError::Format(format!(
            "unsupported sample format: {:?} {}-bit",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    // hound hands back 8-bit samples in i8 range; scale them to 16-bit.
    let shift = 16 - u32::from(spec.bits_per_sample);
    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| v << shift))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IndicatorError::Format(e.to_string()))?;

    let bytes_per_sample = u32::from(spec.bits_per_sample).div_ceil(8);
    let byte_rate = spec.sample_rate * u32::from(spec.channels) * bytes_per_sample;
    let data_len = samples.len() * bytes_per_sample as usize;

    Ok(DecodedSound {
        buffer: PcmBuffer {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        },
        byte_rate,
        data_len,
    })
}
