//! CLI handler for generating placeholder feedback sounds.
//!
//! Writes short sine beeps for every transition that has a sound, so a fresh
//! install has something to play before real assets are dropped in.

use crate::config::Config;
use crate::global;
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tracing::info;

use super::args::GenerateSoundsCliArgs;

const SAMPLE_RATE: u32 = 44_100;
/// Peak amplitude; kept well under `i16::MAX` so the beeps are not harsh.
const AMPLITUDE: f64 = 16_000.0;

/// A placeholder beep: file name, pitch in Hz, length in milliseconds.
pub struct Tone {
    pub file_name: &'static str,
    pub frequency: f64,
    pub duration_ms: u32,
}

pub const PLACEHOLDER_TONES: [Tone; 3] = [
    Tone {
        file_name: "start_recording.wav",
        frequency: 800.0,
        duration_ms: 100,
    },
    Tone {
        file_name: "stop_recording.wav",
        frequency: 600.0,
        duration_ms: 100,
    },
    Tone {
        file_name: "processing_done.wav",
        frequency: 700.0,
        duration_ms: 150,
    },
];

pub fn handle_generate_sounds_command(args: GenerateSoundsCliArgs, config: &Config) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => PathBuf::from(dir),
        None => global::assets_dir(config.assets.dir.as_deref()).join("sounds"),
    };

    for path in generate_sounds(&dir)? {
        println!("Generated {}", path.display());
    }
    println!("\nPlaceholder sounds written to {}", dir.display());
    Ok(())
}

/// Write every placeholder tone into `dir`, replacing existing files.
pub fn generate_sounds(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).context("Failed to create sounds directory")?;

    PLACEHOLDER_TONES
        .iter()
        .map(|tone| {
            let path = dir.join(tone.file_name);
            write_tone(&path, tone)
                .with_context(|| format!("Failed to generate {}", tone.file_name))?;
            Ok(path)
        })
        .collect()
}

fn write_tone(path: &Path, tone: &Tone) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in tone_samples(tone) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!("Placeholder sound saved: {:?}", path);
    Ok(())
}

/// Sine wave with a linear fade over the first and last 10% to avoid clicks.
fn tone_samples(tone: &Tone) -> impl Iterator<Item = i16> + '_ {
    let count = (SAMPLE_RATE * tone.duration_ms / 1000) as usize;
    let fade = (count / 10).max(1);

    (0..count).map(move |i| {
        let t = i as f64 / f64::from(SAMPLE_RATE);
        let mut sample = (2.0 * PI * tone.frequency * t).sin();
        if i < fade {
            sample *= i as f64 / fade as f64;
        } else if i > count - fade {
            sample *= (count - i) as f64 / fade as f64;
        }
        (sample * AMPLITUDE) as i16
    })
}
