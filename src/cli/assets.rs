//! CLI handler for validating feedback assets.
//!
//! Loads icons the same way the service does and decodes every sound the
//! service could play, so a broken install shows up before the first
//! hotkey press.

use crate::config::Config;
use crate::global;
use crate::indicator::{sound_file_name, wav, FileVisualIndicator, IconSetter};
use crate::state::State;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;

use super::args::CheckAssetsCliArgs;

#[derive(Debug, Default)]
pub struct AssetReport {
    pub lines: Vec<String>,
    pub failures: usize,
}

impl AssetReport {
    fn ok(&mut self, line: String) {
        self.lines.push(format!("  ok    {line}"));
    }

    fn fail(&mut self, line: String) {
        self.failures += 1;
        self.lines.push(format!("  FAIL  {line}"));
    }
}

pub fn handle_check_assets_command(args: CheckAssetsCliArgs, config: &Config) -> Result<()> {
    let dir = args.dir.as_deref().or(config.assets.dir.as_deref());
    let assets = global::assets_dir(dir);
    println!("Checking assets in {}\n", assets.display());

    let report = check_assets(&assets);
    for line in &report.lines {
        println!("{line}");
    }

    if report.failures > 0 {
        return Err(anyhow!("{} asset(s) failed validation", report.failures));
    }

    println!("\nAll assets OK");
    Ok(())
}

pub fn check_assets(assets: &Path) -> AssetReport {
    let mut report = AssetReport::default();

    let discard: Arc<dyn IconSetter> = Arc::new(|_: &[u8]| -> Result<()> { Ok(()) });
    match FileVisualIndicator::new(discard, assets.join("icons")) {
        Ok(_) => report.ok(format!("icons ({} states)", State::ALL.len())),
        Err(e) => report.fail(format!("icons: {:#}", anyhow::Error::from(e))),
    }

    let sounds = assets.join("sounds");
    for from in State::ALL {
        for to in State::ALL {
            let Some(name) = sound_file_name(from, to) else {
                continue;
            };
            let path = sounds.join(name);
            let checked = std::fs::read(&path)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| wav::decode(&bytes).map_err(anyhow::Error::from));
            match checked {
                Ok(sound) => report.ok(format!(
                    "{name} ({from} -> {to}, {}ch {}Hz, {:.2}s)",
                    sound.buffer.channels,
                    sound.buffer.sample_rate,
                    sound.playback_duration().as_secs_f64()
                )),
                Err(e) => report.fail(format!("{name} ({from} -> {to}): {e:#}")),
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::icon_file_name;
    use crate::indicator::wav::tests::wav_bytes;

    fn populate(dir: &Path) {
        let icons = dir.join("icons");
        let sounds = dir.join("sounds");
        std::fs::create_dir_all(&icons).unwrap();
        std::fs::create_dir_all(&sounds).unwrap();
        for state in State::ALL {
            std::fs::write(icons.join(icon_file_name(state)), b"icon").unwrap();
        }
        for name in [
            "start_recording.wav",
            "stop_recording.wav",
            "processing_done.wav",
        ] {
            std::fs::write(sounds.join(name), wav_bytes(1, 8000, &[0; 800])).unwrap();
        }
    }

    #[test]
    fn test_complete_assets_pass() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let report = check_assets(dir.path());
        assert_eq!(report.failures, 0, "{:?}", report.lines);
        assert_eq!(report.lines.len(), 4);
    }

    #[test]
    fn test_missing_icon_and_bad_sound_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        std::fs::remove_file(dir.path().join("icons").join(icon_file_name(State::Processing)))
            .unwrap();
        std::fs::write(dir.path().join("sounds/stop_recording.wav"), b"not a wav").unwrap();

        let report = check_assets(dir.path());
        assert_eq!(report.failures, 2);
    }
}
