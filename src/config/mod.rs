use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assets: AssetsConfig,
    pub audio: AudioConfig,
    pub visual: VisualConfig,
    pub ui: UiConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory containing `icons/` and `sounds/`. Discovered when unset.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Playback volume, 0.0 to 1.0
    pub volume: f32,
    /// Assumed output channel count when the device cannot report its own.
    /// Mono sounds are up-mixed when the output is stereo.
    pub output_channels: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub enabled: bool,
    /// File the current state icon is published to.
    pub icon_output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub waybar: WaybarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaybarConfig {
    pub idle_text: String,
    pub recording_text: String,
    pub processing_text: String,
    pub idle_tooltip: String,
    pub recording_tooltip: String,
    pub processing_tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// debug, info, warn, error
    pub level: String,
    /// Also append logs to a file.
    pub to_file: bool,
    /// Log file path (default: `<data dir>/vox.log`).
    pub file: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
            output_channels: 2,
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            icon_output: None,
        }
    }
}

impl Default for WaybarConfig {
    fn default() -> Self {
        Self {
            idle_text: "󰑊".to_string(),       // Nerd Font circle with dot (idle)
            recording_text: "󰻃".to_string(),  // Nerd Font record button (recording)
            processing_text: "󰦖".to_string(), // Nerd Font progress clock
            idle_tooltip: "Press Alt+Shift+V to record".to_string(),
            recording_tooltip: "Recording... Press Alt+Shift+V to stop".to_string(),
            processing_tooltip: "Processing recording".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3737 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: true,
            file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = global::config_file()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Where logs are appended, or `None` when file logging is off.
    pub fn log_file_path(&self) -> Result<Option<PathBuf>> {
        if !self.logging.to_file {
            return Ok(None);
        }
        match &self.logging.file {
            Some(path) => Ok(Some(PathBuf::from(path))),
            None => global::default_log_file().map(Some),
        }
    }

    pub fn icon_output_path(&self) -> Result<PathBuf> {
        match &self.visual.icon_output {
            Some(path) => Ok(PathBuf::from(path)),
            None => global::default_icon_output(),
        }
    }
}
