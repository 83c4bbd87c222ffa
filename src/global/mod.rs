use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const APP_DIR: &str = "vox";
const ASSETS_DIR: &str = "assets";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".local").join("share").join(APP_DIR));
    }
    Err(anyhow!("Unable to determine data directory"))
}

pub fn default_icon_output() -> Result<PathBuf> {
    Ok(data_dir()?.join("tray_icon.png"))
}

pub fn default_log_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("vox.log"))
}

/// Locate the asset root holding `icons/` and `sounds/`.
///
/// An explicitly configured directory wins. Otherwise look in the working
/// directory, next to the executable, then one level above it.
pub fn assets_dir(configured: Option<&str>) -> PathBuf {
    if let Some(dir) = configured {
        return PathBuf::from(dir);
    }

    let cwd = std::env::current_dir().ok();
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let candidates = cwd
        .iter()
        .map(|dir| dir.join(ASSETS_DIR))
        .chain(exe_dir.iter().flat_map(|dir| {
            [dir.join(ASSETS_DIR), dir.join("..").join(ASSETS_DIR)]
        }));

    find_existing(candidates).unwrap_or_else(|| {
        warn!("Assets directory not found, using default: {}", ASSETS_DIR);
        PathBuf::from(ASSETS_DIR)
    })
}

fn find_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    let found = candidates.into_iter().find(|dir| dir.is_dir())?;
    info!("Assets found at {:?}", found);
    Some(found)
}
