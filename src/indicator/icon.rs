//! Icon output capability.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Something that can display icon bytes (tray, status bar, file).
pub trait IconSetter: Send + Sync {
    fn set_icon(&self, icon: &[u8]) -> Result<()>;
}

impl<F> IconSetter for F
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    fn set_icon(&self, icon: &[u8]) -> Result<()> {
        self(icon)
    }
}

/// Publishes the current icon as a file for status bar widgets to pick up.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a half-written image.
pub struct FileIconSetter {
    path: PathBuf,
}

impl FileIconSetter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IconSetter for FileIconSetter {
    fn set_icon(&self, icon: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create icon output directory")?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, icon)
            .with_context(|| format!("Failed to write icon to {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move icon into place at {:?}", self.path))?;

        debug!("Icon published to {:?} ({} bytes)", self.path, icon.len());
        Ok(())
    }
}
