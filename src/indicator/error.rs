use std::path::PathBuf;

use crate::state::State;

#[derive(Debug, thiserror::Error)]
pub enum IndicatorError {
    /// A required icon could not be read at construction time.
    #[error("icon asset missing or unreadable: {}", path.display())]
    AssetMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no icon loaded for state {0}")]
    NotFound(State),

    #[error("failed to set icon for state {state}")]
    IconSet {
        state: State,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read sound file {}", path.display())]
    SoundUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid WAV data: {0}")]
    Format(String),

    #[error("audio playback failed")]
    Playback(#[source] anyhow::Error),
}
