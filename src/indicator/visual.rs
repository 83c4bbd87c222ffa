//! Visual feedback: one icon per state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Span};

use super::error::IndicatorError;
use super::icon::IconSetter;
use crate::state::State;

#[async_trait]
pub trait VisualIndicator: Send + Sync {
    async fn update_icon(&self, state: State) -> Result<(), IndicatorError>;
}

#[cfg(windows)]
const ICON_EXT: &str = "ico";
#[cfg(not(windows))]
const ICON_EXT: &str = "png";

/// `idle_32.png`, `recording_32.png`, ... (`.ico` on Windows).
pub fn icon_file_name(state: State) -> String {
    format!("{}_32.{}", state.as_str(), ICON_EXT)
}

/// Icons are read once, up front. Construction fails if any state lacks an
/// icon, so a built indicator always has bytes for every state.
pub struct FileVisualIndicator {
    setter: Arc<dyn IconSetter>,
    icons: HashMap<State, Vec<u8>>,
    span: Span,
}

impl FileVisualIndicator {
    pub fn new(
        setter: Arc<dyn IconSetter>,
        icons_dir: impl AsRef<Path>,
    ) -> Result<Self, IndicatorError> {
        let span = tracing::info_span!("visual_indicator");
        let icons_dir = icons_dir.as_ref();
        info!(parent: &span, "Loading icons from {:?}", icons_dir);

        let mut icons = HashMap::with_capacity(State::ALL.len());
        for state in State::ALL {
            let path = icons_dir.join(icon_file_name(state));
            let data = std::fs::read(&path)
                .map_err(|source| IndicatorError::AssetMissing { path: path.clone(), source })?;
            info!(parent: &span, "Icon loaded: {:?} ({} bytes)", path, data.len());
            icons.insert(state, data);
        }

        Ok(Self {
            setter,
            icons,
            span,
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[async_trait]
impl VisualIndicator for FileVisualIndicator {
    async fn update_icon(&self, state: State) -> Result<(), IndicatorError> {
        let icon = self
            .icons
            .get(&state)
            .ok_or(IndicatorError::NotFound(state))?;

        self.setter
            .set_icon(icon)
            .map_err(|source| IndicatorError::IconSet { state, source })?;

        info!(parent: &self.span, state = %state, "Icon updated");
        Ok(())
    }
}
