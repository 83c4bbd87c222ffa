//! Audio feedback: a short sound per state transition.
//!
//! Sounds are cosmetic. Whatever goes wrong while loading or playing one is
//! logged and swallowed so the transition that triggered it is unaffected.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Span};

use super::error::IndicatorError;
use super::playback::PlaybackSink;
use super::wav;
use crate::state::State;

#[async_trait]
pub trait AudioIndicator: Send + Sync {
    async fn play_sound(&self, from: State, to: State) -> Result<(), IndicatorError>;
}

/// Sound file for a transition, if it has one.
pub fn sound_file_name(from: State, to: State) -> Option<&'static str> {
    match (from, to) {
        (State::Idle, State::Recording) => Some("start_recording.wav"),
        (State::Recording, State::Processing) => Some("stop_recording.wav"),
        (State::Processing, State::Idle) => Some("processing_done.wav"),
        _ => None,
    }
}

/// Reads WAV files on demand and plays them through a [`PlaybackSink`].
///
/// `play_sound` returns only after the sound's duration has elapsed, even
/// though the sink itself plays asynchronously.
pub struct WavAudioIndicator {
    sink: Arc<dyn PlaybackSink>,
    sounds_dir: PathBuf,
    span: Span,
}

impl WavAudioIndicator {
    pub fn new(sink: Arc<dyn PlaybackSink>, sounds_dir: impl Into<PathBuf>) -> Self {
        let sounds_dir = sounds_dir.into();
        let span = tracing::info_span!("audio_indicator");
        info!(parent: &span, "Audio indicator using sounds from {:?}", sounds_dir);

        Self {
            sink,
            sounds_dir,
            span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn play_file(&self, path: &Path) -> Result<(), IndicatorError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IndicatorError::SoundUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let sound = wav::decode(&bytes)?;
        let wait = sound.playback_duration();

        let mut buffer = sound.buffer;
        if self.sink.channels() == 2 && buffer.channels == 1 {
            buffer = buffer.upmix_to_stereo();
        }

        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || sink.submit(buffer))
            .await
            .map_err(|e| IndicatorError::Playback(e.into()))?
            .map_err(IndicatorError::Playback)?;

        debug!(parent: &self.span, "Waiting {:?} for playback of {:?}", wait, path);
        tokio::time::sleep(wait).await;

        info!(parent: &self.span, "Audio feedback played: {:?}", path);
        Ok(())
    }
}

#[async_trait]
impl AudioIndicator for WavAudioIndicator {
    async fn play_sound(&self, from: State, to: State) -> Result<(), IndicatorError> {
        let Some(file_name) = sound_file_name(from, to) else {
            debug!(parent: &self.span, from = %from, to = %to, "No sound for transition");
            return Ok(());
        };

        let path = self.sounds_dir.join(file_name);
        if let Err(e) = self.play_file(&path).await {
            warn!(parent: &self.span, "Failed to play audio feedback {:?}: {:#}", path, anyhow::Error::from(e));
        }

        Ok(())
    }
}
