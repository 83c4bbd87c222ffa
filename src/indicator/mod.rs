//! Feedback indicators driven by state changes.
//!
//! - `visual`: preloaded icon per state, pushed to an [`IconSetter`]
//! - `audio`: WAV per transition, played through a [`PlaybackSink`]
//! - `coordinator`: subscribes to the state machine and runs both in parallel

pub mod audio;
pub mod coordinator;
pub mod error;
pub mod icon;
pub mod playback;
pub mod visual;
pub mod wav;

pub use audio::{sound_file_name, AudioIndicator, WavAudioIndicator};
pub use coordinator::IndicatorCoordinator;
pub use error::IndicatorError;
pub use icon::{FileIconSetter, IconSetter};
pub use playback::{CpalPlayback, PlaybackSink};
pub use visual::{icon_file_name, FileVisualIndicator, VisualIndicator};
pub use wav::PcmBuffer;
