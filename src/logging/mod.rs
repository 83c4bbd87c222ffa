//! Tracing setup for the binary: stdout plus an optional append-only file.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins, then `-v` (debug), then the configured level. A log file
/// that cannot be opened only costs the file output.
pub fn init(verbose: bool, config: &Config) -> Result<()> {
    let log_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file, file_error) = match config.log_file_path() {
        Ok(Some(path)) => match open_log_file(&path) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        },
        Ok(None) => (None, None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file.map(file_layer))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(e) = file_error {
        warn!("File logging disabled: {:#}", e);
    }
    Ok(())
}

pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))
}

/// Plain-text fmt layer writing to `file`.
pub fn file_layer<S>(file: File) -> fmt::Layer<S, DefaultFields, Format, Mutex<File>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().with_ansi(false).with_writer(Mutex::new(file))
}
