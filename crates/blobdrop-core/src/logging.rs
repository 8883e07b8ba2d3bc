//! Tracing setup for the CLI.
//!
//! Everything at the chosen level is appended to one log file; warnings and
//! errors are also echoed to stderr so a failed save is visible at the terminal.
//! `RUST_LOG` overrides the level.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log file; `None` means `~/.local/state/blobdrop/blobdrop.log`.
    pub file: Option<PathBuf>,
    /// Level for blobdrop's own targets. Dependencies log at `warn`.
    pub level: Level,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            file: None,
            level: Level::INFO,
        }
    }
}

/// `~/.local/state/blobdrop/blobdrop.log` (parent created).
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blobdrop")?;
    xdg_dirs
        .place_state_file("blobdrop.log")
        .context("failed to create log directory")
}

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,blobdrop={level},blobdrop_core={level}")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Returns the log file path. Errors leave no
/// subscriber installed so the caller can fall back to [`init_stderr`].
pub fn init(opts: &LogOptions) -> Result<PathBuf> {
    let path = match &opts.file {
        Some(p) => p.clone(),
        None => default_log_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let writer = Mutex::new(file).and(io::stderr.with_max_level(Level::WARN));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(opts.level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::debug!(path = %path.display(), "logging initialized");
    Ok(path)
}

/// Log to stderr only, at the given level.
pub fn init_stderr(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(io::stderr)
        .try_init();
}
