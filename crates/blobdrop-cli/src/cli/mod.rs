//! CLI for blobdrop.

mod commands;

use anyhow::Result;
use blobdrop_core::{config, logging};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::Level;

use commands::{run_checksum, run_closest, run_completions, run_manpage, run_save};

/// Top-level CLI for blobdrop.
#[derive(Debug, Parser)]
#[command(name = "blobdrop")]
#[command(about = "blobdrop: save blobs as downloads and pick closest values", long_about = None)]
pub struct Cli {
    /// Log file (default: ~/.local/state/blobdrop/blobdrop.log).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// More log detail: -v for debug, -vv for trace.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: CliCommand,
}

impl Cli {
    pub fn log_options(&self) -> logging::LogOptions {
        let level = match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        logging::LogOptions {
            file: self.log_file.clone(),
            level,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Save a file's bytes as a download in the download directory.
    Save {
        /// File to read into the blob.
        path: PathBuf,
        /// Suggested filename (default: the input's file name). Used as given.
        #[arg(long)]
        name: Option<String>,
        /// Media type (default: guessed from the extension).
        #[arg(long = "type", value_name = "MEDIA_TYPE")]
        media_type: Option<String>,
        /// Download directory (default: config `download_dir`, else the current directory).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print the candidate closest to TARGET (first one on ties).
    Closest {
        #[arg(allow_negative_numbers = true)]
        target: f64,
        /// Candidates; when omitted, `candidates` from the config file is used.
        #[arg(allow_negative_numbers = true)]
        candidates: Vec<f64>,
    },

    /// Compute SHA-256 of a file (e.g. after a save).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff).
    Manpage,
}

impl CliCommand {
    pub fn run(self) -> Result<()> {
        match self {
            CliCommand::Save {
                path,
                name,
                media_type,
                dir,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let saved = run_save(
                    &cfg,
                    &path,
                    name.as_deref(),
                    media_type.as_deref(),
                    dir.as_deref(),
                )?;
                println!("{}", saved.display());
            }
            CliCommand::Closest { target, candidates } => {
                let cfg = config::load_or_init()?;
                println!("{}", run_closest(&cfg, target, &candidates)?);
            }
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Manpage => run_manpage()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
