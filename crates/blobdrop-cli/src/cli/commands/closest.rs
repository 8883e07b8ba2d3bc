//! `blobdrop closest` – nearest candidate to a target.

use anyhow::{Context, Result};
use blobdrop_core::closest::closest;
use blobdrop_core::config::BlobdropConfig;

/// Candidates from the command line win over `cfg.candidates`.
pub fn run_closest(cfg: &BlobdropConfig, target: f64, candidates: &[f64]) -> Result<f64> {
    let list = if candidates.is_empty() {
        tracing::debug!(count = cfg.candidates.len(), "using candidates from config");
        cfg.candidates.as_slice()
    } else {
        candidates
    };
    closest(target, list).context("no candidates given on the command line or in the config file")
}
