//! `blobdrop save` – read a file into a blob and download it through the filesystem host.

use anyhow::{Context, Result};
use blobdrop_core::config::BlobdropConfig;
use blobdrop_core::host::{FsHost, FsHostOptions};
use blobdrop_core::{download_blob, Blob};
use std::path::{Path, PathBuf};

/// Returns the path the file was saved under (may be numbered on conflict).
pub fn run_save(
    cfg: &BlobdropConfig,
    path: &Path,
    name: Option<&str>,
    media_type: Option<&str>,
    dir: Option<&Path>,
) -> Result<PathBuf> {
    let blob = match media_type {
        Some(mt) => Blob::new(
            std::fs::read(path).with_context(|| format!("read {}", path.display()))?,
            mt,
        ),
        None => Blob::from_path(path).with_context(|| format!("read {}", path.display()))?,
    };

    let filename = match name {
        Some(n) => n.to_string(),
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .with_context(|| {
                format!("cannot derive a filename from {}; pass --name", path.display())
            })?,
    };

    let download_dir = match dir.or(cfg.download_dir.as_deref()) {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let host = FsHost::new(FsHostOptions::from_config(cfg, download_dir)?)?;
    download_blob(&host, &blob, &filename)
        .with_context(|| format!("save {} as {:?}", path.display(), filename))?;

    host.saved_paths()
        .pop()
        .context("host reported no saved file")
}
