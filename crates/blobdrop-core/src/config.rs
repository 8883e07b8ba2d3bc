use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the filesystem host does when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnConflict {
    /// Save as `name (1).ext`, `name (2).ext`, ... like a browser does.
    #[default]
    Rename,
    Overwrite,
}

/// Global configuration loaded from `~/.config/blobdrop/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobdropConfig {
    /// Where `save` puts files when `--dir` is not given (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Where blob bytes are staged while an object URL is live (None = XDG cache dir).
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    #[serde(default)]
    pub on_conflict: OnConflict,
    /// fsync each saved file before the final rename.
    #[serde(default = "default_fsync")]
    pub fsync: bool,
    /// Default candidate list for `closest` when none is given on the command line.
    #[serde(default)]
    pub candidates: Vec<f64>,
}

fn default_fsync() -> bool {
    true
}

impl Default for BlobdropConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            staging_dir: None,
            on_conflict: OnConflict::Rename,
            fsync: default_fsync(),
            candidates: Vec::new(),
        }
    }
}

impl BlobdropConfig {
    /// Staging directory from config, else `~/.cache/blobdrop/staging` (created).
    pub fn resolve_staging_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.staging_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("blobdrop")?;
        xdg_dirs
            .create_cache_directory("staging")
            .context("failed to create staging directory")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blobdrop")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BlobdropConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<BlobdropConfig> {
    if !path.exists() {
        let default_cfg = BlobdropConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BlobdropConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
