//! Filesystem host: a downloads directory stands in for the browser.
//!
//! Object URLs are `file://` URLs of uniquely named staged copies in a
//! staging directory, which several hosts and processes may share. Clicking
//! an anchor reserves the destination, writes the staged bytes to a temp file
//! next to it and renames it into place. Anchors are kept in an
//! in-process list for the host's lifetime.

mod conflict;
mod filename;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use url::Url;

use super::{DownloadHost, ObjectUrl};
use crate::blob::Blob;
use crate::checksum;
use crate::config::{BlobdropConfig, OnConflict};
use crate::error::HostError;
use crate::storage::PartFile;

pub use conflict::{numbered_name, reserve_destination, Reservation};
pub use filename::{check_filename, MAX_FILENAME_BYTES};

/// Suffix of staged blob files.
const STAGED_SUFFIX: &str = ".blob";

#[derive(Debug, Clone)]
pub struct FsHostOptions {
    pub download_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub on_conflict: OnConflict,
    pub fsync: bool,
}

impl FsHostOptions {
    pub fn new(download_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            staging_dir: staging_dir.into(),
            on_conflict: OnConflict::default(),
            fsync: true,
        }
    }

    /// Options from config; `download_dir` is chosen by the caller (flag, config or cwd).
    pub fn from_config(cfg: &BlobdropConfig, download_dir: PathBuf) -> anyhow::Result<Self> {
        Ok(Self {
            download_dir,
            staging_dir: cfg.resolve_staging_dir()?,
            on_conflict: cfg.on_conflict,
            fsync: cfg.fsync,
        })
    }
}

/// Trigger attached to the host's anchor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsAnchor {
    url: ObjectUrl,
    filename: String,
}

impl FsAnchor {
    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

#[derive(Debug)]
struct Staged {
    path: PathBuf,
    sha256: String,
}

#[derive(Debug, Default)]
struct State {
    live: HashMap<ObjectUrl, Staged>,
    anchors: Vec<FsAnchor>,
    saved: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct FsHost {
    opts: FsHostOptions,
    state: Mutex<State>,
}

impl FsHost {
    /// Create both directories if needed. The staging directory is canonicalized
    /// so staged paths can be expressed as `file://` URLs.
    pub fn new(mut opts: FsHostOptions) -> Result<Self, HostError> {
        fs::create_dir_all(&opts.download_dir)?;
        fs::create_dir_all(&opts.staging_dir)?;
        opts.staging_dir = fs::canonicalize(&opts.staging_dir)?;
        tracing::debug!(
            download_dir = %opts.download_dir.display(),
            staging_dir = %opts.staging_dir.display(),
            "filesystem host ready"
        );
        Ok(Self {
            opts,
            state: Mutex::default(),
        })
    }

    pub fn options(&self) -> &FsHostOptions {
        &self.opts
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Final paths of every file saved by a click, in order.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.state().saved.clone()
    }

    /// Object URLs created and not yet revoked.
    pub fn live_object_urls(&self) -> usize {
        self.state().live.len()
    }

    /// Anchors attached so far. They are never detached.
    pub fn anchors(&self) -> Vec<FsAnchor> {
        self.state().anchors.clone()
    }

    fn staged_path_from_url(url: &ObjectUrl) -> Result<PathBuf, HostError> {
        Url::parse(url.as_str())
            .ok()
            .filter(|u| u.scheme() == "file")
            .and_then(|u| u.to_file_path().ok())
            .ok_or_else(|| HostError::UnknownObjectUrl(url.to_string()))
    }

    fn save(&self, staged: &Path, expected_sha256: &str, filename: &str) -> Result<PathBuf, HostError> {
        let bytes = fs::read(staged)?;
        let digest = checksum::sha256_bytes(&bytes);
        if digest != expected_sha256 {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("staged blob {} changed on disk", staged.display()),
            )));
        }

        let dest = reserve_destination(&self.opts.download_dir, filename, self.opts.on_conflict)?;
        let mut part = PartFile::create_in(&self.opts.download_dir)?;
        tracing::debug!(temp = %part.temp_path().display(), dest = %dest.path().display(), "writing part file");
        part.preallocate(bytes.len() as u64)?;
        part.write_all(&bytes)?;
        part.commit(dest.path(), self.opts.fsync)?;
        let saved = dest.keep();

        tracing::info!(
            path = %saved.display(),
            bytes = bytes.len(),
            sha256 = %digest,
            "saved download"
        );
        Ok(saved)
    }
}

impl DownloadHost for FsHost {
    type Anchor = FsAnchor;

    fn create_object_url(&self, blob: &Blob) -> Result<ObjectUrl, HostError> {
        let sha256 = checksum::sha256_bytes(blob.bytes());
        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{}-", &sha256[..16]))
            .suffix(STAGED_SUFFIX)
            .tempfile_in(&self.opts.staging_dir)?;
        staged.write_all(blob.bytes())?;
        staged.flush()?;

        let url = Url::from_file_path(staged.path())
            .map(|u| ObjectUrl::new(u.to_string()))
            .map_err(|()| HostError::Unsupported("staging path is not absolute"))?;
        // From here on the object URL owns the file; revoke deletes it.
        let (_, path) = staged.keep().map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), "blob staged");
        self.state().live.insert(url.clone(), Staged { path, sha256 });
        Ok(url)
    }

    fn attach_anchor(&self, url: &ObjectUrl, filename: &str) -> Result<FsAnchor, HostError> {
        check_filename(filename)?;
        let anchor = FsAnchor {
            url: url.clone(),
            filename: filename.to_string(),
        };
        self.state().anchors.push(anchor.clone());
        Ok(anchor)
    }

    fn click(&self, anchor: &FsAnchor) -> Result<(), HostError> {
        let path = Self::staged_path_from_url(&anchor.url)?;
        let sha256 = {
            let st = self.state();
            match st.live.get(&anchor.url) {
                Some(staged) if staged.path == path => staged.sha256.clone(),
                _ => return Err(HostError::UnknownObjectUrl(anchor.url.to_string())),
            }
        };
        let saved = self.save(&path, &sha256, &anchor.filename)?;
        self.state().saved.push(saved);
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) -> Result<(), HostError> {
        let mut st = self.state();
        let path = st
            .live
            .get(url)
            .map(|staged| staged.path.clone())
            .ok_or_else(|| HostError::UnknownObjectUrl(url.to_string()))?;
        // The URL stays live until its file is gone, so a failed delete can be retried.
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "staged blob already gone");
            }
            Err(e) => return Err(e.into()),
        }
        st.live.remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(dir: &Path) -> FsHost {
        FsHost::new(FsHostOptions::new(dir.join("downloads"), dir.join("staging"))).unwrap()
    }

    fn staged_files(host: &FsHost) -> usize {
        fs::read_dir(&host.options().staging_dir).unwrap().count()
    }

    #[test]
    fn object_url_is_file_url_to_staged_copy() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host
            .create_object_url(&Blob::from_bytes(b"staged".to_vec()))
            .unwrap();
        assert!(url.as_str().starts_with("file://"));
        let path = FsHost::staged_path_from_url(&url).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"staged");
        host.revoke_object_url(&url).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn attach_rejects_unusable_name() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host.create_object_url(&Blob::from_bytes(vec![1u8])).unwrap();
        assert!(matches!(
            host.attach_anchor(&url, "../escape.txt"),
            Err(HostError::InvalidFilename { .. })
        ));
        assert!(host.anchors().is_empty());
        host.revoke_object_url(&url).unwrap();
        assert_eq!(staged_files(&host), 0);
    }

    #[test]
    fn click_with_foreign_url_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let anchor = host
            .attach_anchor(&ObjectUrl::new("blob:null/1234"), "x.bin")
            .unwrap();
        assert!(matches!(
            host.click(&anchor),
            Err(HostError::UnknownObjectUrl(_))
        ));
    }

    #[test]
    fn tampered_staged_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host
            .create_object_url(&Blob::from_bytes(b"original".to_vec()))
            .unwrap();
        fs::write(FsHost::staged_path_from_url(&url).unwrap(), b"tampered").unwrap();
        let anchor = host.attach_anchor(&url, "out.bin").unwrap();
        assert!(matches!(host.click(&anchor), Err(HostError::Io(_))));
        assert!(host.saved_paths().is_empty());
        host.revoke_object_url(&url).unwrap();
    }

    #[test]
    fn revoke_unknown_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        assert!(matches!(
            host.revoke_object_url(&ObjectUrl::new("file:///nope.blob")),
            Err(HostError::UnknownObjectUrl(_))
        ));
    }

    #[test]
    fn hosts_sharing_staging_dir_get_distinct_urls() {
        let dir = tempfile::tempdir().unwrap();
        let a = host(dir.path());
        let b = host(dir.path());
        let blob = Blob::from_bytes(b"same bytes".to_vec());

        let url_a = a.create_object_url(&blob).unwrap();
        let url_b = b.create_object_url(&blob).unwrap();
        assert_ne!(url_a, url_b);

        a.revoke_object_url(&url_a).unwrap();
        let anchor = b.attach_anchor(&url_b, "shared.bin").unwrap();
        b.click(&anchor).unwrap();
        b.revoke_object_url(&url_b).unwrap();

        let saved = dir.path().join("downloads").join("shared.bin");
        assert_eq!(fs::read(saved).unwrap(), b"same bytes");
        assert_eq!(staged_files(&a), 0);
    }

    #[test]
    fn failed_revoke_keeps_url_live_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host.create_object_url(&Blob::from_bytes(vec![7u8])).unwrap();
        let path = FsHost::staged_path_from_url(&url).unwrap();

        // A non-empty directory in place of the staged file makes the delete fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), b"x").unwrap();
        assert!(matches!(host.revoke_object_url(&url), Err(HostError::Io(_))));
        assert_eq!(host.live_object_urls(), 1);

        fs::remove_dir_all(&path).unwrap();
        fs::write(&path, [7u8]).unwrap();
        host.revoke_object_url(&url).unwrap();
        assert_eq!(host.live_object_urls(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn revoke_of_vanished_staged_file_still_releases_url() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host.create_object_url(&Blob::from_bytes(vec![1u8])).unwrap();
        fs::remove_file(FsHost::staged_path_from_url(&url).unwrap()).unwrap();
        host.revoke_object_url(&url).unwrap();
        assert_eq!(host.live_object_urls(), 0);
    }

    #[test]
    fn unrelated_part_file_in_downloads_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let downloads = dir.path().join("downloads");
        fs::write(downloads.join("notes.txt.part"), b"USER DATA").unwrap();

        let url = host.create_object_url(&Blob::from_bytes(b"new".to_vec())).unwrap();
        let anchor = host.attach_anchor(&url, "notes.txt").unwrap();
        host.click(&anchor).unwrap();
        host.revoke_object_url(&url).unwrap();

        assert_eq!(fs::read(downloads.join("notes.txt.part")).unwrap(), b"USER DATA");
        assert_eq!(fs::read(downloads.join("notes.txt")).unwrap(), b"new");
        assert_eq!(fs::read_dir(&downloads).unwrap().count(), 2);
    }

    #[test]
    fn too_long_name_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());
        let url = host.create_object_url(&Blob::from_bytes(vec![1u8])).unwrap();
        assert!(matches!(
            host.attach_anchor(&url, &"a".repeat(MAX_FILENAME_BYTES + 1)),
            Err(HostError::InvalidFilename { .. })
        ));
        host.revoke_object_url(&url).unwrap();
    }
}
