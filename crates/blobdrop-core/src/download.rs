//! Blob downloader: hand an in-memory blob to the host as a file download.
//!
//! The sequence is create object URL → attach anchor → click → revoke. The
//! object URL is held by [`ObjectUrlGuard`] so it is revoked on every exit
//! path, including a failed attach or click. The attached anchor is left in
//! the host document.

use crate::blob::Blob;
use crate::error::HostError;
use crate::host::{DownloadHost, ObjectUrl};

/// Revokes an object URL when dropped unless it was released explicitly.
struct ObjectUrlGuard<'a, H: DownloadHost + ?Sized> {
    host: &'a H,
    url: ObjectUrl,
    armed: bool,
}

impl<'a, H: DownloadHost + ?Sized> ObjectUrlGuard<'a, H> {
    fn acquire(host: &'a H, blob: &Blob) -> Result<Self, HostError> {
        let url = host.create_object_url(blob)?;
        tracing::debug!(url = %url, bytes = blob.len(), "object URL created");
        Ok(Self {
            host,
            url,
            armed: true,
        })
    }

    /// Revoke now and surface the host's answer.
    fn release(mut self) -> Result<(), HostError> {
        self.armed = false;
        self.host.revoke_object_url(&self.url)?;
        tracing::debug!(url = %self.url, "object URL revoked");
        Ok(())
    }
}

impl<H: DownloadHost + ?Sized> Drop for ObjectUrlGuard<'_, H> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.host.revoke_object_url(&self.url) {
            Ok(()) => tracing::debug!(url = %self.url, "object URL revoked after failure"),
            Err(e) => tracing::warn!(url = %self.url, error = %e, "failed to revoke object URL"),
        }
    }
}

/// Present `blob` to the user as a download named `filename`.
///
/// `filename` is passed to the host unchanged. Exactly one object URL is
/// created and exactly one revoke is issued, after the click.
pub fn download_blob<H>(host: &H, blob: &Blob, filename: &str) -> Result<(), HostError>
where
    H: DownloadHost + ?Sized,
{
    let guard = ObjectUrlGuard::acquire(host, blob)?;
    let anchor = host.attach_anchor(&guard.url, filename)?;
    host.click(&anchor)?;
    tracing::info!(
        filename,
        media_type = blob.media_type(),
        bytes = blob.len(),
        "download triggered"
    );
    guard.release()
}

/// Single-call download capability for callers holding raw bytes.
pub trait DownloadSink {
    fn trigger_download(
        &self,
        bytes: &[u8],
        media_type: &str,
        filename: &str,
    ) -> Result<(), HostError>;
}

impl<H: DownloadHost> DownloadSink for H {
    fn trigger_download(
        &self,
        bytes: &[u8],
        media_type: &str,
        filename: &str,
    ) -> Result<(), HostError> {
        download_blob(self, &Blob::new(bytes, media_type), filename)
    }
}
