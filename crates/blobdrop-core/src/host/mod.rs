//! Host capabilities the blob downloader relies on.
//!
//! A host issues temporary object URLs for blobs, creates invisible
//! anchor-like triggers, clicks them and revokes URLs. The browser host does
//! this against the DOM; the filesystem host stages bytes on disk and writes
//! them into a downloads directory; the memory host records every call.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub mod fs;

#[cfg(target_arch = "wasm32")]
mod browser;

use std::fmt;

use crate::blob::Blob;
use crate::error::HostError;

pub use memory::{HostEvent, MemoryAnchor, MemoryHost, SavedDownload};

#[cfg(not(target_arch = "wasm32"))]
pub use fs::{FsHost, FsHostOptions};

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHost;

/// Temporary, revocable, host-local reference to a blob's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities a host environment offers to [`download_blob`](crate::download::download_blob).
///
/// Methods take `&self` so an object URL guard can borrow the host while the
/// anchor is created and clicked; hosts keep their own state behind a lock.
pub trait DownloadHost {
    /// Handle to a trigger element created by [`attach_anchor`](Self::attach_anchor).
    type Anchor;

    fn create_object_url(&self, blob: &Blob) -> Result<ObjectUrl, HostError>;

    /// Create an invisible trigger pointing at `url` that saves as `filename`,
    /// and attach it to the host's document.
    fn attach_anchor(&self, url: &ObjectUrl, filename: &str) -> Result<Self::Anchor, HostError>;

    /// Activate the trigger, starting the host's save action.
    fn click(&self, anchor: &Self::Anchor) -> Result<(), HostError>;

    fn revoke_object_url(&self, url: &ObjectUrl) -> Result<(), HostError>;
}
