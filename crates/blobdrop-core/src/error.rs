//! Error types shared by the downloader, hosts and the closest-value finder.

use thiserror::Error;

/// Failure reported by a [`DownloadHost`](crate::host::DownloadHost) capability.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host lacks a capability the downloader needs (no window, no document body, ...).
    #[error("host environment unsupported: {0}")]
    Unsupported(&'static str),

    /// The host refuses to save under this name. Names are never rewritten.
    #[error("invalid filename {name:?}: {reason}")]
    InvalidFilename { name: String, reason: &'static str },

    /// Revoke or click referenced an object URL this host never issued (or already revoked).
    #[error("unknown object URL: {0}")]
    UnknownObjectUrl(String),

    /// A script-level exception raised by the browser host.
    #[error("script error: {0}")]
    Script(String),

    #[error("storage: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of [`closest`](crate::closest::closest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClosestError {
    #[error("candidate list is empty")]
    EmptyCandidates,
}
