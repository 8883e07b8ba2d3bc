//! blobdrop core: hand in-memory blobs to a host as downloads, and pick the
//! closest value from a candidate list.

pub mod blob;
pub mod checksum;
pub mod closest;
pub mod download;
pub mod error;
pub mod host;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod storage;

pub use blob::Blob;
pub use closest::{closest, closest_index};
pub use download::{download_blob, DownloadSink};
pub use error::{ClosestError, HostError};
pub use host::{DownloadHost, ObjectUrl};
