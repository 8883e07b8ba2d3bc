//! In-memory host that records every capability call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{DownloadHost, ObjectUrl};
use crate::blob::Blob;
use crate::error::HostError;

/// One capability call, in the order the host saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    CreateObjectUrl(ObjectUrl),
    AttachAnchor { url: ObjectUrl, filename: String },
    Click { url: ObjectUrl, filename: String },
    RevokeObjectUrl(ObjectUrl),
}

/// A download the host "saved" on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub filename: String,
    pub blob: Blob,
}

#[derive(Debug, Clone)]
pub struct MemoryAnchor {
    url: ObjectUrl,
    filename: String,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    live: HashMap<ObjectUrl, Blob>,
    anchors: usize,
    events: Vec<HostEvent>,
    saved: Vec<SavedDownload>,
}

/// Host backed by process memory. Useful for embedding and for observing
/// exactly which capabilities the downloader used.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<State>,
    fail_clicks: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose `click` always fails after being recorded.
    pub fn failing_clicks() -> Self {
        Self {
            state: Mutex::default(),
            fail_clicks: true,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a panicking test thread; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.state().events.clone()
    }

    pub fn saved(&self) -> Vec<SavedDownload> {
        self.state().saved.clone()
    }

    /// Object URLs created and not yet revoked.
    pub fn live_object_urls(&self) -> usize {
        self.state().live.len()
    }

    /// Anchors attached so far. Anchors are never detached.
    pub fn attached_anchors(&self) -> usize {
        self.state().anchors
    }
}

impl DownloadHost for MemoryHost {
    type Anchor = MemoryAnchor;

    fn create_object_url(&self, blob: &Blob) -> Result<ObjectUrl, HostError> {
        let mut st = self.state();
        st.next_id += 1;
        let url = ObjectUrl::new(format!("blob:memory/{}", st.next_id));
        st.live.insert(url.clone(), blob.clone());
        st.events.push(HostEvent::CreateObjectUrl(url.clone()));
        Ok(url)
    }

    fn attach_anchor(&self, url: &ObjectUrl, filename: &str) -> Result<MemoryAnchor, HostError> {
        let mut st = self.state();
        st.anchors += 1;
        st.events.push(HostEvent::AttachAnchor {
            url: url.clone(),
            filename: filename.to_string(),
        });
        Ok(MemoryAnchor {
            url: url.clone(),
            filename: filename.to_string(),
        })
    }

    fn click(&self, anchor: &MemoryAnchor) -> Result<(), HostError> {
        let mut st = self.state();
        st.events.push(HostEvent::Click {
            url: anchor.url.clone(),
            filename: anchor.filename.clone(),
        });
        if self.fail_clicks {
            return Err(HostError::Unsupported("click simulation"));
        }
        let blob = st
            .live
            .get(&anchor.url)
            .cloned()
            .ok_or_else(|| HostError::UnknownObjectUrl(anchor.url.to_string()))?;
        st.saved.push(SavedDownload {
            filename: anchor.filename.clone(),
            blob,
        });
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) -> Result<(), HostError> {
        let mut st = self.state();
        st.events.push(HostEvent::RevokeObjectUrl(url.clone()));
        st.live
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| HostError::UnknownObjectUrl(url.to_string()))
    }
}
