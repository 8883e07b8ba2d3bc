//! In-memory binary objects.

use std::path::Path;
use std::sync::Arc;

/// Media type used when none is given or none can be guessed.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Extension → media type table used by [`Blob::from_path`]. Lowercase keys.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("bin", "application/octet-stream"),
    ("csv", "text/csv"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("json", "application/json"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("ogg", "audio/ogg"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("toml", "application/toml"),
    ("txt", "text/plain"),
    ("wav", "audio/wav"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
];

/// Immutable bytes plus a media type. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    media_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Blob with [`DEFAULT_MEDIA_TYPE`].
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(bytes, DEFAULT_MEDIA_TYPE)
    }

    /// Read a whole file into a blob, guessing the media type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(bytes, guess_media_type(path)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guess a media type from the path's extension (case-insensitive).
pub fn guess_media_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MEDIA_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
        .unwrap_or(DEFAULT_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn guess_known_and_unknown_extensions() {
        assert_eq!(guess_media_type(Path::new("report.PDF")), "application/pdf");
        assert_eq!(guess_media_type(Path::new("a/b/song.mp3")), "audio/mpeg");
        assert_eq!(guess_media_type(Path::new("noext")), DEFAULT_MEDIA_TYPE);
        assert_eq!(guess_media_type(Path::new("x.unknownext")), DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn clone_shares_bytes() {
        let a = Blob::new(vec![1u8, 2, 3], "image/png");
        let b = a.clone();
        assert_eq!(a.bytes().as_ptr(), b.bytes().as_ptr());
        assert_eq!(b.media_type(), "image/png");
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn from_path_reads_and_guesses() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        f.write_all(b"{}").unwrap();
        f.flush().unwrap();
        let blob = Blob::from_path(f.path()).unwrap();
        assert_eq!(blob.bytes(), b"{}");
        assert_eq!(blob.media_type(), "application/json");
    }
}
