//! Checks that a suggested filename is usable as a single Linux path component.
//!
//! The filesystem host never rewrites names; it refuses unusable ones.

use super::conflict::NUMBERING_RESERVE;
use crate::error::HostError;

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Longest accepted name: a numbered copy (`name (9999).ext`) must still fit NAME_MAX.
pub const MAX_FILENAME_BYTES: usize = NAME_MAX - NUMBERING_RESERVE;

pub fn check_filename(name: &str) -> Result<(), HostError> {
    let reject = |reason| {
        Err(HostError::InvalidFilename {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("empty");
    }
    if name == "." || name == ".." {
        return reject("reserved name");
    }
    if name.contains(['/', '\\']) {
        return reject("contains a path separator");
    }
    if name.contains('\0') {
        return reject("contains NUL");
    }
    if name.len() > MAX_FILENAME_BYTES {
        return reject("longer than 248 bytes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(name: &str) -> &'static str {
        match check_filename(name) {
            Err(HostError::InvalidFilename { reason, .. }) => reason,
            other => panic!("expected InvalidFilename for {name:?}, got {other:?}"),
        }
    }

    #[test]
    fn accepts_ordinary_names_unchanged() {
        for name in ["report.pdf", " spaced name .txt", "..hidden", "ünïcødé.bin", "a"] {
            assert!(check_filename(name).is_ok(), "{name:?}");
        }
    }

    #[test]
    fn rejects_separators_and_nul() {
        assert_eq!(reason("a/b.txt"), "contains a path separator");
        assert_eq!(reason("a\\b.txt"), "contains a path separator");
        assert_eq!(reason("../etc/passwd"), "contains a path separator");
        assert_eq!(reason("file\0name"), "contains NUL");
    }

    #[test]
    fn rejects_empty_and_reserved() {
        assert_eq!(reason(""), "empty");
        assert_eq!(reason("."), "reserved name");
        assert_eq!(reason(".."), "reserved name");
    }

    #[test]
    fn length_limit_counts_bytes() {
        assert_eq!(MAX_FILENAME_BYTES, 248);
        assert!(check_filename(&"a".repeat(248)).is_ok());
        assert_eq!(reason(&"a".repeat(249)), "longer than 248 bytes");
        assert_eq!(reason(&"a".repeat(255)), "longer than 248 bytes");
        // 125 two-byte chars = 250 bytes
        assert_eq!(reason(&"é".repeat(125)), "longer than 248 bytes");
    }
}
