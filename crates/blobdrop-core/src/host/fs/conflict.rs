//! Destination selection when a file with the suggested name already exists.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::OnConflict;

/// Give up after this many numbered names.
pub(super) const MAX_NUMBERED: u32 = 9999;

/// Bytes the longest numbering adds to a name: `" (9999)"`.
pub(super) const NUMBERING_RESERVE: usize = 7;

/// Second-level extensions kept together with the last one (`a.tar.gz` → `a (1).tar.gz`).
const COMPOUND_INNER: &[&str] = &["tar"];

/// Byte offset where the extension starts, if any. A leading dot is part of the stem.
fn extension_start(name: &str) -> Option<usize> {
    let last = name.rfind('.').filter(|&dot| dot > 0)?;
    let stem = &name[..last];
    match stem.rfind('.').filter(|&dot| dot > 0) {
        Some(inner) if COMPOUND_INNER.contains(&stem[inner + 1..].to_ascii_lowercase().as_str()) => {
            Some(inner)
        }
        _ => Some(last),
    }
}

/// `name (n).ext`; `.tar.*` stays together, a leading dot does not start an extension.
pub fn numbered_name(name: &str, n: u32) -> String {
    match extension_start(name) {
        Some(dot) => format!("{} ({}){}", &name[..dot], n, &name[dot..]),
        None => format!("{} ({})", name, n),
    }
}

/// Destination chosen for one save. Under `rename` an empty placeholder is
/// created atomically so concurrent saves never pick the same path; it is
/// removed on drop unless `keep` is called.
#[derive(Debug)]
pub struct Reservation {
    path: PathBuf,
    placeholder: bool,
}

impl Reservation {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The destination now holds the saved bytes; stop cleaning it up.
    pub fn keep(mut self) -> PathBuf {
        self.placeholder = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.placeholder {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::debug!(path = %self.path.display(), error = %e, "failed to remove reservation");
            }
        }
    }
}

fn try_reserve(path: &Path) -> io::Result<bool> {
    match File::options().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reserve the path the host should write `filename` to inside `dir`.
pub fn reserve_destination(dir: &Path, filename: &str, policy: OnConflict) -> io::Result<Reservation> {
    let direct = dir.join(filename);
    if policy == OnConflict::Overwrite {
        return Ok(Reservation {
            path: direct,
            placeholder: false,
        });
    }
    if try_reserve(&direct)? {
        return Ok(Reservation {
            path: direct,
            placeholder: true,
        });
    }
    for n in 1..=MAX_NUMBERED {
        let candidate = dir.join(numbered_name(filename, n));
        if try_reserve(&candidate)? {
            tracing::debug!(
                requested = filename,
                chosen = %candidate.display(),
                "destination exists, using numbered name"
            );
            return Ok(Reservation {
                path: candidate,
                placeholder: true,
            });
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {filename} in {}", dir.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_name("report.pdf", 1), "report (1).pdf");
        assert_eq!(numbered_name("archive.tar.gz", 2), "archive (2).tar.gz");
        assert_eq!(numbered_name("Backup.TAR.XZ", 3), "Backup (3).TAR.XZ");
        assert_eq!(numbered_name("v1.2.zip", 1), "v1.2 (1).zip");
        assert_eq!(numbered_name("README", 3), "README (3)");
        assert_eq!(numbered_name(".bashrc", 1), ".bashrc (1)");
        assert_eq!(numbered_name(".tar.gz", 1), ".tar (1).gz");
    }

    #[test]
    fn numbering_fits_in_reserve() {
        let longest = numbered_name("x", MAX_NUMBERED);
        assert_eq!(longest.len() - 1, NUMBERING_RESERVE);
    }

    #[test]
    fn rename_policy_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"").unwrap();
        std::fs::write(dir.path().join("a (1).txt"), b"").unwrap();
        let dest = reserve_destination(dir.path(), "a.txt", OnConflict::Rename).unwrap();
        assert_eq!(dest.path(), dir.path().join("a (2).txt"));
    }

    #[test]
    fn back_to_back_reservations_never_share_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let first = reserve_destination(dir.path(), "same.bin", OnConflict::Rename).unwrap();
        let second = reserve_destination(dir.path(), "same.bin", OnConflict::Rename).unwrap();
        assert_eq!(first.path(), dir.path().join("same.bin"));
        assert_eq!(second.path(), dir.path().join("same (1).bin"));
    }

    #[test]
    fn dropped_reservation_frees_the_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let r = reserve_destination(dir.path(), "tmp.bin", OnConflict::Rename).unwrap();
            assert!(r.path().exists());
            r.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn kept_reservation_stays() {
        let dir = tempfile::tempdir().unwrap();
        let r = reserve_destination(dir.path(), "keep.bin", OnConflict::Rename).unwrap();
        let path = r.keep();
        assert!(path.exists());
    }

    #[test]
    fn overwrite_policy_keeps_name_and_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"old").unwrap();
        let dest = reserve_destination(dir.path(), "a.txt", OnConflict::Overwrite).unwrap();
        assert_eq!(dest.path(), dir.path().join("a.txt"));
        drop(dest);
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"old");
    }
}
