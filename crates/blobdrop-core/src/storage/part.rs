//! Single-writer temp file with atomic commit.

use std::io::{self, Write};
use std::path::Path;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

use tempfile::NamedTempFile;

/// Temp files are `.blobdrop-XXXXXX.part`; the name never depends on the
/// destination's name, so it cannot collide with or outgrow it.
const TEMP_PREFIX: &str = ".blobdrop-";
const TEMP_SUFFIX: &str = ".part";

/// Temp file in the destination directory. `commit` renames it into place;
/// dropping it uncommitted deletes it.
pub struct PartFile {
    file: NamedTempFile,
}

impl PartFile {
    /// Create a fresh temp file in `dir`. Existing files are never opened.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        Ok(PartFile { file })
    }

    /// Preallocate `size` bytes. On Unix tries `posix_fallocate` for real block
    /// allocation; falls back to `set_len` on failure or non-Unix.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        if size == 0 {
            return Ok(());
        }
        #[cfg(unix)]
        {
            let fd = self.file.as_file().as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file.as_file().set_len(size)
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Optionally fsync, then rename onto `final_path`, replacing whatever is
    /// there (callers reserve the destination first).
    pub fn commit(mut self, final_path: &Path, fsync: bool) -> io::Result<()> {
        self.file.flush()?;
        if fsync {
            self.file.as_file().sync_all()?;
        }
        self.file.persist(final_path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn commit_moves_bytes_onto_final_path() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");

        let mut part = PartFile::create_in(dir.path()).unwrap();
        part.preallocate(11).unwrap();
        part.write_all(b"hello world").unwrap();
        let temp = part.temp_path().to_path_buf();
        assert!(temp.exists());
        part.commit(&final_path, true).unwrap();

        assert!(!temp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn dropped_part_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut part = PartFile::create_in(dir.path()).unwrap();
            part.write_all(b"partial").unwrap();
        }
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn temp_name_ignores_destination_files() {
        let dir = tempfile::tempdir().unwrap();
        let user_part = dir.path().join("notes.txt.part");
        std::fs::write(&user_part, b"USER DATA").unwrap();

        let mut part = PartFile::create_in(dir.path()).unwrap();
        assert_ne!(part.temp_path(), user_part.as_path());
        part.write_all(b"new").unwrap();
        part.commit(&dir.path().join("notes.txt"), false).unwrap();

        assert_eq!(std::fs::read(&user_part).unwrap(), b"USER DATA");
    }

    #[test]
    fn concurrent_parts_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = PartFile::create_in(dir.path()).unwrap();
        let b = PartFile::create_in(dir.path()).unwrap();
        assert_ne!(a.temp_path(), b.temp_path());
    }

    #[test]
    fn commit_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("same.txt");
        std::fs::write(&final_path, b"old contents").unwrap();
        let mut part = PartFile::create_in(dir.path()).unwrap();
        part.write_all(b"new").unwrap();
        part.commit(&final_path, false).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }
}
