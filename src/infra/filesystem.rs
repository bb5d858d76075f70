//! Filesystem helpers

use std::fs;
use std::io;
use std::path::Path;

/// Write a file atomically.
///
/// Writes to a temporary file in the same directory and renames it into
/// place, so a crash mid-write can never truncate the destination.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Remove a directory tree, ignoring a missing directory.
pub fn remove_dir_all_quiet(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.toml");

        atomic_write(&path, "a = 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\n");

        atomic_write(&path, "a = 2\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 2\n");
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_remove_dir_all_quiet_on_missing() {
        let dir = TempDir::new().unwrap();
        remove_dir_all_quiet(&dir.path().join("nope")).unwrap();
    }
}
