use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::repo::{Error, IoResultExt, Result};

/// Name of the lock file created in the repository directory.
pub const LOCK_FILE_NAME: &str = "codebase.lock";

/// Exclusive, cross-process lock on a repository directory.
///
/// Held for the duration of any operation that writes to the commit archive.
/// The lock file is created with create-new semantics, so a second process
/// fails immediately rather than waiting. Dropping the guard removes the file
/// on every exit path.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
}

impl RepoLock {
    /// Acquire the lock for the repository at `repo_dir`.
    pub fn acquire(repo_dir: &Path) -> Result<RepoLock> {
        let path = repo_dir.join(LOCK_FILE_NAME);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let pid = read_holder(&path);
                return Err(Error::Locked { path, pid });
            }
            Err(err) => return Err(err).at(&path),
        };

        let lock = RepoLock { path };

        // Read back only to name the holder when the lock is contended.
        writeln!(file, "{}", std::process::id()).at(&lock.path)?;

        debug!(path = %lock.path.display(), "acquired repository lock");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

// The lock file may be mid-write or already gone; either way the holder
// is simply unknown.
fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "failed to release repository lock");
        } else {
            debug!(path = %self.path.display(), "released repository lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let temp = tempfile::tempdir().unwrap();
        let lock_path = temp.path().join(LOCK_FILE_NAME);

        {
            let lock = RepoLock::acquire(temp.path()).unwrap();
            assert_eq!(lock.path(), lock_path.as_path());
            assert!(lock_path.is_file());
        }

        assert!(!lock_path.exists());
    }

    #[test]
    fn second_acquire_fails() {
        let temp = tempfile::tempdir().unwrap();
        let _lock = RepoLock::acquire(temp.path()).unwrap();

        let err = RepoLock::acquire(temp.path()).unwrap_err();
        if let Error::Locked { path, pid } = err {
            assert_eq!(path, temp.path().join(LOCK_FILE_NAME));
            assert_eq!(pid, Some(std::process::id()));
        } else {
            panic!("Unexpected error response: {:?}", err);
        }
    }

    #[test]
    fn stale_lock_reports_its_pid() {
        let temp = tempfile::tempdir().unwrap();
        let lock_path = temp.path().join(LOCK_FILE_NAME);
        fs::write(&lock_path, "31337\n").unwrap();

        let err = RepoLock::acquire(temp.path()).unwrap_err();
        assert!(matches!(err, Error::Locked { pid: Some(31337), .. }));
        assert!(err.to_string().contains("process 31337"));

        // The lock is still there for its owner to clean up.
        assert!(lock_path.is_file());
    }

    #[test]
    fn reacquire_after_release() {
        let temp = tempfile::tempdir().unwrap();
        drop(RepoLock::acquire(temp.path()).unwrap());
        assert!(RepoLock::acquire(temp.path()).is_ok());
    }

    #[test]
    fn missing_dir_is_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = RepoLock::acquire(&temp.path().join("nope")).unwrap_err();
        if let Error::IoErrorAt { source, .. } = err {
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        } else {
            panic!("Unexpected error response: {:?}", err);
        }
    }
}
