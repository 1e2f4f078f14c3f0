//! File-based lock serializing cycles on one media root.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::{CleanerError, Result};

/// Lock file name, created inside the media root.
///
/// Dot-files are skipped by the media walk, so the lock is never a candidate.
pub const CYCLE_LOCK_FILE: &str = ".catcord-cleaner.lock";

/// Exclusive advisory lock on a media root.
///
/// Held for the duration of one cycle. Works across processes and across
/// threads of one process (each acquisition opens its own file handle). The
/// lock file stays in place after release.
pub struct CycleLock {
    lock_path: PathBuf,
    file: Option<File>,
}

impl CycleLock {
    /// Attempt to acquire the lock for `root`.
    ///
    /// Returns `Ok(Some(lock))` if acquired, `Ok(None)` if another cycle holds
    /// it, or `Err` on a filesystem error.
    pub fn try_acquire(root: &Path) -> Result<Option<Self>> {
        let lock_path = root.join(CYCLE_LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            if e.kind() == fs2::lock_contended_error().kind() {
                debug!(lock_path = %lock_path.display(), "Cleaner lock held by another cycle");
                return Ok(None);
            }
            warn!(error = %e, lock_path = %lock_path.display(), "Failed to lock cleaner lock file");
            return Err(CleanerError::Io(e));
        }

        // Informational only: who holds the lock.
        let pid = std::process::id();
        file.set_len(0)?;
        writeln!(file, "{}\n{}", pid, chrono::Utc::now().timestamp())?;

        debug!(lock_path = %lock_path.display(), pid = pid, "Acquired cleaner lock");
        Ok(Some(Self {
            lock_path,
            file: Some(file),
        }))
    }

    /// Acquire the lock or fail with [`CleanerError::CycleInProgress`].
    pub fn acquire(root: &Path) -> Result<Self> {
        Self::try_acquire(root)?.ok_or_else(|| CleanerError::CycleInProgress(root.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Release the lock.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                warn!(
                    error = %e,
                    lock_path = %self.lock_path.display(),
                    "Failed to unlock cleaner lock file"
                );
            } else {
                debug!(lock_path = %self.lock_path.display(), "Released cleaner lock");
            }
        }
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cycle_lock_acquire_release() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        // First lock should succeed
        let lock1 = CycleLock::try_acquire(root).unwrap();
        assert!(lock1.is_some());

        // Second lock should fail (lock held)
        let lock2 = CycleLock::try_acquire(root).unwrap();
        assert!(lock2.is_none());
        assert!(matches!(
            CycleLock::acquire(root),
            Err(CleanerError::CycleInProgress(_))
        ));

        // After releasing, should be able to acquire again
        drop(lock1);
        let lock3 = CycleLock::try_acquire(root).unwrap();
        assert!(lock3.is_some());
    }

    #[test]
    fn test_locks_are_scoped_per_root() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let _a = CycleLock::acquire(first.path()).unwrap();
        let _b = CycleLock::acquire(second.path()).unwrap();
    }
}
