//! Run locking to prevent overlapping sync passes
//!
//! A pass rewrites the manifest sidecars and the slug registry. Two passes
//! running at once could hand out the same slug, so the whole pass holds an
//! exclusive advisory lock in the data directory. The lock is released
//! when dropped, and the operating system releases it if the process dies.
//!
//! The lock file itself stays on disk between passes. A pass only counts
//! as holding the lock if the handle it locked is still the file at the
//! lock path, so a file unlinked by stale cleanup is never trusted.

use anyhow::{Context, Result, bail};
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Lock files untouched for longer than this are considered leftovers
pub const STALE_THRESHOLD: Duration = Duration::from_secs(600);

/// Attempts before giving up when the lock file keeps being replaced
const ACQUIRE_ATTEMPTS: usize = 3;

/// Holds the exclusive sync lock
///
/// The lock is automatically released when this struct is dropped.
#[derive(Debug)]
pub struct SyncLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl SyncLock {
    /// Acquire the sync lock in `data_dir`, failing at once if it is held
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create the data directory or the lock file
    /// - Another sync pass holds the lock
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        let lock_path = data_dir.join(crate::LOCK_FILE);

        for _ in 0..ACQUIRE_ATTEMPTS {
            Self::cleanup_stale_lock(&lock_path);

            let lock_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

            match lock_file.try_lock_exclusive() {
                Ok(true) => {}
                Ok(false) => {
                    let holder = fs::read_to_string(&lock_path).unwrap_or_default();
                    let holder = holder.split_whitespace().collect::<Vec<_>>().join(", ");
                    bail!(
                        "A sync is already in progress ({}). \
                         Wait for it to finish or remove the lock at: {}",
                        if holder.is_empty() { "unknown holder" } else { &holder },
                        lock_path.display()
                    );
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to lock {}", lock_path.display()));
                }
            }

            if !is_same_file(&lock_file, &lock_path) {
                debug!(path = %lock_path.display(), "lock file replaced while locking, retrying");
                continue;
            }

            // Holder info for the error message above
            lock_file.set_len(0)?;
            let mut file_ref = &lock_file;
            let _ = writeln!(
                file_ref,
                "pid={}\ntime={}",
                std::process::id(),
                humantime::format_rfc3339_seconds(SystemTime::now())
            );
            debug!(path = %lock_path.display(), "acquired sync lock");

            return Ok(Self {
                lock_file,
                lock_path,
            });
        }

        bail!(
            "Lock file kept changing while acquiring it: {}",
            lock_path.display()
        )
    }

    /// Remove a leftover lock file older than [`STALE_THRESHOLD`]
    ///
    /// A lock that is still held is kept regardless of its age.
    fn cleanup_stale_lock(lock_path: &Path) {
        let is_stale = fs::metadata(lock_path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|elapsed| elapsed > STALE_THRESHOLD);
        if !is_stale {
            return;
        }

        let Ok(file) = OpenOptions::new().write(true).open(lock_path) else {
            return;
        };
        if matches!(file.try_lock_exclusive(), Ok(true)) {
            let _ = file.unlock();
            drop(file);
            match fs::remove_file(lock_path) {
                Ok(()) => debug!(path = %lock_path.display(), "removed stale lock"),
                Err(e) => warn!(path = %lock_path.display(), error = %e, "failed to remove stale lock"),
            }
        }
    }

    /// Path of the held lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Release the lock explicitly (normally handled by Drop)
    ///
    /// The lock file is left in place for the next pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the unlock operation fails
    pub fn release(self) -> Result<()> {
        self.lock_file.unlock()?;
        Ok(())
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        // The file stays; a waiting pass may already have it open
        if let Err(e) = self.lock_file.unlock() {
            debug!(path = %self.lock_path.display(), error = %e, "unlock on drop failed");
        }
    }
}

/// Returns `true` if `file` is the file currently at `path`.
#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(on_disk)) => held.dev() == on_disk.dev() && held.ino() == on_disk.ino(),
        _ => false,
    }
}

/// Open files cannot be unlinked here, so only a vanished path can differ.
#[cfg(not(unix))]
fn is_same_file(_file: &File, path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let temp = TempDir::new().unwrap();
        let lock = SyncLock::acquire(temp.path()).unwrap();
        assert!(lock.path().exists());
        let path = lock.path().to_path_buf();
        lock.release().unwrap();
        assert!(path.exists());
        assert!(SyncLock::acquire(temp.path()).is_ok());
    }

    #[test]
    fn test_waiter_opened_before_release_still_excludes_others() {
        let temp = TempDir::new().unwrap();
        let first = SyncLock::acquire(temp.path()).unwrap();

        // A second pass has opened the file but not yet locked it
        let waiter = OpenOptions::new()
            .write(true)
            .open(temp.path().join(crate::LOCK_FILE))
            .unwrap();
        drop(first);
        assert!(waiter.try_lock_exclusive().unwrap());

        let err = SyncLock::acquire(temp.path()).unwrap_err();
        assert!(err.to_string().contains("already in progress"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unlinked_handle_is_not_current() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(crate::LOCK_FILE);
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(&path).unwrap();
        assert!(is_same_file(&file, &path));

        fs::remove_file(&path).unwrap();
        assert!(!is_same_file(&file, &path));
        fs::write(&path, "").unwrap();
        assert!(!is_same_file(&file, &path));
    }

    #[test]
    fn test_overlapping_pass_rejected() {
        let temp = TempDir::new().unwrap();
        let _held = SyncLock::acquire(temp.path()).unwrap();

        let err = SyncLock::acquire(temp.path()).unwrap_err();
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_reacquire_after_drop() {
        let temp = TempDir::new().unwrap();
        drop(SyncLock::acquire(temp.path()).unwrap());
        assert!(SyncLock::acquire(temp.path()).is_ok());
    }

    #[test]
    fn test_stale_leftover_removed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(crate::LOCK_FILE);
        fs::write(&path, "pid=1\n").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(old)).unwrap();

        let lock = SyncLock::acquire(temp.path()).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert!(content.contains(&format!("pid={}", std::process::id())));
    }
}
