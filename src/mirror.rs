//! # Directory Mirroring
//!
//! Makes a target directory tree consistent with a source tree. Every call
//! compares the full trees, independent of what change detection reported.
//!
//! ## Algorithm
//!
//! 1. List every file under the source and the target (relative paths).
//! 2. Copy each source file whose target is missing or strictly older.
//!    Equal modification times count as up to date.
//! 3. With strict pruning, delete target files that have no source file.
//! 4. Remove directories under the target left without entries,
//!    children before parents. This runs with or without strict pruning.
//!
//! ## Error Handling
//!
//! A failure on one file is logged, recorded in the [`MirrorReport`] and
//! skipped. A directory that does not exist lists as empty, so the first
//! pass into a fresh target needs no setup.
//!
//! `.git` entries, directory or `gitdir:` file, are never traversed or
//! deleted, and the engine's sidecar files are never copied.

use crate::utils::{SKIPPED_NAMES, collect_files};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What happened to a mirrored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Copied from the source
    Copied,
    /// Removed from the target by strict pruning
    Deleted,
}

/// One applied change, relative to the mirrored directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// A file that could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one reconcile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Applied changes, copies first, each group in path order
    pub changes: Vec<Change>,
    /// Files skipped because of an error
    pub failures: Vec<MirrorFailure>,
    /// Empty directories removed from the target
    pub pruned_dirs: usize,
}

impl MirrorReport {
    /// Relative paths of all changes, in report order.
    #[must_use]
    pub fn changed_paths(&self) -> Vec<&Path> {
        self.changes.iter().map(|c| c.path.as_path()).collect()
    }

    /// Returns `true` if nothing was copied or deleted.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    /// Records a failure and logs it.
    fn fail(&mut self, path: &Path, action: &str, err: &io::Error) {
        warn!(path = %path.display(), error = %err, "failed to {action}");
        self.failures.push(MirrorFailure {
            path: path.to_path_buf(),
            message: format!("Failed to {action} {}: {err}", path.display()),
        });
    }
}

/// Mirrors one source directory into one target directory.
pub struct DirectoryMirror<'a> {
    /// Directory read from
    source: &'a Path,
    /// Directory written to
    target: &'a Path,
    /// Delete target files absent from the source
    strict_prune: bool,
}

impl<'a> DirectoryMirror<'a> {
    #[must_use]
    pub const fn new(source: &'a Path, target: &'a Path, strict_prune: bool) -> Self {
        Self {
            source,
            target,
            strict_prune,
        }
    }

    /// Apply the copy/delete plan and prune empty directories.
    #[must_use]
    pub fn reconcile(&self) -> MirrorReport {
        let mut report = MirrorReport::default();

        let source_files = collect_files(self.source);
        let target_files = collect_files(self.target);

        for relative in &source_files {
            match self.copy_if_newer(relative) {
                Ok(true) => report.changes.push(Change {
                    kind: ChangeKind::Copied,
                    path: relative.clone(),
                }),
                Ok(false) => {}
                Err(e) => report.fail(&self.source.join(relative), "copy", &e),
            }
        }

        if self.strict_prune {
            let keep: HashSet<&PathBuf> = source_files.iter().collect();
            for relative in target_files.iter().filter(|p| !keep.contains(p)) {
                let path = self.target.join(relative);
                match fs::remove_file(&path) {
                    Ok(()) => {
                        debug!(path = %path.display(), "deleted target-only file");
                        report.changes.push(Change {
                            kind: ChangeKind::Deleted,
                            path: relative.clone(),
                        });
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => report.fail(&path, "delete", &e),
                }
            }
        }

        report.pruned_dirs = prune_empty_dirs(self.target);
        report
    }

    /// Copy one file if the target is missing or strictly older.
    ///
    /// Returns whether a copy happened.
    fn copy_if_newer(&self, relative: &Path) -> io::Result<bool> {
        let from = self.source.join(relative);
        let to = self.target.join(relative);

        let source_modified = fs::metadata(&from)?.modified()?;
        match fs::metadata(&to) {
            Ok(meta) if source_modified <= meta.modified()? => return Ok(false),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&from, &to)?;
        debug!(from = %from.display(), to = %to.display(), "copied");
        Ok(true)
    }
}

/// Reconcile `target` against `source`.
///
/// Convenience wrapper around [`DirectoryMirror`].
#[must_use]
pub fn reconcile(source: &Path, target: &Path, strict_prune: bool) -> MirrorReport {
    DirectoryMirror::new(source, target, strict_prune).reconcile()
}

/// Remove every empty directory below `dir`, deepest first.
///
/// Subdirectories are collected before recursing, and `dir` itself is
/// kept. Returns the number of directories removed.
pub fn prune_empty_dirs(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let subdirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| !SKIPPED_NAMES.iter().any(|s| e.file_name() == *s))
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| e.path())
        .collect();

    let mut removed = 0;
    for sub in subdirs {
        removed += prune_empty_dirs(&sub);

        let is_empty = fs::read_dir(&sub).is_ok_and(|mut rd| rd.next().is_none());
        if is_empty {
            match fs::remove_dir(&sub) {
                Ok(()) => {
                    debug!(path = %sub.display(), "removed empty directory");
                    removed += 1;
                }
                Err(e) => warn!(path = %sub.display(), error = %e, "failed to remove empty directory"),
            }
        }
    }
    removed
}
