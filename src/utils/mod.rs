//! Utility functions and helpers.
//!
//! This module provides a collection of utility functions used throughout blogsync:
//!
//! - Markdown file recognition
//! - Recursive file enumeration with the engine's skip rules
//! - Millisecond timestamps
//! - Crash-safe file writes
//!
//! # Submodules
//!
//! - [`commit`]: Commit message generation
//! - [`formatters`]: Timestamp display
//! - [`paths`]: Path manipulation and resolution

/// Commit message generation
pub mod commit;
/// Timestamp display
pub mod formatters;
/// Path manipulation and resolution utilities
pub mod paths;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use walkdir::WalkDir;

/// Entry names that are never traversed, copied, deleted or pruned.
///
/// `.git` is a directory in a normal checkout and a `gitdir:` file in a
/// worktree or submodule; both are skipped.
pub const SKIPPED_NAMES: &[&str] = &[".git"];

/// Returns `true` if the path has a `.md` extension (case-insensitive).
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Returns `true` for file names the engine keeps for itself.
#[must_use]
pub fn is_sidecar(name: &str) -> bool {
    name == crate::TIMESTAMP_FILE || name == crate::FILE_LIST_FILE
}

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    system_time_millis(SystemTime::now())
}

/// Converts a `SystemTime` to epoch milliseconds, clamping pre-epoch times to 0.
#[must_use]
pub fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// Recursively lists every regular file under `root`, relative to `root`.
///
/// A missing root yields an empty listing. `.git` entries and sidecar
/// files are skipped. Entries that cannot be read are logged and skipped.
/// The result is sorted.
#[must_use]
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0 || !SKIPPED_NAMES.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || is_sidecar(&entry.file_name().to_string_lossy()) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    files
}

/// Writes `contents` to `path` through a temporary file in the same
/// directory followed by a rename, so readers never observe a partial file.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the
/// temporary file cannot be written, or the rename fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
