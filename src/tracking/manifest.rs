//! Per-source sync manifest.
//!
//! Each source directory carries two plain-text sidecar files describing the
//! previous detection pass:
//!
//! - [`crate::TIMESTAMP_FILE`]: decimal epoch milliseconds of the last pass
//! - [`crate::FILE_LIST_FILE`]: JSON array of the relative paths seen then
//!
//! Reads never fail. A missing or malformed sidecar is treated as "no prior
//! state" so every run can make forward progress.

use crate::utils::write_atomic;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads the last-run timestamp of `dir`, defaulting to 0.
#[must_use]
pub fn read_timestamp(dir: &Path) -> i64 {
    let path = dir.join(crate::TIMESTAMP_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => text.trim().parse::<i64>().map_or_else(
            |_| {
                debug!(path = %path.display(), "ignoring unparsable timestamp sidecar");
                0
            },
            |value| value.max(0),
        ),
        Err(_) => 0,
    }
}

/// Writes the last-run timestamp of `dir`.
///
/// # Errors
///
/// Returns an error if the sidecar cannot be written
pub fn write_timestamp(dir: &Path, value: i64) -> Result<()> {
    let path = dir.join(crate::TIMESTAMP_FILE);
    write_atomic(&path, value.to_string().as_bytes())
        .with_context(|| format!("Failed to write timestamp to {}", path.display()))
}

/// Reads the last-run file list of `dir`, defaulting to an empty set.
#[must_use]
pub fn read_file_list(dir: &Path) -> BTreeSet<String> {
    let path = dir.join(crate::FILE_LIST_FILE);
    let Ok(data) = fs::read(&path) else {
        return BTreeSet::new();
    };
    serde_json::from_slice::<Vec<String>>(&data).map_or_else(
        |e| {
            debug!(path = %path.display(), error = %e, "ignoring malformed file list sidecar");
            BTreeSet::new()
        },
        |list| list.into_iter().collect(),
    )
}

/// Writes the last-run file list of `dir` as a JSON array.
///
/// # Errors
///
/// Returns an error if the list cannot be serialized or the sidecar cannot be written
pub fn write_file_list(dir: &Path, files: &BTreeSet<String>) -> Result<()> {
    let path = dir.join(crate::FILE_LIST_FILE);
    let list: Vec<&String> = files.iter().collect();
    let data = serde_json::to_vec_pretty(&list).context("Failed to serialize file list")?;
    write_atomic(&path, &data)
        .with_context(|| format!("Failed to write file list to {}", path.display()))
}

/// State recorded by the previous detection pass over one source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceManifest {
    /// Epoch milliseconds of the previous pass (0 if none)
    pub last_run: i64,
    /// Relative paths listed by the previous pass
    pub files: BTreeSet<String>,
}

impl SourceManifest {
    /// Load the manifest of `dir`. Never fails.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        Self {
            last_run: read_timestamp(dir),
            files: read_file_list(dir),
        }
    }

    /// Persist both sidecars into `dir`.
    ///
    /// The stored timestamp never moves backwards: if `last_run` is older
    /// than what is already on disk, the on-disk value is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if either sidecar cannot be written
    pub fn save(&self, dir: &Path) -> Result<()> {
        let timestamp = self.last_run.max(read_timestamp(dir));
        write_timestamp(dir, timestamp)?;
        write_file_list(dir, &self.files)?;
        Ok(())
    }

    /// Returns `true` if no pass has been recorded yet.
    #[must_use]
    pub fn is_first_run(&self) -> bool {
        self.last_run == 0 && self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_sidecars_default() {
        let temp = tempdir().unwrap();
        let manifest = SourceManifest::load(temp.path());
        assert_eq!(manifest.last_run, 0);
        assert!(manifest.files.is_empty());
        assert!(manifest.is_first_run());
    }

    #[test]
    fn test_malformed_sidecars_default() -> Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join(crate::TIMESTAMP_FILE), "yesterday")?;
        fs::write(temp.path().join(crate::FILE_LIST_FILE), "{not json")?;

        assert_eq!(read_timestamp(temp.path()), 0);
        assert!(read_file_list(temp.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_wrong_json_shape_defaults() -> Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join(crate::FILE_LIST_FILE), r#"{"a.md": true}"#)?;
        assert!(read_file_list(temp.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp = tempdir()?;
        let manifest = SourceManifest {
            last_run: 1_700_000_000_000,
            files: ["a.md", "b.md"].iter().map(ToString::to_string).collect(),
        };
        manifest.save(temp.path())?;

        assert_eq!(SourceManifest::load(temp.path()), manifest);
        let raw = fs::read_to_string(temp.path().join(crate::TIMESTAMP_FILE))?;
        assert_eq!(raw, "1700000000000");
        Ok(())
    }

    #[test]
    fn test_timestamp_never_regresses() -> Result<()> {
        let temp = tempdir()?;
        write_timestamp(temp.path(), 2_000)?;

        let manifest = SourceManifest {
            last_run: 1_000,
            files: BTreeSet::new(),
        };
        manifest.save(temp.path())?;

        assert_eq!(read_timestamp(temp.path()), 2_000);
        Ok(())
    }
}
