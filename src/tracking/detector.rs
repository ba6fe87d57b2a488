use super::manifest::SourceManifest;
use crate::frontmatter;
use crate::utils::{is_markdown, now_millis, system_time_millis};
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Result of one detection pass. Names are relative to the source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Documents newer than the previous pass, or lacking a slug
    pub new_or_modified: BTreeSet<String>,
    /// Documents listed by the previous pass that are gone now
    pub deleted: BTreeSet<String>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_or_modified.is_empty() && self.deleted.is_empty()
    }
}

/// Knobs for [`detect`].
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    /// Also flag unchanged documents that carry no slug. Reads every
    /// document, so it is only enabled when slugs are assigned.
    pub check_missing_ids: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            check_missing_ids: true,
        }
    }
}

/// Compare `source_dir` against its manifest and record the new state.
///
/// Only Markdown files directly inside `source_dir` are considered. The
/// manifest is rewritten with the pass start time and the current listing
/// whether or not anything changed.
///
/// # Errors
///
/// Returns an error if `source_dir` is not a readable directory or the
/// manifest cannot be written
pub fn detect(source_dir: &Path, options: DetectOptions) -> Result<ChangeSet> {
    if !source_dir.is_dir() {
        bail!("Source directory does not exist: {}", source_dir.display());
    }

    let started = now_millis();
    let previous = SourceManifest::load(source_dir);
    let mut changes = ChangeSet::default();
    let mut current = BTreeSet::new();

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to list {}", source_dir.display()))?;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %source_dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_ok_and(|t| t.is_file()) || !is_markdown(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(system_time_millis)
            .unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "cannot stat document");
                0
            });

        if modified > previous.last_run {
            debug!(file = %name, "modified since last pass");
            changes.new_or_modified.insert(name.clone());
        } else if options.check_missing_ids && lacks_slug(&path) {
            debug!(file = %name, "unchanged but has no slug");
            changes.new_or_modified.insert(name.clone());
        }
        current.insert(name);
    }

    changes.deleted = previous.files.difference(&current).cloned().collect();

    SourceManifest {
        last_run: started,
        files: current,
    }
    .save(source_dir)?;

    Ok(changes)
}

fn lacks_slug(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(text) => !frontmatter::has_slug(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read document");
            false
        }
    }
}
