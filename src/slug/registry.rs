//! Installation-wide registry of every slug ever issued.

use crate::utils::write_atomic;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only set of issued slugs, persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct SlugRegistry {
    /// Location of the registry file
    path: PathBuf,
    /// Slugs in issue order
    ordered: Vec<String>,
    /// Lookup set mirroring `ordered`
    lookup: HashSet<String>,
}

impl SlugRegistry {
    /// Load the registry stored in `data_dir`.
    ///
    /// A missing or malformed file yields an empty registry.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(crate::REGISTRY_FILE);
        let ordered: Vec<String> = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                debug!(path = %path.display(), error = %e, "ignoring malformed slug registry");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        let mut lookup = HashSet::with_capacity(ordered.len());
        let ordered = ordered
            .into_iter()
            .filter(|slug| lookup.insert(slug.clone()))
            .collect();

        Self {
            path,
            ordered,
            lookup,
        }
    }

    /// Returns `true` if `slug` was issued before.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.lookup.contains(slug)
    }

    /// Number of issued slugs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if nothing has been issued yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// All issued slugs in issue order.
    #[must_use]
    pub fn slugs(&self) -> &[String] {
        &self.ordered
    }

    /// Record `slug` and write the registry back to disk.
    ///
    /// Recording an already-known slug is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry file cannot be written
    pub fn record(&mut self, slug: &str) -> Result<()> {
        if !self.lookup.insert(slug.to_string()) {
            return Ok(());
        }
        self.ordered.push(slug.to_string());
        self.save()
    }

    /// Write the registry to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save(&self) -> Result<()> {
        let data =
            serde_json::to_vec_pretty(&self.ordered).context("Failed to serialize slug registry")?;
        write_atomic(&self.path, &data)
            .with_context(|| format!("Failed to write slug registry {}", self.path.display()))
    }
}
