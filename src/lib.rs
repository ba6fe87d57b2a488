//! # blogsync
//!
//! Mirrors Markdown folders from a notes vault into one or more blog
//! repositories, assigns each document a unique slug, and publishes the
//! result through git.
//!
//! ## Overview
//!
//! A sync pass walks every configured blog ("profile") in order. For each
//! of its path mappings it:
//!
//! 1. Compares the source folder against its manifest to find new,
//!    modified and deleted documents ([`tracking`])
//! 2. Writes a slug into the front matter of documents that lack one
//!    ([`slug`], [`frontmatter`])
//! 3. Mirrors the source tree into the target folder ([`mirror`])
//!
//! If anything changed and the profile has `autoGit` enabled, the
//! repository is staged, committed and pushed ([`git`]).
//!
//! ## Failure model
//!
//! A pass always runs to the end. Configuration problems skip a profile,
//! filesystem problems skip a file or mapping, and a failing push is
//! reported for its profile only. Everything is collected into one
//! [`sync::SyncReport`].

// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Front-matter inspection and slug injection.
pub mod frontmatter;

/// Publishing through git and the command runner.
pub mod git;

/// Run locking to prevent overlapping passes.
pub mod lock;

/// Directory tree mirroring.
pub mod mirror;

/// Output formatting and notifications.
pub mod output;

/// Slug registry and allocation.
pub mod slug;

/// The sync pass over all profiles.
pub mod sync;

/// Per-source change tracking.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

/// Fixtures shared by unit tests.
#[cfg(test)]
pub mod test_utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the blogsync binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application directory name under the platform config and data dirs.
pub const APP_DIR: &str = "blogsync";

/// Configuration file name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Sidecar holding a source folder's last-run timestamp.
pub const TIMESTAMP_FILE: &str = ".blogsync-last-run";

/// Sidecar holding a source folder's last-run file list.
pub const FILE_LIST_FILE: &str = ".blogsync-files.json";

/// Registry of issued slugs inside the data directory.
pub const REGISTRY_FILE: &str = "used-slugs.json";

/// Run lock inside the data directory.
pub const LOCK_FILE: &str = "sync.lock";

/// Environment variable overriding the configuration file path.
pub const ENV_CONFIG_PATH: &str = "BLOGSYNC_CONFIG_PATH";

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "BLOGSYNC_DATA_DIR";

/// Environment variable overriding the vault root.
pub const ENV_VAULT_ROOT: &str = "BLOGSYNC_VAULT_ROOT";

/// Environment variable holding the log filter directives.
pub const ENV_LOG: &str = "BLOGSYNC_LOG";

/// Central context for all blogsync operations.
///
/// Holds the loaded configuration and the locations everything else is
/// resolved from.
///
/// # Examples
///
/// ```no_run
/// use blogsync::SyncContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Create context with default paths
/// let ctx = SyncContext::new()?;
///
/// // Create context with custom paths (for testing)
/// let ctx = SyncContext::new_explicit(
///     "/tmp/test/config.toml".into(),
///     "/tmp/test/data".into(),
///     Some("/tmp/test/vault".into()),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Root that relative mapping sources resolve against.
    pub vault_root: PathBuf,

    /// Directory holding the slug registry and the run lock.
    pub data_dir: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl SyncContext {
    /// Creates a context from the default locations and environment overrides.
    ///
    /// # Errors
    /// Returns an error if the platform directories cannot be determined or
    /// the configuration file cannot be read or created.
    pub fn new() -> Result<Self> {
        let config_path = default_config_path()?;
        let data_dir = default_data_dir()?;
        let vault_root = std::env::var(ENV_VAULT_ROOT).ok().map(PathBuf::from);

        // Validate configuration and warn about issues
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            eprintln!("Warning: Configuration validation failed: {e}");
        }

        Self::new_explicit(config_path, data_dir, vault_root)
    }

    /// Creates a context with explicit paths.
    ///
    /// `vault_root` takes precedence over the configured `vaultRoot`. With
    /// neither set, the current directory is used.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(
        config_path: PathBuf,
        data_dir: PathBuf,
        vault_root: Option<PathBuf>,
    ) -> Result<Self> {
        let config = config::Config::load(&config_path)?;

        let vault_root = match vault_root.or_else(|| config.vault_root.clone()) {
            Some(root) => utils::paths::expand_tilde(&root)?,
            None => std::env::current_dir().context("Could not determine current directory")?,
        };

        Ok(Self {
            vault_root,
            data_dir,
            config_path,
            config,
        })
    }

    /// Writes the in-memory configuration back to its file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path)
    }
}

/// The configuration file location, honouring `$BLOGSYNC_CONFIG_PATH`.
///
/// # Errors
/// Returns an error if the platform config directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Ok(PathBuf::from(path));
    }
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join(APP_DIR)
        .join(CONFIG_FILE))
}

/// The data directory, honouring `$BLOGSYNC_DATA_DIR`.
///
/// # Errors
/// Returns an error if the platform data directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(path));
    }
    Ok(dirs::data_dir()
        .context("Could not find data directory")?
        .join(APP_DIR))
}

impl slug::SequenceStore for SyncContext {
    fn sequence_start(&self) -> i64 {
        self.config.sequential_slug_start
    }

    fn advance_to(&mut self, next: i64) -> Result<()> {
        self.config.sequential_slug_start = next;
        self.save_config()
            .context("Failed to persist sequentialSlugStart")
    }
}
