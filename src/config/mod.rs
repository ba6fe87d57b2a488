pub mod migrate;
pub mod parser;
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level settings consumed by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root that relative mapping sources resolve against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_root: Option<PathBuf>,

    /// Assign slugs to documents that lack one
    #[serde(default = "default_auto_slug")]
    pub auto_slug: bool,

    #[serde(default)]
    pub slug_generation_method: SlugMode,

    /// Next value tried in sequential mode
    #[serde(default = "default_sequential_start")]
    pub sequential_slug_start: i64,

    /// Destination profiles, processed in order
    #[serde(default)]
    pub blogs: Vec<SyncProfile>,
}

/// How new slugs are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Uniform six-digit number
    #[default]
    Random,
    /// First free integer from the stored counter upward
    Sequential,
}

/// One destination repository and the folders mirrored into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncProfile {
    pub name: String,

    /// Working tree the mappings write into (empty means unset)
    #[serde(default)]
    pub blog_repo_path: String,

    /// Stage, commit and push after a pass with changes
    #[serde(default)]
    pub auto_git: bool,

    #[serde(default = "default_push_branch")]
    pub git_push_branch: String,

    /// Required in the current schema; its absence marks a legacy entry
    pub path_mappings: Vec<PathMapping>,
}

/// A source folder mirrored into a folder of the profile's repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathMapping {
    /// Relative to the vault root, or absolute
    pub source: String,

    /// Relative to the profile's repository, or absolute
    #[serde(default)]
    pub target: String,

    /// Delete target files that no longer exist at the source
    #[serde(default)]
    pub enable_folder_matching: bool,
}

impl SyncProfile {
    /// The repository path, or `None` when it is not configured.
    #[must_use]
    pub fn repo_path(&self) -> Option<PathBuf> {
        let trimmed = self.blog_repo_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// Branch to push to, falling back to the default when blank.
    #[must_use]
    pub fn push_branch(&self) -> &str {
        let branch = self.git_push_branch.trim();
        if branch.is_empty() {
            DEFAULT_PUSH_BRANCH
        } else {
            branch
        }
    }
}

impl PathMapping {
    /// Whether target-only files are removed.
    #[must_use]
    pub const fn strict_prune(&self) -> bool {
        self.enable_folder_matching
    }
}

/// Branch used when a profile leaves `gitPushBranch` blank.
pub const DEFAULT_PUSH_BRANCH: &str = "main";

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: None,
            auto_slug: default_auto_slug(),
            slug_generation_method: SlugMode::Random,
            sequential_slug_start: default_sequential_start(),
            blogs: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file is created with defaults. A legacy-shaped file is
    /// upgraded in place before it is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let (config, migrated) = parser::parse_config_file(path)?;
        if migrated {
            info!(path = %path.display(), "upgraded legacy configuration");
            config
                .save(path)
                .context("Failed to save upgraded configuration")?;
        }
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        crate::utils::write_atomic(path, toml_str.as_bytes())
            .with_context(|| format!("Failed to save config file: {}", path.display()))
    }

    /// Get a profile by name
    #[must_use]
    pub fn get_profile(&self, name: &str) -> Option<&SyncProfile> {
        self.blogs.iter().find(|b| b.name == name)
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "vaultRoot" => self.vault_root.as_ref().map(|p| p.display().to_string()),
            "autoSlug" => Some(self.auto_slug.to_string()),
            "slugGenerationMethod" => {
                Some(format!("{:?}", self.slug_generation_method).to_lowercase())
            }
            "sequentialSlugStart" => Some(self.sequential_slug_start.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "vaultRoot" => self.vault_root = Some(PathBuf::from(value)),
            "autoSlug" => {
                self.auto_slug = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            "slugGenerationMethod" => {
                self.slug_generation_method = match value.as_str() {
                    "random" => SlugMode::Random,
                    "sequential" => SlugMode::Sequential,
                    _ => {
                        return Err(anyhow::anyhow!(
                            "Invalid slug generation method: {value} (expected 'random' or 'sequential')"
                        ));
                    }
                };
            }
            "sequentialSlugStart" => {
                self.sequential_slug_start = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }

    /// Keys accepted by [`Config::get`] and [`Config::set`].
    #[must_use]
    pub const fn keys() -> &'static [&'static str] {
        &[
            "vaultRoot",
            "autoSlug",
            "slugGenerationMethod",
            "sequentialSlugStart",
        ]
    }
}

// Default functions for serde
const fn default_auto_slug() -> bool {
    true
}

const fn default_sequential_start() -> i64 {
    1
}

fn default_push_branch() -> String {
    DEFAULT_PUSH_BRANCH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("nested/config.toml");

        let config = Config::load(&path)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_roundtrip_with_profiles() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.slug_generation_method = SlugMode::Sequential;
        config.blogs.push(SyncProfile {
            name: "site".into(),
            blog_repo_path: "/srv/site".into(),
            auto_git: true,
            git_push_branch: "gh-pages".into(),
            path_mappings: vec![PathMapping {
                source: "Blog".into(),
                target: "content/posts".into(),
                enable_folder_matching: true,
            }],
        });
        config.save(&path)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("slugGenerationMethod = \"sequential\""));
        assert!(text.contains("blogRepoPath"));
        assert_eq!(Config::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_repeated_saves_replace_whole_file() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "sequentialSlugStart = [broken")?;

        let mut config = Config::default();
        for next in 2..12 {
            config.sequential_slug_start = next;
            config.save(&path)?;
            assert_eq!(Config::load(&path)?.sequential_slug_start, next);
        }

        let names: Vec<_> = std::fs::read_dir(temp.path())?
            .map(|e| e.map(|e| e.file_name()))
            .collect::<std::io::Result<_>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("config.toml")]);
        Ok(())
    }

    #[test]
    fn test_get_set() -> Result<()> {
        let mut config = Config::default();
        config.set("autoSlug", "false".into())?;
        config.set("slugGenerationMethod", "sequential".into())?;
        config.set("sequentialSlugStart", "40".into())?;

        assert_eq!(config.get("autoSlug").as_deref(), Some("false"));
        assert_eq!(config.get("slugGenerationMethod").as_deref(), Some("sequential"));
        assert_eq!(config.get("sequentialSlugStart").as_deref(), Some("40"));
        assert!(config.set("slugGenerationMethod", "uuid".into()).is_err());
        assert!(config.set("nope", "1".into()).is_err());
        Ok(())
    }

    #[test]
    fn test_profile_helpers() {
        let profile = SyncProfile {
            name: "p".into(),
            blog_repo_path: "  ".into(),
            auto_git: false,
            git_push_branch: String::new(),
            path_mappings: Vec::new(),
        };
        assert_eq!(profile.repo_path(), None);
        assert_eq!(profile.push_branch(), "main");
    }
}
