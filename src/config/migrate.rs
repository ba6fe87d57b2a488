//! One-time upgrade of legacy configuration files.
//!
//! Early configurations carried a single mapping flat on each blog entry
//! (`sourceFolder`, `targetFolder`, `enableFolderMatching`). The current
//! schema nests mappings in `pathMappings`. Both shapes are accepted here
//! and legacy entries are rewritten into the current one.

use super::{Config, PathMapping, SlugMode, SyncProfile};
use anyhow::{Result, bail};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::path::PathBuf;

/// Configuration as found on disk, before any upgrade.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    #[serde(default)]
    vault_root: Option<PathBuf>,
    #[serde(default = "super::default_auto_slug")]
    auto_slug: bool,
    #[serde(default)]
    slug_generation_method: SlugMode,
    #[serde(default = "super::default_sequential_start")]
    sequential_slug_start: i64,
    #[serde(default)]
    blogs: Vec<StoredProfile>,
}

/// A blog entry in either schema. Current entries are recognised by the
/// presence of `pathMappings`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredProfile {
    Current(SyncProfile),
    Legacy(LegacyProfile),
}

/// Blog entry with one flat mapping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProfile {
    name: String,
    #[serde(default)]
    blog_repo_path: String,
    #[serde(default)]
    auto_git: bool,
    #[serde(default = "super::default_push_branch")]
    git_push_branch: String,
    #[serde(default)]
    source_folder: Option<String>,
    #[serde(default)]
    target_folder: Option<String>,
    #[serde(default)]
    enable_folder_matching: bool,
    /// Present only when a current-shape entry failed to parse
    #[serde(default)]
    path_mappings: Option<IgnoredAny>,
}

impl From<LegacyProfile> for SyncProfile {
    fn from(legacy: LegacyProfile) -> Self {
        let path_mappings = legacy
            .source_folder
            .filter(|s| !s.trim().is_empty())
            .map(|source| PathMapping {
                source,
                target: legacy.target_folder.unwrap_or_default(),
                enable_folder_matching: legacy.enable_folder_matching,
            })
            .into_iter()
            .collect();

        Self {
            name: legacy.name,
            blog_repo_path: legacy.blog_repo_path,
            auto_git: legacy.auto_git,
            git_push_branch: legacy.git_push_branch,
            path_mappings,
        }
    }
}

impl StoredConfig {
    /// Convert into the current schema.
    ///
    /// Returns the configuration and whether any entry had to be upgraded.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry declares `pathMappings` that do not
    /// match the current schema
    pub fn upgrade(self) -> Result<(Config, bool)> {
        let mut migrated = false;
        let mut blogs = Vec::with_capacity(self.blogs.len());
        for entry in self.blogs {
            match entry {
                StoredProfile::Current(profile) => blogs.push(profile),
                StoredProfile::Legacy(legacy) => {
                    if legacy.path_mappings.is_some() {
                        bail!("Invalid pathMappings in blog '{}'", legacy.name);
                    }
                    migrated = true;
                    blogs.push(legacy.into());
                }
            }
        }

        let config = Config {
            vault_root: self.vault_root,
            auto_slug: self.auto_slug,
            slug_generation_method: self.slug_generation_method,
            sequential_slug_start: self.sequential_slug_start,
            blogs,
        };
        Ok((config, migrated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"
autoSlug = true

[[blogs]]
name = "old"
blogRepoPath = "/srv/old"
autoGit = true
sourceFolder = "Blog"
targetFolder = "content"
enableFolderMatching = true
"#;

    #[test]
    fn test_legacy_entry_is_promoted() {
        let stored: StoredConfig = toml::from_str(LEGACY).unwrap();
        let (config, migrated) = stored.upgrade().unwrap();

        assert!(migrated);
        let blog = &config.blogs[0];
        assert_eq!(blog.git_push_branch, "main");
        assert_eq!(
            blog.path_mappings,
            vec![PathMapping {
                source: "Blog".into(),
                target: "content".into(),
                enable_folder_matching: true,
            }]
        );
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let stored: StoredConfig = toml::from_str(LEGACY).unwrap();
        let (config, _) = stored.upgrade().unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let again: StoredConfig = toml::from_str(&text).unwrap();
        let (config_again, migrated) = again.upgrade().unwrap();

        assert!(!migrated);
        assert_eq!(config_again, config);
    }

    #[test]
    fn test_legacy_without_source_has_no_mappings() {
        let stored: StoredConfig =
            toml::from_str("[[blogs]]\nname = \"empty\"\nblogRepoPath = \"/r\"\n").unwrap();
        let (config, migrated) = stored.upgrade().unwrap();
        assert!(migrated);
        assert!(config.blogs[0].path_mappings.is_empty());
    }

    #[test]
    fn test_current_entry_untouched() {
        let text = r#"
[[blogs]]
name = "new"
blogRepoPath = "/srv/new"
pathMappings = []
"#;
        let stored: StoredConfig = toml::from_str(text).unwrap();
        let (config, migrated) = stored.upgrade().unwrap();
        assert!(!migrated);
        assert_eq!(config.blogs[0].name, "new");
    }

    #[test]
    fn test_broken_mappings_are_rejected() {
        let text = r#"
[[blogs]]
name = "typo"
blogRepoPath = "/srv/typo"

[[blogs.pathMappings]]
target = "content"
"#;
        let stored: StoredConfig = toml::from_str(text).unwrap();
        let err = stored.upgrade().unwrap_err();
        assert!(err.to_string().contains("typo"));
    }
}
