use super::Config;
use super::migrate::StoredConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// Read, upgrade and validate a configuration file.
///
/// Returns the configuration and whether a legacy shape was upgraded.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or has malformed mappings
pub fn parse_config_file(path: &Path) -> Result<(Config, bool)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse configuration text, upgrading legacy entries.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or has malformed mappings
pub fn parse_config_str(content: &str) -> Result<(Config, bool)> {
    let stored: StoredConfig =
        toml::from_str(content).with_context(|| "Failed to parse TOML config")?;
    let (config, migrated) = stored.upgrade()?;

    for warning in config_warnings(&config) {
        warn!("{warning}");
    }
    Ok((config, migrated))
}

/// Returns problems that do not prevent loading.
///
/// Mapping-level problems are reported again when the sync pass reaches
/// them, so they only produce warnings here.
#[must_use]
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    for (index, blog) in config.blogs.iter().enumerate() {
        if blog.name.trim().is_empty() {
            warnings.push(format!("Blog #{} has an empty name", index + 1));
        }
        for mapping in &blog.path_mappings {
            if mapping.source.trim().is_empty() {
                warnings.push(format!(
                    "Blog '{}' has a path mapping with an empty source",
                    blog.name
                ));
            }
        }
    }

    let mut names: Vec<&str> = config.blogs.iter().map(|b| b.name.as_str()).collect();
    names.sort_unstable();
    names.dedup_by(|a, b| {
        if a == b {
            warnings.push(format!("Duplicate blog name: {a}"));
        }
        a == b
    });

    warnings
}
