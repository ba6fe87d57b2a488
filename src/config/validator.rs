use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Flags configuration keys that blogsync does not read
pub struct ConfigValidator {
    /// Recognised top-level keys
    top_fields: HashSet<&'static str>,
    /// Recognised keys inside a `[[blogs]]` entry
    blog_fields: HashSet<&'static str>,
    /// Recognised keys inside a `[[blogs.pathMappings]]` entry
    mapping_fields: HashSet<&'static str>,
    /// Blog-level keys from the flat single-mapping layout
    legacy_blog_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        Self {
            top_fields: [
                "vaultRoot",
                "autoSlug",
                "slugGenerationMethod",
                "sequentialSlugStart",
                "blogs",
            ]
            .into_iter()
            .collect(),
            blog_fields: [
                "name",
                "blogRepoPath",
                "autoGit",
                "gitPushBranch",
                "pathMappings",
            ]
            .into_iter()
            .collect(),
            mapping_fields: ["source", "target", "enableFolderMatching"]
                .into_iter()
                .collect(),
            legacy_blog_fields: ["sourceFolder", "targetFolder", "enableFolderMatching"]
                .into_iter()
                .collect(),
        }
    }

    /// Collect warnings for unknown or legacy keys in configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML
    pub fn check_str(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Table = toml::from_str(content)?;
        let mut warnings = Vec::new();

        for (key, value) in &parsed {
            if !self.top_fields.contains(key.as_str()) {
                warnings.push(format!("Unknown configuration field: {key}"));
                continue;
            }
            if key != "blogs" {
                continue;
            }
            let Some(blogs) = value.as_array() else {
                continue;
            };
            for (index, blog) in blogs.iter().enumerate() {
                if let Some(table) = blog.as_table() {
                    self.check_blog(table, index, &mut warnings);
                }
            }
        }

        Ok(warnings)
    }

    /// Checks the keys of one blog entry and its mappings
    fn check_blog(&self, blog: &toml::Table, index: usize, warnings: &mut Vec<String>) {
        let label = blog
            .get("name")
            .and_then(toml::Value::as_str)
            .map_or_else(|| format!("blogs[{index}]"), |name| format!("blogs.{name}"));

        let is_legacy = !blog.contains_key("pathMappings");
        for key in blog.keys() {
            if is_legacy && self.legacy_blog_fields.contains(key.as_str()) {
                warnings.push(format!(
                    "Legacy field '{label}.{key}': will be moved into pathMappings on next load"
                ));
            } else if !self.blog_fields.contains(key.as_str()) {
                warnings.push(format!("Unknown configuration field: {label}.{key}"));
            }
        }

        let mappings = blog
            .get("pathMappings")
            .and_then(toml::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (m, mapping) in mappings.iter().enumerate() {
            let Some(table) = mapping.as_table() else {
                continue;
            };
            for key in table.keys() {
                if !self.mapping_fields.contains(key.as_str()) {
                    warnings.push(format!(
                        "Unknown configuration field: {label}.pathMappings[{m}].{key}"
                    ));
                }
            }
        }
    }

    /// Validate a configuration file and print warnings about issues
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let warnings = self.check_str(&content)?;

        if !warnings.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for warning in warnings {
                eprintln!("  {}", warning.yellow());
            }
            eprintln!();
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
