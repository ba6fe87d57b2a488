use anyhow::Result;
use blogsync::config::{Config, SlugMode};
use blogsync::config::validator::ConfigValidator;
use std::fs;
use tempfile::TempDir;

const LEGACY: &str = r#"
vaultRoot = "~/notes"
slugGenerationMethod = "sequential"
sequentialSlugStart = 40

[[blogs]]
name = "tech"
blogRepoPath = "/srv/tech"
autoGit = true
sourceFolder = "Tech"
targetFolder = "content/posts"
enableFolderMatching = true

[[blogs]]
name = "empty"
blogRepoPath = "/srv/empty"
"#;

#[test]
fn test_legacy_file_upgraded_and_rewritten() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("config.toml");
    fs::write(&path, LEGACY)?;

    let config = Config::load(&path)?;
    assert_eq!(config.slug_generation_method, SlugMode::Sequential);
    assert_eq!(config.sequential_slug_start, 40);

    let tech = config.get_profile("tech").unwrap();
    assert!(tech.auto_git);
    assert_eq!(tech.path_mappings.len(), 1);
    assert_eq!(tech.path_mappings[0].source, "Tech");
    assert_eq!(tech.path_mappings[0].target, "content/posts");
    assert!(tech.path_mappings[0].strict_prune());
    assert!(config.get_profile("empty").unwrap().path_mappings.is_empty());

    let rewritten = fs::read_to_string(&path)?;
    assert!(rewritten.contains("pathMappings"));
    assert!(!rewritten.contains("sourceFolder"));
    assert!(ConfigValidator::new().check_str(&rewritten)?.is_empty());
    Ok(())
}

#[test]
fn test_upgrade_is_idempotent() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("config.toml");
    fs::write(&path, LEGACY)?;

    let first = Config::load(&path)?;
    let after_first = fs::read_to_string(&path)?;
    let second = Config::load(&path)?;

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&path)?, after_first);
    Ok(())
}

#[test]
fn test_validator_flags_legacy_before_upgrade() -> Result<()> {
    let warnings = ConfigValidator::new().check_str(LEGACY)?;
    assert_eq!(warnings.len(), 3);
    assert!(warnings.iter().all(|w| w.starts_with("Legacy field 'blogs.tech.")));
    Ok(())
}

#[test]
fn test_missing_file_created_with_defaults() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("nested/config.toml");

    let config = Config::load(&path)?;
    assert_eq!(config, Config::default());
    assert!(path.exists());
    Ok(())
}
