use crate::config::Config;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::Path;

/// Write a default configuration file
///
/// # Errors
///
/// Returns an error if:
/// - A configuration already exists and `force` is not set
/// - Failed to save the configuration
pub fn execute(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default()
        .save(config_path)
        .context("Failed to save default configuration")?;

    super::print_success(&format!(
        "Initialized configuration at {}",
        config_path.display()
    ));
    println!("\n{}", "Quick start:".bold());
    println!("  Add a blog to the configuration file:");
    println!();
    println!("    [[blogs]]");
    println!("    name = \"my-blog\"");
    println!("    blogRepoPath = \"~/src/my-blog\"");
    println!("    autoGit = true");
    println!();
    println!("    [[blogs.pathMappings]]");
    println!("    source = \"Blog\"");
    println!("    target = \"content/posts\"");
    println!();
    println!("  blogsync status           # Check configured mappings");
    println!("  blogsync                  # Sync now");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_default() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("blogsync/config.toml");

        execute(&path, false)?;
        assert_eq!(Config::load(&path)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_init_refuses_overwrite() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "autoSlug = false\n")?;

        assert!(execute(&path, false).is_err());
        execute(&path, true)?;
        assert!(Config::load(&path)?.auto_slug);
        Ok(())
    }
}
