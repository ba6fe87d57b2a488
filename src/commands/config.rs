use crate::SyncContext;
use crate::config::Config;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The key is unknown or the value is invalid
/// - Failed to save configuration
pub fn execute(
    ctx: &mut SyncContext,
    key: Option<&str>,
    value: Option<String>,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.save_config()?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else if Config::keys().contains(&key) {
        output::warning(&format!("Configuration key '{key}' is not set"));
    } else {
        return Err(anyhow::anyhow!("Unknown configuration key: {key}"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &SyncContext) {
    println!("{}", "[settings]".bold());
    for key in Config::keys() {
        match ctx.config.get(key) {
            Some(value) => println!("  {key} = {value}"),
            None => println!("  {key} = {}", "(unset)".dimmed()),
        }
    }
    println!("  vault root in use = {}", ctx.vault_root.display());

    for blog in &ctx.config.blogs {
        println!("\n{}", format!("[blog \"{}\"]", blog.name).bold());
        println!("  blogRepoPath = {}", blog.blog_repo_path);
        println!("  autoGit = {}", blog.auto_git);
        println!("  gitPushBranch = {}", blog.push_branch());
        for mapping in &blog.path_mappings {
            let mode = if mapping.strict_prune() { "strict" } else { "lenient" };
            println!("  {} -> {} ({mode})", mapping.source, mapping.target);
        }
    }
}
