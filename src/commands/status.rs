use crate::SyncContext;
use crate::slug::SlugRegistry;
use crate::tracking::SourceManifest;
use crate::utils::formatters::{format_relative_time, format_timestamp_millis};
use crate::utils::now_millis;
use crate::utils::paths::resolve_against;
use anyhow::Result;
use colored::Colorize;

/// State of one mapping's source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingStatus {
    pub source: String,
    pub target: String,
    pub strict: bool,
    /// `None` when the source folder does not exist
    pub manifest: Option<SourceManifest>,
}

/// Collect mapping states for every profile, in configuration order.
///
/// # Errors
///
/// Returns an error if a mapping source cannot be resolved
pub fn collect(ctx: &SyncContext) -> Result<Vec<(String, Vec<MappingStatus>)>> {
    let mut profiles = Vec::with_capacity(ctx.config.blogs.len());
    for blog in &ctx.config.blogs {
        let mut mappings = Vec::with_capacity(blog.path_mappings.len());
        for mapping in &blog.path_mappings {
            let source = resolve_against(&ctx.vault_root, mapping.source.trim())?;
            mappings.push(MappingStatus {
                source: source.display().to_string(),
                target: mapping.target.clone(),
                strict: mapping.strict_prune(),
                manifest: source.is_dir().then(|| SourceManifest::load(&source)),
            });
        }
        profiles.push((blog.name.clone(), mappings));
    }
    Ok(profiles)
}

/// Print manifest state per mapping and the registry size
///
/// # Errors
///
/// Returns an error if a mapping source cannot be resolved
pub fn execute(ctx: &SyncContext) -> Result<()> {
    if ctx.config.blogs.is_empty() {
        super::print_info("No blogs configured");
        println!("Edit {} to add one", ctx.config_path.display());
        return Ok(());
    }

    let now = now_millis();
    for (name, mappings) in collect(ctx)? {
        println!("{}", name.bold());
        if mappings.is_empty() {
            super::print_warning("no path mappings");
        }
        for mapping in mappings {
            print_mapping(&mapping, now);
        }
        println!();
    }

    let registry = SlugRegistry::load(&ctx.data_dir);
    println!(
        "{} slugs issued (registry: {})",
        registry.len(),
        ctx.data_dir.join(crate::REGISTRY_FILE).display()
    );
    Ok(())
}

fn print_mapping(mapping: &MappingStatus, now: i64) {
    let mode = if mapping.strict { "strict" } else { "lenient" };
    println!(
        "  {} -> {} {}",
        mapping.source,
        if mapping.target.is_empty() { "." } else { &mapping.target },
        format!("({mode})").dimmed()
    );
    match &mapping.manifest {
        None => println!("    {}", "source folder not found".red()),
        Some(manifest) if manifest.is_first_run() => {
            println!("    {}", "never synced".yellow());
        }
        Some(manifest) => println!(
            "    last run {} ({}), {} documents",
            format_timestamp_millis(manifest.last_run),
            format_relative_time(manifest.last_run, now),
            manifest.files.len()
        ),
    }
}
