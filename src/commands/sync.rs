use crate::SyncContext;
use crate::git::ShellCommandRunner;
use crate::output::ConsoleNotifier;
use crate::sync::SyncEngine;
use anyhow::{Result, bail};

/// Run one sync pass over every configured blog
///
/// # Errors
///
/// Returns an error if:
/// - Another sync pass is running
/// - Any profile reported a problem or failed to push
pub fn execute(ctx: &mut SyncContext) -> Result<()> {
    if ctx.config.blogs.iter().any(|b| b.auto_git) && which::which("git").is_err() {
        super::print_warning("git was not found on PATH; publishing will fail");
    }

    let runner = ShellCommandRunner::new();
    let notifier = ConsoleNotifier;
    let report = SyncEngine::new(ctx, &runner, &notifier).run()?;

    if report.has_errors() {
        bail!("Sync finished with errors");
    }
    Ok(())
}
