//! # Sync Pass
//!
//! Runs every configured profile once, strictly in order, and mappings
//! within a profile in order.
//!
//! ## Per mapping
//!
//! 1. Resolve `source` against the vault root and `target` against the
//!    profile's repository (absolute paths pass through)
//! 2. Detect changes in the source folder, which also rewrites its manifest
//! 3. With `autoSlug`, write a fresh slug into every changed document that
//!    has none
//! 4. Mirror the source tree into the target
//!
//! ## Per profile
//!
//! Changed paths from all mappings are collected relative to the
//! repository. If there are any and `autoGit` is set, the repository is
//! staged, committed and pushed in one command sequence.
//!
//! Nothing inside a profile aborts the pass. Problems are collected into
//! the [`SyncReport`], and a failing push only marks its own profile.

use crate::config::{PathMapping, SyncProfile};
use crate::frontmatter::{has_slug, inject_slug, slug_value};
use crate::git::{CommandRunner, publish_commands};
use crate::lock::SyncLock;
use crate::mirror::{ChangeKind, reconcile};
use crate::output::{Level, Notifier};
use crate::slug::{SlugAllocator, SlugRegistry};
use crate::tracking::{ChangeSet, DetectOptions, detect};
use crate::utils::commit::build_commit_message;
use crate::utils::is_markdown;
use crate::utils::paths::{expand_tilde, normalize_to_relative, resolve_against, to_slash};
use crate::SyncContext;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span, warn};

/// How a profile ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// Not processed because of a configuration problem
    Skipped(String),
    /// Mappings ran and nothing changed
    NoChanges,
    /// Files changed; `autoGit` is off
    Synced { changes: usize },
    /// Files changed and were pushed
    Pushed { changes: usize },
    /// Files changed but the git sequence failed
    GitFailed { changes: usize, error: String },
}

impl fmt::Display for ProfileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::NoChanges => f.write_str("no changes"),
            Self::Synced { changes } => write!(f, "{} synced", plural(*changes)),
            Self::Pushed { changes } => write!(f, "{} pushed", plural(*changes)),
            Self::GitFailed { changes, error } => {
                write!(f, "{} synced, git failed: {error}", plural(*changes))
            }
        }
    }
}

fn plural(changes: usize) -> String {
    if changes == 1 {
        "1 change".to_string()
    } else {
        format!("{changes} changes")
    }
}

/// Result of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    pub name: String,
    pub outcome: ProfileOutcome,
    /// Changed paths relative to the repository, in mapping order
    pub changed: Vec<String>,
    /// Per-mapping and per-file problems that were skipped
    pub problems: Vec<String>,
}

impl ProfileReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: ProfileOutcome::NoChanges,
            changed: Vec::new(),
            problems: Vec::new(),
        }
    }

    fn problem(&mut self, message: String) {
        warn!(profile = %self.name, "{message}");
        self.problems.push(message);
    }
}

/// Result of one sync pass over all profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub profiles: Vec<ProfileReport>,
}

impl SyncReport {
    /// Returns `true` if any profile failed to push or hit a problem.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.profiles.iter().any(|p| {
            !p.problems.is_empty() || matches!(p.outcome, ProfileOutcome::GitFailed { .. })
        })
    }

    /// Total number of changed paths across profiles.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.profiles.iter().map(|p| p.changed.len()).sum()
    }

    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&ProfileReport> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.profiles.is_empty() {
            return f.write_str("No blogs configured");
        }
        for (index, profile) in self.profiles.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", profile.name, profile.outcome)?;
            for problem in &profile.problems {
                write!(f, "\n  - {problem}")?;
            }
        }
        Ok(())
    }
}

/// Drives one sync pass.
pub struct SyncEngine<'a> {
    ctx: &'a mut SyncContext,
    runner: &'a dyn CommandRunner,
    notifier: &'a dyn Notifier,
}

impl<'a> SyncEngine<'a> {
    #[must_use]
    pub fn new(
        ctx: &'a mut SyncContext,
        runner: &'a dyn CommandRunner,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            ctx,
            runner,
            notifier,
        }
    }

    /// Sync every profile and notify the aggregated report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the run lock cannot be taken, e.g. because
    /// another pass is still running. Profile failures are part of the
    /// report.
    pub fn run(&mut self) -> Result<SyncReport> {
        let _lock = SyncLock::acquire(&self.ctx.data_dir)?;
        let mut registry = SlugRegistry::load(&self.ctx.data_dir);

        let profiles = self.ctx.config.blogs.clone();
        let mut report = SyncReport::default();
        for profile in &profiles {
            report.profiles.push(self.sync_profile(profile, &mut registry));
        }

        let level = if report.has_errors() {
            Level::Warning
        } else {
            Level::Success
        };
        self.notifier.notify(level, &report.to_string());
        Ok(report)
    }

    fn sync_profile(&mut self, profile: &SyncProfile, registry: &mut SlugRegistry) -> ProfileReport {
        let span = info_span!("profile", name = %profile.name);
        let _enter = span.enter();
        let mut report = ProfileReport::new(&profile.name);

        let repo = match profile.repo_path().map(|p| expand_tilde(&p)) {
            None => return self.skip(report, "no blogRepoPath configured".to_string()),
            Some(Err(e)) => return self.skip(report, format!("{e:#}")),
            Some(Ok(repo)) => repo,
        };
        if !repo.is_dir() {
            return self.skip(report, format!("repository not found: {}", repo.display()));
        }
        if profile.path_mappings.is_empty() {
            return self.skip(report, "no path mappings".to_string());
        }

        for mapping in &profile.path_mappings {
            self.sync_mapping(&repo, mapping, registry, &mut report);
        }

        let changes = report.changed.len();
        if changes == 0 {
            return report;
        }
        if !profile.auto_git {
            report.outcome = ProfileOutcome::Synced { changes };
            return report;
        }

        let message = build_commit_message(&report.changed);
        let commands = publish_commands(&message, profile.push_branch());
        report.outcome = match self.runner.run(&repo, &commands) {
            Ok(_) => {
                info!(changes, branch = profile.push_branch(), "pushed");
                ProfileOutcome::Pushed { changes }
            }
            Err(e) => {
                self.notifier
                    .notify(Level::Error, &format!("{}: {}", profile.name, e.user_message()));
                ProfileOutcome::GitFailed {
                    changes,
                    error: e.detail().to_string(),
                }
            }
        };
        report
    }

    fn skip(&self, mut report: ProfileReport, reason: String) -> ProfileReport {
        self.notifier.notify(
            Level::Warning,
            &format!("Skipping blog '{}': {reason}", report.name),
        );
        report.outcome = ProfileOutcome::Skipped(reason);
        report
    }

    fn sync_mapping(
        &mut self,
        repo: &Path,
        mapping: &PathMapping,
        registry: &mut SlugRegistry,
        report: &mut ProfileReport,
    ) {
        let span = info_span!("mapping", source = %mapping.source, target = %mapping.target);
        let _enter = span.enter();

        let source_text = mapping.source.trim();
        if source_text.is_empty() {
            report.problem("Path mapping has an empty source".to_string());
            return;
        }
        let (source, target) = match (
            resolve_against(&self.ctx.vault_root, source_text),
            resolve_against(repo, mapping.target.trim()),
        ) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(e), _) | (_, Err(e)) => {
                report.problem(format!("{e:#}"));
                return;
            }
        };
        if !source.is_dir() {
            report.problem(format!("Source folder not found: {}", source.display()));
            return;
        }

        let auto_slug = self.ctx.config.auto_slug;
        match detect(
            &source,
            DetectOptions {
                check_missing_ids: auto_slug,
            },
        ) {
            Ok(changes) => {
                debug!(
                    changed = changes.new_or_modified.len(),
                    deleted = changes.deleted.len(),
                    "detected"
                );
                if auto_slug {
                    self.assign_slugs(&source, &changes, registry, report);
                }
                for name in &changes.deleted {
                    self.notifier
                        .notify(Level::Info, &format!("Removed from source: {name}"));
                }
            }
            Err(e) => report.problem(format!("{e:#}")),
        }

        let mirrored = reconcile(&source, &target, mapping.strict_prune());
        for change in &mirrored.changes {
            let path = to_slash(&normalize_to_relative(&target.join(&change.path), repo));
            let verb = match change.kind {
                ChangeKind::Copied => "Copied",
                ChangeKind::Deleted => "Deleted",
            };
            self.notifier.notify(Level::Detail, &format!("{verb} {path}"));
            report.changed.push(path);
        }
        for failure in mirrored.failures {
            report.problem(failure.message);
        }
    }

    /// Give every changed document without a slug a fresh one.
    ///
    /// Each document is read at most once. A failed allocation or write
    /// is reported and the remaining documents are still processed.
    fn assign_slugs(
        &mut self,
        source: &Path,
        changes: &ChangeSet,
        registry: &mut SlugRegistry,
        report: &mut ProfileReport,
    ) {
        let mut texts = BTreeMap::new();
        for name in &changes.new_or_modified {
            let path = source.join(name);
            match fs::read_to_string(&path) {
                Ok(text) => {
                    texts.insert(name.clone(), text);
                }
                Err(e) => report.problem(format!("Failed to read {}: {e}", path.display())),
            }
        }
        let pending: Vec<(&String, &String)> =
            texts.iter().filter(|(_, text)| !has_slug(text)).collect();
        if pending.is_empty() {
            return;
        }

        let mode = self.ctx.config.slug_generation_method;
        let mut allocator =
            SlugAllocator::new(registry, mode).reserve(existing_slugs(source, &texts));
        for (name, text) in pending {
            let slug = match allocator.allocate(&mut *self.ctx) {
                Ok(slug) => slug,
                Err(e) => {
                    report.problem(format!("Failed to allocate a slug for {name}: {e:#}"));
                    continue;
                }
            };
            let path = source.join(name);
            match fs::write(&path, inject_slug(text, &slug)) {
                Ok(()) => self
                    .notifier
                    .notify(Level::Detail, &format!("Assigned slug {slug} to {name}")),
                Err(e) => report.problem(format!("Failed to write {}: {e}", path.display())),
            }
        }
    }
}

/// Slugs already written into the documents of `source`.
///
/// Documents in `known` are taken from memory; the rest are read from disk.
fn existing_slugs(source: &Path, known: &BTreeMap<String, String>) -> Vec<String> {
    let mut slugs: Vec<String> = known
        .values()
        .filter_map(|text| slug_value(text).map(str::to_string))
        .collect();

    let Ok(entries) = fs::read_dir(source) else {
        return slugs;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if known.contains_key(&name) || !path.is_file() || !is_markdown(&path) {
            continue;
        }
        if let Ok(text) = fs::read_to_string(&path)
            && let Some(slug) = slug_value(&text)
        {
            slugs.push(slug.to_string());
        }
    }
    slugs
}
