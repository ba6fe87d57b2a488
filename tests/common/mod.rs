#![allow(dead_code)]

use anyhow::Result;
use blogsync::SyncContext;
use blogsync::config::{Config, PathMapping, SyncProfile};
use blogsync::git::{CommandError, CommandRunner};
use filetime::FileTime;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Pin the modification time of `path` to `seconds` since the epoch
pub fn set_mtime(path: &Path, seconds: i64) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, 0))?;
    Ok(())
}

/// Scratch vault, data directory, config file and blog repository
pub struct TestVault {
    pub temp_dir: TempDir,
    pub vault_root: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub repo_path: PathBuf,
}

impl TestVault {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let vault_root = temp_dir.path().join("vault");
        let data_dir = temp_dir.path().join("data");
        let config_path = temp_dir.path().join("config/config.toml");
        let repo_path = temp_dir.path().join("blog");
        fs::create_dir_all(&vault_root)?;
        fs::create_dir_all(&repo_path)?;

        Ok(Self {
            temp_dir,
            vault_root,
            data_dir,
            config_path,
            repo_path,
        })
    }

    /// Get the temporary directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn note(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.vault_root.join(relative);
        write_file(&path, content)?;
        Ok(path)
    }

    pub fn read_note(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.vault_root.join(relative))?)
    }

    pub fn read_published(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.repo_path.join(relative))?)
    }

    pub fn profile(&self, name: &str, source: &str, target: &str, strict: bool) -> SyncProfile {
        SyncProfile {
            name: name.to_string(),
            blog_repo_path: self.repo_path.display().to_string(),
            auto_git: false,
            git_push_branch: "main".to_string(),
            path_mappings: vec![PathMapping {
                source: source.to_string(),
                target: target.to_string(),
                enable_folder_matching: strict,
            }],
        }
    }

    /// Save `config` and load a context from it
    pub fn context(&self, config: &Config) -> Result<SyncContext> {
        config.save(&self.config_path)?;
        SyncContext::new_explicit(
            self.config_path.clone(),
            self.data_dir.clone(),
            Some(self.vault_root.clone()),
        )
    }
}

/// Records command sequences instead of running them
#[derive(Default)]
pub struct MockRunner {
    pub calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
    /// Call indices that fail with the given stderr
    pub failures: Vec<(usize, String)>,
}

impl MockRunner {
    pub fn failing_on(index: usize, stderr: &str) -> Self {
        Self {
            failures: vec![(index, stderr.to_string())],
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, dir: &Path, commands: &[String]) -> Result<String, CommandError> {
        let index = self.call_count();
        self.calls
            .borrow_mut()
            .push((dir.to_path_buf(), commands.to_vec()));
        match self.failures.iter().find(|(i, _)| *i == index) {
            Some((_, stderr)) => Err(CommandError::new(
                commands.join(" && "),
                Some(1),
                stderr.clone(),
                String::new(),
            )),
            None => Ok(String::new()),
        }
    }
}

/// Returns `true` if a git executable is on PATH
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run git in `dir`, failing on a non-zero exit
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()?;
    anyhow::ensure!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Turn `repo` into a git working tree on `main` pushing to a local bare remote
pub fn init_git_repo(repo: &Path, remote: &Path) -> Result<()> {
    fs::create_dir_all(remote)?;
    git(remote, &["init", "-q", "--bare"])?;
    git(repo, &["init", "-q"])?;
    git(repo, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(repo, &["config", "user.email", "test@example.com"])?;
    git(repo, &["config", "user.name", "Test"])?;
    git(repo, &["config", "commit.gpgsign", "false"])?;
    let remote_url = remote.display().to_string();
    git(repo, &["remote", "add", "origin", &remote_url])?;
    Ok(())
}
