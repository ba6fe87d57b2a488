pub mod fixtures {
    use crate::SyncContext;
    use crate::config::{Config, PathMapping, SyncProfile};
    use anyhow::Result;
    use filetime::FileTime;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Write `content` to `path`, creating parent directories.
    pub fn write_file(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Pin the modification time of `path` to `seconds` since the epoch.
    pub fn set_mtime(path: &Path, seconds: i64) -> Result<()> {
        filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, 0))?;
        Ok(())
    }

    /// A scratch vault, data directory and blog repository.
    pub struct TestVault {
        pub temp_dir: TempDir,
        pub vault_root: PathBuf,
        pub data_dir: PathBuf,
        pub config_path: PathBuf,
        pub repo_path: PathBuf,
    }

    impl TestVault {
        pub fn new() -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
            let vault_root = temp_dir.path().join("vault");
            let data_dir = temp_dir.path().join("data");
            let repo_path = temp_dir.path().join("blog");
            let config_path = temp_dir.path().join("config/config.toml");
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

        /// Create a document under the vault root.
        pub fn note(&self, relative: &str, content: &str) -> Result<PathBuf> {
            let path = self.vault_root.join(relative);
            write_file(&path, content)?;
            Ok(path)
        }

        /// A profile pointing at this vault's repository.
        pub fn profile(&self, name: &str, mappings: &[(&str, &str, bool)]) -> SyncProfile {
            SyncProfile {
                name: name.to_string(),
                blog_repo_path: self.repo_path.display().to_string(),
                auto_git: false,
                git_push_branch: "main".to_string(),
                path_mappings: mappings
                    .iter()
                    .map(|(source, target, strict)| PathMapping {
                        source: (*source).to_string(),
                        target: (*target).to_string(),
                        enable_folder_matching: *strict,
                    })
                    .collect(),
            }
        }

        /// Save `config` and build a context around it.
        pub fn context(&self, config: &Config) -> Result<SyncContext> {
            config.save(&self.config_path)?;
            SyncContext::new_explicit(
                self.config_path.clone(),
                self.data_dir.clone(),
                Some(self.vault_root.clone()),
            )
        }
    }
}
