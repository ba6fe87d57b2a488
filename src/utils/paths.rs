use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolves `path` against `base` unless it is already absolute.
///
/// A leading `~/` is expanded to the home directory first.
///
/// # Errors
///
/// Returns an error if the path uses `~` and the home directory cannot be determined
pub fn resolve_against(base: &Path, path: &str) -> Result<PathBuf> {
    let expanded = expand_tilde(Path::new(path))?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(path_str) = path.to_str() {
        if path_str.starts_with("~/") || path_str == "~" {
            let home = dirs::home_dir().context("Could not find home directory")?;
            if path_str == "~" {
                Ok(home)
            } else {
                Ok(home.join(&path_str[2..]))
            }
        } else {
            Ok(path.to_path_buf())
        }
    } else {
        Ok(path.to_path_buf())
    }
}

/// Normalizes a path to be relative to a base directory
#[must_use]
pub fn normalize_to_relative(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.strip_prefix(base).unwrap_or(path).to_path_buf()
    } else {
        path.to_path_buf()
    }
}

/// Renders a relative path with forward slashes for manifests and reports.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() -> Result<()> {
        let resolved = resolve_against(Path::new("/vault"), "Blog/posts")?;
        assert_eq!(resolved, PathBuf::from("/vault/Blog/posts"));
        Ok(())
    }

    #[test]
    fn test_resolve_absolute_passes_through() -> Result<()> {
        let resolved = resolve_against(Path::new("/vault"), "/srv/site/content")?;
        assert_eq!(resolved, PathBuf::from("/srv/site/content"));
        Ok(())
    }

    #[test]
    fn test_resolve_empty_is_base() -> Result<()> {
        let resolved = resolve_against(Path::new("/repo"), "")?;
        assert_eq!(resolved, PathBuf::from("/repo"));
        Ok(())
    }

    #[test]
    fn test_normalize_to_relative() {
        let rel = normalize_to_relative(Path::new("/repo/content/a.md"), Path::new("/repo"));
        assert_eq!(rel, PathBuf::from("content/a.md"));

        let outside = normalize_to_relative(Path::new("/other/a.md"), Path::new("/repo"));
        assert_eq!(outside, PathBuf::from("/other/a.md"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(&Path::new("posts").join("a.md")), "posts/a.md");
    }
}
