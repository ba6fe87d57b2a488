use std::path::Path;

/// Number of file names listed in a generated commit message.
pub const MESSAGE_FILE_LIMIT: usize = 5;

/// Builds the commit message for a batch of synced paths.
///
/// Lists the first [`MESSAGE_FILE_LIMIT`] distinct file basenames in the
/// order they were changed, comma-joined, followed by `and N more` when
/// further distinct names were left out.
#[must_use]
pub fn build_commit_message<P: AsRef<Path>>(changed: &[P]) -> String {
    let mut names: Vec<String> = Vec::new();
    for path in changed {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .into_owned();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return "Sync blog content".to_string();
    }

    let shown = names
        .iter()
        .take(MESSAGE_FILE_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    let hidden = names.len().saturating_sub(MESSAGE_FILE_LIMIT);
    if hidden > 0 {
        format!("Sync: {shown} and {hidden} more")
    } else {
        format!("Sync: {shown}")
    }
}
