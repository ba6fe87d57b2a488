use std::fmt;

/// Fallback detail used when a failed command printed nothing.
pub const NO_OUTPUT_MESSAGE: &str = "command failed without producing any output";

/// What kind of problem a failed command sequence ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// DNS failure, timeout, unreachable remote
    Network,
    /// SSH key, password or token rejected
    Authentication,
    /// Remote refused the push (non-fast-forward, hooks)
    Rejected,
    /// The commit step found nothing staged
    NothingToCommit,
    /// Missing branch, remote, repository or executable
    NotFound,
    /// Anything not recognised above
    Unknown,
}

impl CommandErrorKind {
    /// Categorise a failure from its captured output
    #[must_use]
    pub fn classify(output: &str) -> Self {
        let lower = output.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if any(&["nothing to commit", "no changes added to commit"]) {
            Self::NothingToCommit
        } else if any(&[
            "could not resolve host",
            "connection timed out",
            "network is unreachable",
            "failed to connect",
            "connection refused",
        ]) {
            Self::Network
        } else if any(&[
            "authentication failed",
            "publickey",
            "access denied",
            "invalid credentials",
            "could not read username",
        ]) {
            Self::Authentication
        } else if any(&[
            "non-fast-forward",
            "[rejected]",
            "failed to push some refs",
            "pre-receive hook declined",
        ]) {
            Self::Rejected
        } else if any(&[
            "does not exist",
            "not found",
            "does not appear to be a git repository",
            "not a git repository",
            "src refspec",
            "no such",
        ]) {
            Self::NotFound
        } else {
            Self::Unknown
        }
    }

    /// Short description of the kind
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Network => "Network error",
            Self::Authentication => "Authentication failed",
            Self::Rejected => "Push rejected",
            Self::NothingToCommit => "Nothing to commit",
            Self::NotFound => "Not found",
            Self::Unknown => "Command failed",
        }
    }

    /// Actionable suggestions for the kind, if any
    #[must_use]
    pub const fn hints(self) -> &'static [&'static str] {
        match self {
            Self::Network => &[
                "Check your internet connection",
                "Verify the remote URL is correct",
                "Try again in a few moments",
            ],
            Self::Authentication => &[
                "Verify your SSH key is configured (ssh-add -l)",
                "Ensure your token/password hasn't expired",
                "For HTTPS, you may need to set up a credential helper",
            ],
            Self::Rejected => &[
                "Pull the latest changes into the blog repository first",
                "Resolve any merge conflicts, then sync again",
            ],
            Self::NothingToCommit => &["The blog repository already matches the synced content"],
            Self::NotFound => &[
                "Check that blogRepoPath points at a git working tree",
                "Verify the 'origin' remote and the push branch exist",
            ],
            Self::Unknown => &[],
        }
    }
}

/// A command sequence that exited unsuccessfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// The joined command line that ran
    pub command: String,
    /// Exit code, `None` if the process never started or was killed
    pub exit_code: Option<i32>,
    /// Captured standard error, verbatim
    pub stderr: String,
    /// Captured standard output
    pub stdout: String,
    pub kind: CommandErrorKind,
}

impl CommandError {
    #[must_use]
    pub fn new(command: String, exit_code: Option<i32>, stderr: String, stdout: String) -> Self {
        let kind = CommandErrorKind::classify(&format!("{stderr}\n{stdout}"));
        Self {
            command,
            exit_code,
            stderr,
            stdout,
            kind,
        }
    }

    /// The most useful text the command produced
    ///
    /// Standard error when present, then standard output (git reports some
    /// failures such as "nothing to commit" there), then a fixed fallback.
    #[must_use]
    pub fn detail(&self) -> &str {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(NO_OUTPUT_MESSAGE)
    }

    /// Message with the detail and any suggestions for the error kind
    #[must_use]
    pub fn user_message(&self) -> String {
        let mut message = format!("{}: {}", self.kind.label(), self.detail());
        let hints = self.kind.hints();
        if !hints.is_empty() {
            message.push_str("\n\nSuggestions:");
            for hint in hints {
                message.push_str("\n - ");
                message.push_str(hint);
            }
        }
        message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.detail())
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fatal: Could not resolve host: github.com", CommandErrorKind::Network)]
    #[case(
        "git@github.com: Permission denied (publickey).",
        CommandErrorKind::Authentication
    )]
    #[case(
        " ! [rejected]        main -> main (fetch first)\nerror: failed to push some refs",
        CommandErrorKind::Rejected
    )]
    #[case(
        "On branch main\nnothing to commit, working tree clean",
        CommandErrorKind::NothingToCommit
    )]
    #[case(
        "fatal: 'origin' does not appear to be a git repository",
        CommandErrorKind::NotFound
    )]
    #[case("error: src refspec deploy does not match any", CommandErrorKind::NotFound)]
    #[case("segfault", CommandErrorKind::Unknown)]
    fn test_classify(#[case] output: &str, #[case] expected: CommandErrorKind) {
        assert_eq!(CommandErrorKind::classify(output), expected);
    }

    #[test]
    fn test_detail_prefers_stderr() {
        let err = CommandError::new("x".into(), Some(1), "boom\n".into(), "noise".into());
        assert_eq!(err.detail(), "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_detail_falls_back() {
        let err = CommandError::new("x".into(), Some(1), String::new(), "nothing to commit".into());
        assert_eq!(err.detail(), "nothing to commit");
        assert_eq!(err.kind, CommandErrorKind::NothingToCommit);

        let silent = CommandError::new("x".into(), Some(1), "  ".into(), String::new());
        assert_eq!(silent.detail(), NO_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_user_message_has_hints() {
        let err = CommandError::new(
            "git push".into(),
            Some(128),
            "fatal: Authentication failed for 'https://example.com/r.git'".into(),
            String::new(),
        );
        let message = err.user_message();
        assert!(message.starts_with("Authentication failed: fatal:"));
        assert!(message.contains("Suggestions:"));
    }
}
