//! Publishing synced content through git.
//!
//! A profile with `autoGit` enabled stages, commits and pushes its
//! repository after a pass that changed files. The three steps run as one
//! shell sequence through a [`CommandRunner`], so a failing commit never
//! reaches the push.

pub mod errors;
pub mod runner;

pub use errors::{CommandError, CommandErrorKind};
pub use runner::{CommandRunner, ShellCommandRunner};

/// Remote every push goes to.
pub const REMOTE: &str = "origin";

/// The stage/commit/push sequence for one profile.
///
/// Arguments are quoted for the shell [`ShellCommandRunner`] uses on this
/// platform.
#[must_use]
pub fn publish_commands(message: &str, branch: &str) -> Vec<String> {
    vec![
        "git add -A".to_string(),
        format!("git commit -m {}", quote_arg(message)),
        format!("git push {REMOTE} {}", quote_arg(branch)),
    ]
}

/// Quote one argument for the platform shell.
#[must_use]
pub fn quote_arg(arg: &str) -> String {
    if cfg!(windows) {
        cmd_quote(arg)
    } else {
        shell_words::quote(arg).into_owned()
    }
}

/// Quote one argument for `cmd /C` following the MSVC argv rules.
///
/// Backslashes are doubled only where they precede a quote.
#[must_use]
pub fn cmd_quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                continue;
            }
            '"' => out.extend(std::iter::repeat_n('\\', backslashes * 2 + 1)),
            _ => out.extend(std::iter::repeat_n('\\', backslashes)),
        }
        backslashes = 0;
        out.push(c);
    }
    out.extend(std::iter::repeat_n('\\', backslashes * 2));
    out.push('"');
    out
}
