use super::errors::CommandError;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Separator that runs each command only if the previous one succeeded.
pub const AND_THEN: &str = " && ";

/// Runs an ordered command sequence in a working directory
pub trait CommandRunner {
    /// Run `commands` in `dir`, stopping at the first failure.
    ///
    /// Returns the captured standard output of the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] carrying the captured output if any
    /// command exits unsuccessfully or the shell cannot be started
    fn run(&self, dir: &Path, commands: &[String]) -> Result<String, CommandError>;
}

/// Runs the sequence through the platform shell in a single process.
///
/// Inherits the ambient environment and credentials. Standard input is
/// closed so a credential prompt fails instead of hanging.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Join the sequence into one command line.
    #[must_use]
    pub fn join(commands: &[String]) -> String {
        commands.join(AND_THEN)
    }

    #[cfg(windows)]
    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", script]);
        cmd
    }

    #[cfg(not(windows))]
    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, dir: &Path, commands: &[String]) -> Result<String, CommandError> {
        let script = Self::join(commands);
        debug!(dir = %dir.display(), command = %script, "running command sequence");

        let output = Self::shell(&script)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                CommandError::new(
                    script.clone(),
                    None,
                    format!("Failed to start shell in {}: {e}", dir.display()),
                    String::new(),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        warn!(
            command = %script,
            code = ?output.status.code(),
            "command sequence failed"
        );
        Err(CommandError::new(
            script,
            output.status.code(),
            stderr,
            stdout,
        ))
    }
}
