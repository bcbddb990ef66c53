//! External command execution
//!
//! Command strings come straight from trusted configuration and are handed to
//! the platform shell verbatim. A run succeeds only when the process exits with
//! status zero and writes nothing to stderr.

use crate::errors::{CommandFailure, CommandResult};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> CommandResult;
}

/// Runs commands through `sh -c` (`cmd /C` on Windows)
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(target_os = "windows"))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> CommandResult {
        log::debug!("Spawning shell command: {}", command);
        let output = Self::shell_command(command)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| CommandFailure::Launch(e.to_string()))?;
        interpret_output(&output)
    }
}

/// Map raw process output onto the success/failure contract
pub fn interpret_output(output: &Output) -> CommandResult {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(CommandFailure::ExitStatus {
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }
    if !stderr.is_empty() {
        return Err(CommandFailure::Stderr(stderr.trim().to_string()));
    }
    Ok(stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command_returns_stdout() {
        let result = ShellRunner::new().run("echo ON").await;
        assert_eq!(result, Ok("ON\n".to_string()));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let result = ShellRunner::new().run("echo nope >&2; exit 3").await;
        assert_eq!(
            result,
            Err(CommandFailure::ExitStatus {
                code: Some(3),
                stderr: "nope".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_stderr_with_zero_exit_is_failure() {
        let result = ShellRunner::new().run("echo warning >&2").await;
        assert_eq!(result, Err(CommandFailure::Stderr("warning".to_string())));
    }

    #[tokio::test]
    async fn test_missing_binary_is_failure() {
        let result = ShellRunner::new()
            .run("definitely-not-a-real-binary-ipcam")
            .await;
        assert!(matches!(result, Err(CommandFailure::ExitStatus { code: Some(127), .. })));
    }
}
