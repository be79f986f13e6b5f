//! External tool execution

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{PluginError, PluginResult};

/// A package manager invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful run printing `stdout`
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with exit code `code`
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into `PluginError::CommandFailed`
    pub fn into_result(self, command: &ToolCommand) -> PluginResult<String> {
        if self.is_success() {
            Ok(self.stdout)
        } else {
            Err(PluginError::CommandFailed {
                command: command.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external tools on behalf of plugins
#[async_trait]
pub trait CommandExecutor: Send + Sync + fmt::Debug {
    /// Run to completion and capture output regardless of exit status
    async fn output(&self, command: &ToolCommand) -> PluginResult<ToolOutput>;

    /// Run and return stdout, failing on a non-zero exit
    async fn run(&self, command: &ToolCommand) -> PluginResult<String> {
        self.output(command).await?.into_result(command)
    }
}

/// Executes tools as child processes with `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn output(&self, command: &ToolCommand) -> PluginResult<ToolOutput> {
        debug!(target: "paxly::exec", "Executing command: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A lookup that times out drops this future; take the child down with it.
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|source| PluginError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        let result = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.is_success() {
            trace!(target: "paxly::exec", "Command completed: {}", command);
        } else {
            debug!(target: "paxly::exec", "Command failed with exit code {:?}: {}", result.code, command);
        }

        Ok(result)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedExecutor;

#[cfg(any(test, feature = "test-utils"))]
mod scripted {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replays canned output keyed by the full command line
    #[derive(Debug, Default)]
    pub struct ScriptedExecutor {
        responses: HashMap<String, ToolOutput>,
        history: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `command_line` with `output`
        pub fn respond(mut self, command_line: &str, output: ToolOutput) -> Self {
            self.responses.insert(command_line.to_string(), output);
            self
        }

        /// Command lines executed so far, in order
        pub fn history(&self) -> Vec<String> {
            self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn output(&self, command: &ToolCommand) -> PluginResult<ToolOutput> {
            let line = command.to_string();
            self.history.lock().unwrap_or_else(|e| e.into_inner()).push(line.clone());

            Ok(self
                .responses
                .get(&line)
                .cloned()
                .unwrap_or_else(|| ToolOutput::failure(127, format!("no scripted response for '{}'", line))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = ToolCommand::new("npm").args(["view", "express", "versions"]).arg("--json");
        assert_eq!(cmd.to_string(), "npm view express versions --json");
    }

    #[test]
    fn test_into_result() {
        let cmd = ToolCommand::new("pip").arg("freeze");
        assert_eq!(ToolOutput::success("a==1.0\n").into_result(&cmd).unwrap(), "a==1.0\n");

        let err = ToolOutput::failure(2, "  boom\n").into_result(&cmd).unwrap_err();
        match err {
            PluginError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let cmd = ToolCommand::new("paxly-definitely-not-a-real-tool");
        let err = SystemExecutor::new().output(&cmd).await.unwrap_err();
        assert!(matches!(err, PluginError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_executor_captures_output() {
        let cmd = ToolCommand::new("sh").args(["-c", "echo hello; echo oops >&2; exit 3"]);
        let output = SystemExecutor::new().output(&cmd).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_scripted_executor() {
        let executor = ScriptedExecutor::new().respond("go version", ToolOutput::success("go1.21"));
        let ok = executor.run(&ToolCommand::new("go").arg("version")).await.unwrap();
        assert_eq!(ok, "go1.21");
        assert!(executor.run(&ToolCommand::new("go").arg("env")).await.is_err());
        assert_eq!(executor.history(), vec!["go version", "go env"]);
    }
}
