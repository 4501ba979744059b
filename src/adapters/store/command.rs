//! External command execution
//!
//! Store operations that shell out (`hdfs dfs -ls`, `-mv`, `-rm`) go through
//! [`CommandRunner`], so tests can script the responses and the HDFS adapter
//! stays free of process plumbing.

use crate::domain::{Result, StoreError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Exit status plus combined stdout/stderr of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code (-1 when terminated by a signal)
    pub status: i32,

    /// stdout followed by stderr, trimmed
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external programs
///
/// A non-zero exit status is returned as a normal [`CommandOutput`]; only the
/// inability to run the program at all (or a timeout) is an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner with an optional per-command deadline
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Runner whose deadline is given in seconds; 0 disables it
    pub fn with_timeout_secs(seconds: u64) -> Self {
        Self::new((seconds > 0).then(|| Duration::from_secs(seconds)))
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let rendered = render_command(program, args);
        tracing::debug!(command = %rendered, "Running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(StoreError::CommandTimeout {
                        command: rendered,
                        seconds: limit.as_secs(),
                    }
                    .into())
                }
            },
            None => command.output().await,
        }
        .map_err(|e| StoreError::CommandSpawn {
            command: rendered.clone(),
            message: e.to_string(),
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            output: text.trim().to_string(),
        };

        tracing::debug!(command = %rendered, status = result.status, "Command finished");
        Ok(result)
    }
}

/// Human-readable command line for logs and error messages
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
