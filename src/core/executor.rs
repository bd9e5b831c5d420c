//! Subprocess execution for check scripts.
//!
//! All real work (linting, codegen, formatting) is delegated to external
//! processes. The executor launches them, captures stdout and stderr into a
//! single transcript, and measures wall-clock time. There is no timeout at
//! this layer; an external watchdog is assumed.

use crate::core::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Output from a script execution.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Exit code of the process (1 if killed by a signal).
    pub exit_code: i32,
    /// Combined stdout and stderr transcript.
    pub output: String,
    /// Wall-clock duration of the call.
    pub duration: Duration,
}

impl ScriptOutput {
    /// Returns true if the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executor for external check tooling.
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs a program to completion, capturing combined output.
    ///
    /// A process that cannot be launched is an error; a process that runs
    /// and exits non-zero is a normal [`ScriptOutput`] for the caller to
    /// classify.
    pub async fn run<S: AsRef<OsStr>>(
        &self,
        program: impl AsRef<OsStr>,
        args: &[S],
        cwd: &Path,
    ) -> Result<ScriptOutput> {
        let start = std::time::Instant::now();
        let program = program.as_ref();

        tracing::debug!(program = %program.to_string_lossy(), "spawning check subprocess");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            Error::io(
                format!("spawn {}", program.to_string_lossy()),
                e,
            )
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_handle = tokio::spawn(async move {
            let mut output = String::new();
            if let Some(stdout) = stdout {
                let mut reader = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            output
        });

        let stderr_handle = tokio::spawn(async move {
            let mut output = String::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            output
        });

        let status = child
            .wait()
            .await
            .map_err(|e| Error::io("wait for subprocess", e))?;

        let stdout = stdout_handle.await.map_err(|e| Error::Internal {
            message: format!("stdout task failed: {e}"),
        })?;
        let stderr = stderr_handle.await.map_err(|e| Error::Internal {
            message: format!("stderr task failed: {e}"),
        })?;

        let mut output = stdout;
        output.push_str(&stderr);

        Ok(ScriptOutput {
            exit_code: status.code().unwrap_or(1),
            output,
            duration: start.elapsed(),
        })
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}
