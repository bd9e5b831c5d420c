//! Optional per-check result reporting.
//!
//! When a sink path is configured (CLI flag, `PRESUBMIT_SINK` environment
//! variable, or `presubmit.toml`), the orchestrator appends one JSON record
//! per check: name, pass/fail status, elapsed time, and a failure reason
//! joined from the check's fatal results. Without a sink, reporting is
//! silently skipped. The sink is scoped to one run and released on drop.

use crate::config::Config;
use crate::core::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the sink file.
pub const SINK_ENV_VAR: &str = "PRESUBMIT_SINK";

/// Status of one check as reported to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// No fatal result in the check's output.
    #[serde(rename = "PASS")]
    Pass,
    /// At least one fatal result in the check's output.
    #[serde(rename = "FAIL")]
    Fail,
}

/// One record appended to the sink file.
#[derive(Debug, Serialize)]
struct SinkRecord<'a> {
    check: &'a str,
    status: CheckStatus,
    elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_reason: Option<&'a str>,
    timestamp: DateTime<Utc>,
}

/// A line-oriented JSON result sink.
#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
    file: std::fs::File,
}

impl ResultSink {
    /// Opens a sink for appending, creating the file if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io("open result sink", e))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Resolves the sink from CLI flag, environment, then configuration.
    ///
    /// Returns None when no sink is configured anywhere, and also when the
    /// configured sink cannot be opened: an unavailable sink disables
    /// reporting, it never fails the run.
    #[must_use]
    pub fn from_options(cli_path: Option<&Path>, config: &Config) -> Option<Self> {
        let env_path = std::env::var(SINK_ENV_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let path = cli_path
            .map(Path::to_path_buf)
            .or(env_path)
            .or_else(|| config.sink.path.clone())?;

        match Self::open(&path) {
            Ok(sink) => Some(sink),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "result sink unavailable, reporting skipped");
                None
            }
        }
    }

    /// Returns the sink file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one per-check record.
    pub fn report(
        &mut self,
        check: &str,
        status: CheckStatus,
        elapsed: Duration,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        let record = SinkRecord {
            check,
            status,
            elapsed_secs: elapsed.as_secs_f64(),
            failure_reason,
            timestamp: Utc::now(),
        };

        let line = serde_json::to_string(&record).map_err(|e| Error::Internal {
            message: format!("serialize sink record: {e}"),
        })?;

        writeln!(self.file, "{line}").map_err(|e| Error::io("write result sink", e))?;

        Ok(())
    }
}
