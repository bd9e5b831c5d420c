//! Check orchestration.
//!
//! Runs the registry in order, aggregates every check's results without
//! reordering, and optionally reports one timing/status record per check to
//! a result sink. A failing check never halts its successors; an error from
//! a check's own logic aborts the whole run.

use crate::checks::{checks_for_mode, CheckContext, CheckKind, RunMode};
use crate::core::error::Result;
use crate::core::result::{CheckResult, Severity};
use crate::core::sink::{CheckStatus, ResultSink};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Timing and status of one executed check.
#[derive(Debug, Clone)]
pub struct CheckTiming {
    /// Name of the check.
    pub name: &'static str,
    /// Pass/fail status (fail iff any result was fatal).
    pub status: CheckStatus,
    /// Wall-clock duration of the check.
    pub duration: Duration,
}

/// Result of one full presubmit run.
#[derive(Debug)]
pub struct RunSummary {
    /// Mode the run used.
    pub mode: RunMode,
    /// All results, in registry order, per-check ordering preserved.
    pub results: Vec<CheckResult>,
    /// Per-check timing and status, in registry order.
    pub timings: Vec<CheckTiming>,
    /// Total duration.
    pub duration: Duration,
}

impl RunSummary {
    /// Returns true if no result is fatal.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.results.iter().any(CheckResult::is_fatal)
    }

    /// Returns the number of checks whose output contained a fatal result.
    #[must_use]
    pub fn failed_check_count(&self) -> usize {
        self.timings
            .iter()
            .filter(|t| t.status == CheckStatus::Fail)
            .count()
    }

    /// Returns the number of warning results.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count()
    }

    /// Returns the fatal results.
    #[must_use]
    pub fn fatal_results(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| r.is_fatal()).collect()
    }
}

/// Orchestrator for one presubmit run.
#[derive(Debug)]
pub struct Runner {
    sink: Option<ResultSink>,
}

impl Runner {
    /// Creates a runner with an optional result sink.
    ///
    /// The sink lives for the runner's lifetime and is released on drop,
    /// whether or not the run completed.
    #[must_use]
    pub fn new(sink: Option<ResultSink>) -> Self {
        Self { sink }
    }

    /// Runs the full registry for the context's mode.
    pub async fn run(&mut self, ctx: &CheckContext) -> Result<RunSummary> {
        let checks = checks_for_mode(ctx.mode);
        self.run_checks(&checks, ctx).await
    }

    /// Runs an explicit check list in order.
    pub async fn run_checks(
        &mut self,
        checks: &[CheckKind],
        ctx: &CheckContext,
    ) -> Result<RunSummary> {
        let start = std::time::Instant::now();

        let mut results = Vec::new();
        let mut timings = Vec::with_capacity(checks.len());

        for check in checks {
            let name = check.name();

            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .ok()
                    .unwrap_or_else(ProgressStyle::default_spinner),
            );
            pb.set_message(format!("Running {name}..."));
            pb.enable_steady_tick(Duration::from_millis(100));

            let check_start = std::time::Instant::now();
            let check_results = check.run(ctx).await;
            let elapsed = check_start.elapsed();

            pb.finish_and_clear();

            // An error in the check's own logic aborts the run; the sink is
            // still released through drop.
            let check_results = check_results?;

            let status = if check_results.iter().any(CheckResult::is_fatal) {
                CheckStatus::Fail
            } else {
                CheckStatus::Pass
            };

            match status {
                CheckStatus::Pass => eprintln!("{} {name}", style("✓").green()),
                CheckStatus::Fail => eprintln!("{} {name}", style("✗").red()),
            }

            self.report(name, status, elapsed, &check_results);

            timings.push(CheckTiming {
                name,
                status,
                duration: elapsed,
            });
            results.extend(check_results);
        }

        Ok(RunSummary {
            mode: ctx.mode,
            results,
            timings,
            duration: start.elapsed(),
        })
    }

    /// Emits one record for a finished check, if a sink is configured.
    /// Reporting problems are logged, never escalated.
    fn report(
        &mut self,
        name: &str,
        status: CheckStatus,
        elapsed: Duration,
        results: &[CheckResult],
    ) {
        let Some(sink) = &mut self.sink else {
            return;
        };

        let failure_reason = failure_reason(results);
        if let Err(e) = sink.report(name, status, elapsed, failure_reason.as_deref()) {
            tracing::warn!(check = name, error = %e, "failed to report check result");
        }
    }
}

/// Joins the fatal results of one check into a single failure reason.
fn failure_reason(results: &[CheckResult]) -> Option<String> {
    let reasons: Vec<String> = results
        .iter()
        .filter(|r| r.is_fatal())
        .map(|r| match &r.long_text {
            Some(long_text) => {
                let items: Vec<String> =
                    long_text.lines().map(|line| format!("  {line}")).collect();
                format!("{}\n{}", r.message, items.join("\n"))
            }
            None => r.message.clone(),
        })
        .collect();

    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckContext, Layout, Tools};
    use crate::core::change::{AffectedFile, ChangeAction, Changeset};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(root: &Path, files: Vec<AffectedFile>, description: &str, mode: RunMode) -> CheckContext {
        CheckContext {
            changeset: Changeset::new(root, files, description.to_string()),
            layout: Layout::new(root),
            tools: Tools::default(),
            mode,
            repo: None,
        }
    }

    fn modified(root: &Path, rel: &str) -> AffectedFile {
        AffectedFile {
            path: root.join(rel),
            action: ChangeAction::Modified,
        }
    }

    fn complete_node_modules(root: &Path) {
        let node_modules = root.join("node_modules");
        std::fs::create_dir_all(&node_modules).expect("create node_modules");
        for name in [".clang-format", "OWNERS", "README.chromium"] {
            std::fs::write(node_modules.join(name), "x").expect("write file");
        }
    }

    // =========================================================================
    // failure_reason
    // =========================================================================

    #[test]
    fn test_failure_reason_none_without_fatal_results() {
        let results = vec![CheckResult::notify("ok"), CheckResult::warning("meh")];
        assert_eq!(failure_reason(&results), None);
    }

    #[test]
    fn test_failure_reason_joins_fatal_messages() {
        let results = vec![
            CheckResult::error("first"),
            CheckResult::notify("ignored"),
            CheckResult::error("second"),
        ];
        assert_eq!(failure_reason(&results).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_failure_reason_indents_long_text() {
        let results = vec![CheckResult::error("too large").with_long_text("a.bin\nb.bin")];
        assert_eq!(
            failure_reason(&results).as_deref(),
            Some("too large\n  a.bin\n  b.bin")
        );
    }

    // =========================================================================
    // Aggregation and ordering
    // =========================================================================

    #[tokio::test]
    async fn test_aggregate_length_is_sum_of_check_outputs() {
        let temp = TempDir::new().expect("create temp dir");
        // node_modules left incomplete: 3 errors. Bug association without a
        // footer in upload mode: 2 notifies.
        let ctx = context(temp.path(), Vec::new(), "Subject", RunMode::Upload);

        let mut runner = Runner::new(None);
        let summary = runner
            .run_checks(
                &[CheckKind::NodeModulesState, CheckKind::BugAssociation],
                &ctx,
            )
            .await
            .expect("run checks");

        assert_eq!(summary.results.len(), 5);
        assert_eq!(summary.timings.len(), 2);
        assert_eq!(summary.timings[0].name, "node_modules_state");
        assert_eq!(summary.timings[0].status, CheckStatus::Fail);
        assert_eq!(summary.timings[1].name, "bug_association");
        assert_eq!(summary.timings[1].status, CheckStatus::Pass);

        // Registry order: the three node_modules errors precede the bug
        // association output.
        assert!(summary.results[0].message.contains("node_modules"));
        assert_eq!(summary.results[3].message, "Bug association check:");
    }

    #[tokio::test]
    async fn test_failing_check_does_not_halt_successors() {
        let temp = TempDir::new().expect("create temp dir");
        let ctx = context(temp.path(), Vec::new(), "Subject\n\nBug: 1", RunMode::Upload);

        let mut runner = Runner::new(None);
        let summary = runner
            .run_checks(
                &[CheckKind::NodeModulesState, CheckKind::BugAssociation],
                &ctx,
            )
            .await
            .expect("run checks");

        assert!(!summary.success());
        assert_eq!(summary.failed_check_count(), 1);
        // The bug association check still ran after the failure.
        assert_eq!(summary.timings[1].status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn test_check_error_aborts_run() {
        let temp = TempDir::new().expect("create temp dir");
        // An added file that does not exist on disk makes the size check's
        // own logic error out, which must abort the remaining checks.
        let ctx = context(
            temp.path(),
            vec![AffectedFile {
                path: temp.path().join("vanished.bin"),
                action: ChangeAction::Added,
            }],
            "Subject",
            RunMode::Upload,
        );

        let mut runner = Runner::new(None);
        let result = runner
            .run_checks(&[CheckKind::SideEffects, CheckKind::BugAssociation], &ctx)
            .await;

        assert!(result.is_err());
    }

    // =========================================================================
    // Sink reporting
    // =========================================================================

    #[tokio::test]
    async fn test_sink_receives_one_record_per_check() {
        let temp = TempDir::new().expect("create temp dir");
        let sink_path = temp.path().join("results.jsonl");
        let ctx = context(temp.path(), Vec::new(), "Subject", RunMode::Upload);

        let sink = ResultSink::open(&sink_path).expect("open sink");
        let mut runner = Runner::new(Some(sink));
        runner
            .run_checks(
                &[CheckKind::NodeModulesState, CheckKind::BugAssociation],
                &ctx,
            )
            .await
            .expect("run checks");
        drop(runner); // release the sink

        let content = std::fs::read_to_string(&sink_path).expect("read sink");
        let records: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).expect("parse record"))
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["check"], "node_modules_state");
        assert_eq!(records[0]["status"], "FAIL");
        assert!(records[0]["failure_reason"]
            .as_str()
            .expect("reason")
            .contains("node_modules/.clang-format is missing"));
        assert_eq!(records[1]["check"], "bug_association");
        assert_eq!(records[1]["status"], "PASS");
        assert!(records[1].get("failure_reason").is_none());
    }

    // =========================================================================
    // End-to-end: documentation-only change
    // =========================================================================

    #[tokio::test]
    async fn test_readme_only_change_passes_directory_scoped_checks() {
        let temp = TempDir::new().expect("create temp dir");
        complete_node_modules(temp.path());
        std::fs::write(temp.path().join("README.md"), "docs").expect("write readme");

        let ctx = context(
            temp.path(),
            vec![modified(temp.path(), "README.md")],
            "Update docs\n\nBug: none",
            RunMode::Upload,
        );

        // Every check that does not require git or node tooling.
        let checks = [
            CheckKind::ExperimentTelemetry,
            CheckKind::GeneratedFiles,
            CheckKind::Lint,
            CheckKind::EslintRulesTests,
            CheckKind::StylelintRulesTests,
            CheckKind::BuildScriptTests,
            CheckKind::LicenseHeaders,
            CheckKind::ObsoleteGoldens,
            CheckKind::NodeModulesState,
            CheckKind::L10nStrings,
            CheckKind::SideEffects,
            CheckKind::BugAssociation,
        ];

        let mut runner = Runner::new(None);
        let summary = runner
            .run_checks(&checks, &ctx)
            .await
            .expect("run checks");

        assert!(summary.success(), "fatal: {:?}", summary.fatal_results());
        assert_eq!(summary.failed_check_count(), 0);

        // The directory-scoped checks each short-circuited to a notify.
        let messages: Vec<&str> = summary
            .results
            .iter()
            .map(|r| r.message.as_str())
            .collect();
        assert!(messages.contains(&"No affected files for telemetry check"));
        assert!(messages.contains(&"No affected files for generated files check"));
        assert!(messages.contains(&"No affected files for lint check"));
        assert!(messages.contains(&"No affected files to run check-strings"));

        // Side effects: only the no-working-copy warning, no errors.
        assert_eq!(summary.warning_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_mode_includes_description_requirement() {
        let temp = TempDir::new().expect("create temp dir");
        let ctx = context(temp.path(), Vec::new(), "", RunMode::Commit);

        let mut runner = Runner::new(None);
        let summary = runner
            .run_checks(
                &[CheckKind::HasDescription, CheckKind::BugAssociation],
                &ctx,
            )
            .await
            .expect("run checks");

        assert!(!summary.success());
        // Missing description and missing bug are both fatal when landing.
        assert_eq!(summary.failed_check_count(), 2);
    }

    #[test]
    fn test_summary_counters() {
        let summary = RunSummary {
            mode: RunMode::Upload,
            results: vec![
                CheckResult::notify("a"),
                CheckResult::warning("b"),
                CheckResult::error("c"),
            ],
            timings: vec![CheckTiming {
                name: "x",
                status: CheckStatus::Fail,
                duration: Duration::ZERO,
            }],
            duration: Duration::from_secs(1),
        };

        assert!(!summary.success());
        assert_eq!(summary.failed_check_count(), 1);
        assert_eq!(summary.warning_count(), 1);
        assert_eq!(summary.fatal_results().len(), 1);
    }
}
