//! CLI command implementations.

use crate::checks::{checks_for_mode, CheckContext, Layout, RunMode, Tools};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::core::change::Changeset;
use crate::core::error::{Error, Result};
use crate::core::git::GitRepo;
use crate::core::result::Severity;
use crate::core::runner::{RunSummary, Runner};
use crate::core::sink::ResultSink;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs the checks for one entry flow.
pub async fn run_checks(mode: RunMode, args: &RunArgs) -> Result<ExitCode> {
    let config = Config::load_or_default()?;

    let repo = match &args.root {
        Some(root) => GitRepo::discover_from(root).ok(),
        None => GitRepo::discover().ok(),
    };

    let root: PathBuf = if let Some(root) = &args.root {
        root.clone()
    } else if let Some(repo) = &repo {
        repo.root().to_path_buf()
    } else {
        std::env::current_dir().map_err(|e| Error::io("get current dir", e))?
    };

    let changeset = match &args.changeset {
        Some(path) => Changeset::from_json_file(path, &root)?,
        None => {
            let repo = repo.as_ref().ok_or(Error::NotGitRepo)?;
            Changeset::from_git(repo, args.base.as_deref())?
        }
    };

    eprintln!(
        "{} Mode: {} ({} affected files)",
        style("•").cyan(),
        style(mode.name()).bold(),
        changeset.files.len()
    );

    let ctx = CheckContext {
        changeset,
        layout: Layout::new(root),
        tools: Tools::from_config(&config),
        mode,
        repo,
    };

    let sink = ResultSink::from_options(args.sink.as_deref(), &config);
    if let Some(sink) = &sink {
        tracing::debug!(path = %sink.path().display(), "reporting check results");
    }

    let mut runner = Runner::new(sink);
    let summary = runner.run(&ctx).await?;

    print_summary(&summary);

    if summary.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Prints the aggregated results and a one-line verdict.
fn print_summary(summary: &RunSummary) {
    eprintln!();
    for result in &summary.results {
        match result.severity {
            Severity::Notify => {
                if let Some(first) = result.message.lines().next() {
                    eprintln!("  {} {}", style("•").cyan(), first);
                }
            }
            Severity::Warning => {
                eprintln!("  {} {}", style("!").yellow(), result.message);
            }
            Severity::Error => {
                let mut lines = result.message.lines();
                eprintln!(
                    "  {} {}",
                    style("✗").red(),
                    lines.next().unwrap_or_default()
                );
                for line in lines.take(20) {
                    eprintln!("    {line}");
                }
                if let Some(long_text) = &result.long_text {
                    for line in long_text.lines().take(20) {
                        eprintln!("    {line}");
                    }
                }
            }
        }
    }

    eprintln!();
    if summary.success() {
        eprintln!(
            "{} All checks passed ({} results, {} warnings) in {:?}",
            style("✓").green().bold(),
            summary.results.len(),
            summary.warning_count(),
            summary.duration
        );
    } else {
        eprintln!(
            "{} {} check(s) failed",
            style("✗").red().bold(),
            summary.failed_check_count()
        );
    }
}

/// Lists the registered checks per mode.
pub fn list(mode: Option<&str>) -> Result<ExitCode> {
    let mode: Option<RunMode> =
        mode.map(|m| m.parse())
            .transpose()
            .map_err(|e: String| Error::ConfigInvalid {
                field: "mode".to_string(),
                message: e,
            })?;

    if mode.is_none() || mode == Some(RunMode::Upload) {
        eprintln!("{}", style("Upload checks:").bold());
        for check in checks_for_mode(RunMode::Upload) {
            eprintln!("  {} - {}", style(check.name()).cyan(), check.description());
        }
        eprintln!();
    }

    if mode.is_none() || mode == Some(RunMode::Commit) {
        eprintln!("{}", style("Commit checks:").bold());
        for check in checks_for_mode(RunMode::Commit) {
            eprintln!("  {} - {}", style(check.name()).cyan(), check.description());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "presubmit",
        &mut std::io::stdout(),
    );
}
