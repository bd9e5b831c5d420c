//! Command-line interface for devtools-presubmit.
//!
//! This module provides the `presubmit` CLI with subcommands for:
//! - `upload`: Run the pre-upload checks
//! - `commit`: Run the pre-commit checks
//! - `list`: List registered checks
//! - `completions`: Generate shell completions

mod commands;

use crate::core::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Presubmit check orchestrator for DevTools-style frontend repositories.
#[derive(Debug, Parser)]
#[command(
    name = "presubmit",
    author,
    version,
    about = "Presubmit check orchestrator for DevTools-style frontend repositories",
    long_about = r#"
presubmit runs a fixed sequence of checks (lint, format, license headers,
generated-file freshness, string externalization, file sizes, node_modules
state, bug association) against a changeset and reports structured results.

The changeset is derived from git (merge base with the upstream main branch)
or supplied by the review host as a JSON file via --changeset.

Quick start:
  presubmit upload    # before sending the change for review
  presubmit commit    # before landing the change

Environment variables:
  PRESUBMIT_SINK=<path>   Append one JSON record per check to <path>
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Options shared by the two check-running flows.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Repository root (default: the enclosing git checkout).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Host-supplied changeset JSON instead of deriving one from git.
    #[arg(long)]
    pub changeset: Option<PathBuf>,

    /// Base ref for the git-derived changeset (default: origin/main).
    #[arg(long)]
    pub base: Option<String>,

    /// Append per-check result records to this file.
    #[arg(long)]
    pub sink: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the checks for a change about to be sent for review.
    #[command(visible_alias = "u")]
    Upload(RunArgs),

    /// Run the checks for a change about to land.
    #[command(visible_alias = "c")]
    Commit(RunArgs),

    /// List the registered checks.
    #[command(visible_alias = "l")]
    List {
        /// Show checks for a specific mode.
        #[arg(short, long, value_parser = ["upload", "commit"])]
        mode: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    setup_logging(cli.verbose, cli.quiet);

    // Set up color
    setup_color(cli.color);

    match cli.command {
        Commands::Upload(args) => {
            commands::run_checks(crate::checks::RunMode::Upload, &args).await
        }
        Commands::Commit(args) => {
            commands::run_checks(crate::checks::RunMode::Commit, &args).await
        }
        Commands::List { mode } => commands::list(mode.as_deref()),
        Commands::Completions { shell } => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}
