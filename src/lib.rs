//! # devtools-presubmit
//!
//! Presubmit check orchestrator for DevTools-style frontend repositories.
//!
//! A presubmit run executes a fixed, ordered sequence of checks against a
//! changeset: lint, format, license headers, generated-file freshness,
//! string externalization, file-size limits, node_modules state, and the
//! bug-association footer. Checks inspect the affected-file list and shell
//! out to the repository's own node/python tooling; results come back as a
//! structured, ordered sequence the host decides how to display.
//!
//! ## Example
//!
//! ```rust,no_run
//! use devtools_presubmit::{
//!     Changeset, CheckContext, Layout, RunMode, Runner, Tools,
//! };
//! use devtools_presubmit::config::Config;
//! use devtools_presubmit::core::git::GitRepo;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> devtools_presubmit::Result<()> {
//!     let config = Config::load_or_default()?;
//!     let repo = GitRepo::discover()?;
//!     let changeset = Changeset::from_git(&repo, None)?;
//!     let root = repo.root().to_path_buf();
//!
//!     let ctx = CheckContext {
//!         changeset,
//!         layout: Layout::new(root),
//!         tools: Tools::from_config(&config),
//!         mode: RunMode::Upload,
//!         repo: Some(repo),
//!     };
//!
//!     let mut runner = Runner::new(None);
//!     let summary = runner.run(&ctx).await?;
//!
//!     if summary.success() {
//!         Ok(())
//!     } else {
//!         std::process::exit(1)
//!     }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/devtools-presubmit/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use checks::{checks_for_mode, CheckContext, CheckKind, Layout, RunMode, Tools};
pub use config::Config;
pub use core::change::{AffectedFile, ChangeAction, Changeset};
pub use core::error::{Error, Result};
pub use core::result::{CheckResult, Severity};
pub use core::runner::{RunSummary, Runner};
pub use core::sink::ResultSink;
