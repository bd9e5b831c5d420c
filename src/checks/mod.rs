//! The presubmit check registry.
//!
//! Checks are a closed set of descriptors ([`CheckKind`]) iterated in a
//! fixed order. Each check is an independent function of the read-only
//! [`CheckContext`]; there is no shared mutable state between checks.
//!
//! The two entry flows differ only in which checks they include and in the
//! bug-association severity:
//! - upload: common checks + l10n + side effects + bug association (soft)
//! - commit: the same, plus the description requirement, with a hard
//!   bug-association error

mod description;
mod lint;
mod scripts;
mod tree;

use crate::config::Config;
use crate::core::change::Changeset;
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::git::GitRepo;
use crate::core::result::CheckResult;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Which entry flow the checks run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Before sending the change for review.
    Upload,
    /// Before landing the change.
    Commit,
}

impl RunMode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Commit => "commit",
        }
    }

    /// Returns whether the change is about to land.
    #[must_use]
    pub const fn is_committing(&self) -> bool {
        matches!(self, Self::Commit)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upload" => Ok(Self::Upload),
            "commit" => Ok(Self::Commit),
            _ => Err(format!("Invalid mode: {s}. Expected: upload or commit")),
        }
    }
}

/// Well-known locations inside the checked-out repository.
///
/// Replaces ad-hoc path stitching in the individual checks; everything is
/// derived from the repository root the run was started with.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Creates a layout rooted at the repository checkout.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The front_end source tree.
    #[must_use]
    pub fn front_end(&self) -> PathBuf {
        self.root.join("front_end")
    }

    /// Maintenance and build scripts.
    #[must_use]
    pub fn scripts(&self) -> PathBuf {
        self.root.join("scripts")
    }

    /// The test suites.
    #[must_use]
    pub fn test_dir(&self) -> PathBuf {
        self.root.join("test")
    }

    /// The inspector overlay sources.
    #[must_use]
    pub fn inspector_overlay(&self) -> PathBuf {
        self.root.join("inspector_overlay")
    }

    /// Build configuration files.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Vendored third-party code.
    #[must_use]
    pub fn third_party(&self) -> PathBuf {
        self.root.join("third_party")
    }

    /// The node package checkout.
    #[must_use]
    pub fn node_modules(&self) -> PathBuf {
        self.root.join("node_modules")
    }

    /// The mocha entry point inside node_modules.
    #[must_use]
    pub fn mocha(&self) -> PathBuf {
        self.node_modules().join("mocha/bin/mocha.js")
    }
}

/// External interpreters the checks shell out to.
///
/// Paths come from `presubmit.toml` when configured, otherwise from PATH.
#[derive(Debug, Clone, Default)]
pub struct Tools {
    node: Option<PathBuf>,
    python: Option<PathBuf>,
}

impl Tools {
    /// Builds the tool set from configuration overrides.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            node: config.tools.node.clone(),
            python: config.tools.python.clone(),
        }
    }

    /// Resolves the node binary.
    pub fn node(&self) -> Result<PathBuf> {
        Self::resolve(self.node.as_deref(), "node")
    }

    /// Resolves the python3 binary.
    pub fn python3(&self) -> Result<PathBuf> {
        Self::resolve(self.python.as_deref(), "python3")
    }

    fn resolve(configured: Option<&Path>, command: &str) -> Result<PathBuf> {
        match configured {
            Some(path) => Ok(path.to_path_buf()),
            None => which::which(command).map_err(|_| Error::CommandNotFound {
                command: command.to_string(),
            }),
        }
    }
}

/// Read-only context shared by all checks in one run.
#[derive(Debug)]
pub struct CheckContext {
    /// The change under review.
    pub changeset: Changeset,
    /// Repository layout.
    pub layout: Layout,
    /// External interpreters.
    pub tools: Tools,
    /// Entry flow.
    pub mode: RunMode,
    /// Local working copy, when one exists. Checks that need the working
    /// tree short-circuit to a warning without it.
    pub repo: Option<GitRepo>,
}

/// One named check in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Experiment telemetry registration.
    ExperimentTelemetry,
    /// Generated protocol resources freshness.
    GeneratedFiles,
    /// eslint/stylelint over affected files.
    Lint,
    /// Unit tests for the custom eslint rules.
    EslintRulesTests,
    /// Unit tests for the custom stylelint rules.
    StylelintRulesTests,
    /// Unit tests for the build plugins.
    BuildScriptTests,
    /// License headers in non-JS files.
    LicenseHeaders,
    /// Code formatting.
    Format,
    /// esbuild version pinning.
    EsbuildVersion,
    /// Obsolete screenshot goldens.
    ObsoleteGoldens,
    /// node_modules install state.
    NodeModulesState,
    /// UI string externalization.
    L10nStrings,
    /// Clean tree and file sizes after the other checks ran.
    SideEffects,
    /// Non-empty change description (commit flow only).
    HasDescription,
    /// Bug reference in the description footer.
    BugAssociation,
}

/// Checks shared by both entry flows, in execution order.
const COMMON_CHECKS: &[CheckKind] = &[
    CheckKind::ExperimentTelemetry,
    CheckKind::GeneratedFiles,
    CheckKind::Lint,
    CheckKind::EslintRulesTests,
    CheckKind::StylelintRulesTests,
    CheckKind::BuildScriptTests,
    CheckKind::LicenseHeaders,
    CheckKind::Format,
    CheckKind::EsbuildVersion,
    CheckKind::ObsoleteGoldens,
    CheckKind::NodeModulesState,
];

/// Returns the ordered check list for an entry flow.
#[must_use]
pub fn checks_for_mode(mode: RunMode) -> Vec<CheckKind> {
    let mut checks = COMMON_CHECKS.to_vec();
    checks.push(CheckKind::L10nStrings);
    // Runs after the checks above because they may rewrite files in place.
    checks.push(CheckKind::SideEffects);
    if mode.is_committing() {
        checks.push(CheckKind::HasDescription);
    }
    checks.push(CheckKind::BugAssociation);
    checks
}

impl CheckKind {
    /// Stable name used for reporting.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ExperimentTelemetry => "experiment_telemetry",
            Self::GeneratedFiles => "generated_files",
            Self::Lint => "lint",
            Self::EslintRulesTests => "eslint_rules_tests",
            Self::StylelintRulesTests => "stylelint_rules_tests",
            Self::BuildScriptTests => "build_script_tests",
            Self::LicenseHeaders => "license_headers",
            Self::Format => "format",
            Self::EsbuildVersion => "esbuild_version",
            Self::ObsoleteGoldens => "obsolete_goldens",
            Self::NodeModulesState => "node_modules_state",
            Self::L10nStrings => "l10n_strings",
            Self::SideEffects => "side_effects",
            Self::HasDescription => "has_description",
            Self::BugAssociation => "bug_association",
        }
    }

    /// Short description for the check listing.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ExperimentTelemetry => "Verify experiment telemetry registration",
            Self::GeneratedFiles => "Verify generated protocol resources are fresh",
            Self::Lint => "Run eslint/stylelint over affected files",
            Self::EslintRulesTests => "Run the eslint rule unit tests",
            Self::StylelintRulesTests => "Run the stylelint rule unit tests",
            Self::BuildScriptTests => "Run the build plugin unit tests",
            Self::LicenseHeaders => "Check license headers in non-JS files",
            Self::Format => "Run the code formatter",
            Self::EsbuildVersion => "Check the pinned esbuild versions",
            Self::ObsoleteGoldens => "Flag obsolete screenshot goldens",
            Self::NodeModulesState => "Verify the node_modules install state",
            Self::L10nStrings => "Check UI string externalization",
            Self::SideEffects => "Verify a clean tree and file sizes after other checks",
            Self::HasDescription => "Require a change description",
            Self::BugAssociation => "Require a bug reference in the description footer",
        }
    }

    /// Runs the check against the context, producing its ordered results.
    pub async fn run(&self, ctx: &CheckContext) -> Result<Vec<CheckResult>> {
        match self {
            Self::ExperimentTelemetry => scripts::experiment_telemetry(ctx).await,
            Self::GeneratedFiles => scripts::generated_files(ctx).await,
            Self::Lint => lint::lint(ctx).await,
            Self::EslintRulesTests => scripts::eslint_rules_tests(ctx).await,
            Self::StylelintRulesTests => scripts::stylelint_rules_tests(ctx).await,
            Self::BuildScriptTests => scripts::build_script_tests(ctx).await,
            Self::LicenseHeaders => lint::license_headers(ctx).await,
            Self::Format => tree::format(ctx).await,
            Self::EsbuildVersion => scripts::esbuild_version(ctx).await,
            Self::ObsoleteGoldens => scripts::obsolete_goldens(ctx).await,
            Self::NodeModulesState => tree::node_modules_state(ctx),
            Self::L10nStrings => scripts::l10n_strings(ctx).await,
            Self::SideEffects => tree::side_effects(ctx),
            Self::HasDescription => Ok(description::has_description(ctx)),
            Self::BugAssociation => Ok(description::bug_association(ctx)),
        }
    }
}

/// Runs an external program and folds its outcome into a single result:
/// Notify on exit 0, fatal Error otherwise, the message carrying a timing
/// header followed by the combined transcript.
pub(crate) async fn run_timed_script<S: AsRef<OsStr>>(
    ctx: &CheckContext,
    program: impl AsRef<OsStr>,
    args: &[S],
) -> Result<Vec<CheckResult>> {
    let executor = Executor::new();
    let output = executor.run(program, args, ctx.layout.root()).await?;

    let text = format!(
        "Script execution time: {:.1}s\n{}",
        output.duration.as_secs_f64(),
        output.output
    );

    Ok(vec![if output.success() {
        CheckResult::notify(text)
    } else {
        CheckResult::error(text)
    }])
}

/// Runs a node script through the configured node binary.
pub(crate) async fn run_node_script(
    ctx: &CheckContext,
    script: &Path,
    args: &[String],
    allow_typescript: bool,
) -> Result<Vec<CheckResult>> {
    let node = ctx.tools.node()?;

    let mut argv: Vec<OsString> = Vec::with_capacity(args.len() + 3);
    if allow_typescript {
        argv.push(OsString::from("--experimental-strip-types"));
        argv.push(OsString::from("--no-warnings=ExperimentalWarning"));
    }
    argv.push(script.as_os_str().to_os_string());
    argv.extend(args.iter().map(OsString::from));

    run_timed_script(ctx, node, &argv).await
}

/// Runs a python script through the configured python3 binary.
pub(crate) async fn run_python_script(
    ctx: &CheckContext,
    script: &Path,
    args: &[String],
) -> Result<Vec<CheckResult>> {
    let python = ctx.tools.python3()?;

    let mut argv: Vec<OsString> = Vec::with_capacity(args.len() + 1);
    argv.push(script.as_os_str().to_os_string());
    argv.extend(args.iter().map(OsString::from));

    run_timed_script(ctx, python, &argv).await
}
