//! Lint and license-header checks with full-vs-partial dispatch.
//!
//! Both checks lint only the affected files to keep presubmit time down,
//! but fall back to a full check over the default directories when the
//! lint configuration itself changed: a config change can alter the lint
//! verdict of files that did not change.

use crate::checks::{run_node_script, CheckContext};
use crate::core::change::{ChangeAction, Changeset};
use crate::core::error::Result;
use crate::core::result::CheckResult;
use std::path::PathBuf;

/// Above this many explicit files, fall back to a full check so the
/// argument list stays within command-line length limits on some platforms.
pub(crate) const MAX_EXPLICIT_LINT_FILES: usize = 50;

/// Paths containing these fragments are never linted directly.
const UNLINTED_FRAGMENTS: [&str; 2] = ["front_end/third_party", "front_end/generated"];

/// Outcome of the file-selection step shared by the lint-style checks.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LintPlan {
    /// Nothing to do: no relevant files and no config change.
    pub bail: bool,
    /// Explicit files to check; empty means "full check".
    pub files: Vec<PathBuf>,
}

/// Selects the files a lint-style check should run on.
///
/// A non-empty `config_files` list means the check's configuration changed
/// and the whole tree must be checked. Deleted files are never linted, and
/// vendored/generated front_end files are excluded.
pub(crate) fn plan_files_to_lint(
    changeset: &Changeset,
    config_files: &[PathBuf],
    default_directories: &[PathBuf],
    suffixes: &[&str],
    results: &mut Vec<CheckResult>,
) -> LintPlan {
    let mut run_full_check = false;
    let mut files = Vec::new();

    if config_files.is_empty() {
        files = changeset.affected_files(default_directories, &[ChangeAction::Deleted], suffixes);
        files.retain(|file| {
            let text = file.to_string_lossy();
            !UNLINTED_FRAGMENTS
                .iter()
                .any(|fragment| text.contains(fragment))
        });

        if files.is_empty() {
            results.push(CheckResult::notify("No affected files for lint check"));
        }
    } else {
        results.push(CheckResult::notify("Running full lint check"));
        run_full_check = true;
    }

    let bail = files.is_empty() && !run_full_check;

    if files.len() > MAX_EXPLICIT_LINT_FILES {
        files.clear();
    }

    LintPlan { bail, files }
}

/// Runs eslint/stylelint over the affected files (or everything when the
/// lint configuration changed).
pub(crate) async fn lint(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = vec![CheckResult::notify("Lint check:")];

    let root = ctx.layout.root();
    let scripts = ctx.layout.scripts();
    let node_modules = ctx.layout.node_modules();
    let lint_script = scripts.join("test/run_lint_check.mjs");

    let related_directories = [
        node_modules.join("eslint"),
        node_modules.join("stylelint"),
        node_modules.join("@typescript-eslint"),
        scripts.join("eslint_rules"),
    ];
    let related_files = [
        root.join("eslint.config.mjs"),
        root.join(".stylelintrc.json"),
        root.join(".stylelintignore"),
        // Carries the LitAnalyzer rules.
        root.join("tsconfig.json"),
        lint_script.clone(),
    ];

    let mut config_files =
        ctx.changeset
            .affected_files(&related_directories, &[], &[".js", ".mjs", ".ts"]);
    config_files.extend(ctx.changeset.affected_files(&related_files, &[], &[]));

    let default_directories = [
        ctx.layout.front_end(),
        ctx.layout.test_dir(),
        scripts.clone(),
        ctx.layout.inspector_overlay(),
    ];

    let plan = plan_files_to_lint(
        &ctx.changeset,
        &config_files,
        &default_directories,
        &[".css", ".mjs", ".js", ".ts"],
        &mut results,
    );
    if plan.bail {
        return Ok(results);
    }

    let args: Vec<String> = plan
        .files
        .iter()
        .map(|file| file.to_string_lossy().into_owned())
        .collect();
    results.extend(run_node_script(ctx, &lint_script, &args, true).await?);
    Ok(results)
}

/// Checks license headers in non-JS files (GN build files and stylesheets).
pub(crate) async fn license_headers(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = vec![CheckResult::notify("License header check for non-JS files:")];

    let header_script = ctx
        .layout
        .scripts()
        .join("test/run_header_check_non_js_files.js");

    let config_files = ctx
        .changeset
        .affected_files(&[header_script.clone()], &[], &[".js"]);

    let default_directories = [
        ctx.layout.front_end(),
        ctx.layout.test_dir(),
        ctx.layout.scripts(),
        ctx.layout.inspector_overlay(),
        ctx.layout.config_dir(),
    ];

    let plan = plan_files_to_lint(
        &ctx.changeset,
        &config_files,
        &default_directories,
        &["BUILD.gn", ".gni", ".css"],
        &mut results,
    );
    if plan.bail {
        return Ok(results);
    }

    let args: Vec<String> = plan
        .files
        .iter()
        .map(|file| file.to_string_lossy().into_owned())
        .collect();
    results.extend(run_node_script(ctx, &header_script, &args, false).await?);
    Ok(results)
}
