//! Working-tree checks: formatting, leftover diffs, file sizes, and the
//! node_modules install state.
//!
//! The side-effect checks run after the other checks because those may have
//! rewritten files in place (auto-formatting, codegen); the tree must still
//! be clean afterwards.

use crate::checks::{run_timed_script, CheckContext};
use crate::core::change::ChangeAction;
use crate::core::error::{Error, Result};
use crate::core::result::CheckResult;

/// Anything over this is exceptional for a source repository; large blobs
/// belong in cloud storage, not in git history.
pub(crate) const TOO_LARGE_FILE_SIZE_LIMIT: u64 = 20 * 1024 * 1024; // 20 MiB

/// Files that `npm run install-deps` places inside node_modules.
const NODE_MODULES_STATE_FILES: [&str; 3] = [".clang-format", "OWNERS", "README.chromium"];

/// Runs the code formatter over the change.
pub(crate) async fn format(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    if ctx.repo.is_none() {
        return Ok(vec![CheckResult::warning(
            "No git working copy detected, skipping format check.",
        )]);
    }

    let mut results = vec![CheckResult::notify("Running format checks:")];
    results.extend(run_timed_script(ctx, "git", &["cl", "format", "--js"]).await?);
    Ok(results)
}

/// Side effects of the earlier checks: the tree must be clean and no
/// oversized file may have appeared.
pub(crate) fn side_effects(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = unchecked_files(ctx)?;
    results.extend(too_large_files(ctx)?);
    Ok(results)
}

/// Fails when the working tree still carries uncommitted modifications.
pub(crate) fn unchecked_files(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let Some(repo) = &ctx.repo else {
        return Ok(vec![CheckResult::warning(
            "No git working copy detected, skipping unchecked files check.",
        )]);
    };

    match repo.working_diff()? {
        Some(diff) => Ok(vec![
            CheckResult::error("You have changed files that need to be committed:"),
            CheckResult::error(diff),
        ]),
        None => Ok(Vec::new()),
    }
}

/// Fails when an added or modified file exceeds the size ceiling.
/// Deleted files are skipped.
pub(crate) fn too_large_files(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut too_large = Vec::new();

    for file in &ctx.changeset.files {
        if file.action == ChangeAction::Deleted {
            continue;
        }

        let metadata = std::fs::metadata(&file.path)
            .map_err(|e| Error::io(format!("stat {}", file.path.display()), e))?;
        if metadata.len() > TOO_LARGE_FILE_SIZE_LIMIT {
            too_large.push(format!("{}: {} bytes", file.path.display(), metadata.len()));
        }
    }

    if too_large.is_empty() {
        return Ok(Vec::new());
    }

    let long_text = format!(
        "Do not commit large files to git since git scales badly for those.\n\
         Instead put the large files in cloud storage and use DEPS to\n\
         fetch them.\n{}",
        too_large.join("\n")
    );
    Ok(vec![
        CheckResult::error("Too large files found in commit").with_long_text(long_text)
    ])
}

/// Verifies the node_modules checkout was produced by the install script.
pub(crate) fn node_modules_state(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let node_modules = ctx.layout.node_modules();
    let mut results = Vec::new();

    for name in NODE_MODULES_STATE_FILES {
        if !node_modules.join(name).is_file() {
            results.push(CheckResult::error(format!(
                "node_modules/{name} is missing. Use npm run install-deps to re-create it."
            )));
        }
    }

    Ok(results)
}
