//! Checks that dispatch to external node and python scripts.
//!
//! Each check first asks the changeset whether anything it cares about was
//! touched, and returns a single informational result when nothing was.
//! This keeps unrelated changes from paying for expensive external tooling.

use crate::checks::{run_node_script, run_python_script, CheckContext};
use crate::core::error::Result;
use crate::core::result::CheckResult;
use std::path::PathBuf;

/// Verifies experiment telemetry registration when the experiment
/// entrypoints change.
pub(crate) async fn experiment_telemetry(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let front_end = ctx.layout.front_end();
    let watched = [
        front_end.join("entrypoints/main/MainImpl.ts"),
        front_end.join("core/host/UserMetrics.ts"),
    ];

    let affected = ctx.changeset.affected_files(&watched, &[], &[".ts"]);
    if affected.is_empty() {
        return Ok(vec![CheckResult::notify(
            "No affected files for telemetry check",
        )]);
    }

    let mut results = vec![CheckResult::notify("Running experiment telemetry check:")];
    let script = ctx.layout.scripts().join("check_experiments.js");
    results.extend(run_node_script(ctx, &script, &[], false).await?);
    Ok(results)
}

/// Verifies that the pinned esbuild versions agree. Always runs.
pub(crate) async fn esbuild_version(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = vec![CheckResult::notify("Running esbuild version check:")];
    let script = ctx.layout.scripts().join("check_esbuild_versions.js");
    results.extend(run_node_script(ctx, &script, &[], false).await?);
    Ok(results)
}

/// Regenerates protocol resources when their inputs change and fails if
/// the checked-in generated files are stale.
pub(crate) async fn generated_files(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let root = ctx.layout.root();
    let scripts_build = ctx.layout.scripts().join("build");

    let watched = [
        root.join("v8"),
        root.join("third_party/blink"),
        root.join("third_party/pyjson5"),
        scripts_build.join("generate_aria.py"),
        scripts_build.join("generate_supported_css.py"),
        scripts_build.join("generate_deprecations.py"),
        root.join("third_party/inspector_protocol/concatenate_protocols.py"),
        scripts_build.join("code_generator_frontend.py"),
        ctx.layout.front_end().join("generated"),
        ctx.layout.scripts().join("protocol_typescript"),
    ];

    let affected =
        ctx.changeset
            .affected_files(&watched, &[], &[".pdl", ".json5", ".py", ".js", ".ts"]);
    if affected.is_empty() {
        return Ok(vec![CheckResult::notify(
            "No affected files for generated files check",
        )]);
    }

    let mut results = vec![CheckResult::notify("Running generated files check:")];
    let script = ctx.layout.scripts().join("deps/generate_protocol_resources.py");
    results.extend(run_python_script(ctx, &script, &[]).await?);
    Ok(results)
}

/// Checks that UI strings in front_end are externalized for localization.
pub(crate) async fn l10n_strings(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let front_end = ctx.layout.front_end();
    let script = ctx.layout.third_party().join("i18n/check-strings.js");

    let watched = [front_end.clone(), script.clone()];
    let affected = ctx.changeset.affected_files(&watched, &[], &[".js", ".ts"]);
    if affected.is_empty() {
        return Ok(vec![CheckResult::notify(
            "No affected files to run check-strings",
        )]);
    }

    let mut results = vec![CheckResult::notify("Checking UI strings from front_end:")];
    let args = vec![front_end.to_string_lossy().into_owned()];
    results.extend(run_node_script(ctx, &script, &args, false).await?);
    Ok(results)
}

/// Runs the eslint rule unit tests when the rules (or eslint itself) change.
///
/// Most changes don't touch the rules, so this produces no output at all
/// for them.
pub(crate) async fn eslint_rules_tests(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let rules_dir = ctx.layout.scripts().join("eslint_rules");
    let watched = [ctx.layout.node_modules().join("eslint"), rules_dir.clone()];

    mocha_tests(
        ctx,
        &watched,
        rules_dir.join("tests/*.test.js"),
        "ESLint rules unit tests",
    )
    .await
}

/// Runs the stylelint rule unit tests when the rules, stylelint itself, or
/// the token declarations the tests rely on change.
pub(crate) async fn stylelint_rules_tests(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let front_end = ctx.layout.front_end();
    let rules_dir = ctx.layout.scripts().join("stylelint_rules");
    let watched = [
        ctx.layout.node_modules().join("stylelint"),
        rules_dir.clone(),
        front_end.join("application_tokens.css"),
        front_end.join("design_system_tokens.css"),
        front_end.join("inspectorCommon.css"),
    ];

    mocha_tests(
        ctx,
        &watched,
        rules_dir.join("tests/*.test.js"),
        "Stylelint rules unit tests",
    )
    .await
}

/// Runs the build plugin unit tests when the build scripts change.
pub(crate) async fn build_script_tests(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let build_dir = ctx.layout.scripts().join("build");
    let watched = [build_dir.clone()];

    mocha_tests(
        ctx,
        &watched,
        build_dir.join("tests/*_test.js"),
        "Build plugins unit tests",
    )
    .await
}

/// Flags screenshot goldens that no longer belong to any interaction test.
pub(crate) async fn obsolete_goldens(ctx: &CheckContext) -> Result<Vec<CheckResult>> {
    let mut results = vec![CheckResult::notify("Obsolete screenshot images check")];

    let watched = [ctx.layout.test_dir().join("interactions")];
    let affected = ctx.changeset.affected_files(&watched, &[], &[]);
    if !affected.is_empty() {
        let script = ctx.layout.scripts().join("test/check_obsolete_goldens.js");
        results.extend(run_node_script(ctx, &script, &[], false).await?);
    }

    Ok(results)
}

/// Shared shape of the three rule/plugin test checks: gate on the watched
/// paths, then hand the test glob to mocha. The dot reporter keeps output
/// short when a single test fails.
async fn mocha_tests(
    ctx: &CheckContext,
    watched: &[PathBuf],
    tests_glob: PathBuf,
    header: &str,
) -> Result<Vec<CheckResult>> {
    let affected = ctx.changeset.affected_files(watched, &[], &[]);
    if affected.is_empty() {
        return Ok(Vec::new());
    }

    let mut results = vec![CheckResult::notify(header)];
    let args = vec![
        "--reporter".to_string(),
        "dot".to_string(),
        tests_glob.to_string_lossy().into_owned(),
    ];
    results.extend(run_node_script(ctx, &ctx.layout.mocha(), &args, false).await?);
    Ok(results)
}
