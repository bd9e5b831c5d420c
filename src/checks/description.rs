//! Change-description checks.
//!
//! These never touch the filesystem; they only inspect the changeset's
//! description text.

use crate::checks::CheckContext;
use crate::core::result::CheckResult;

const BUG_GUIDANCE: &str = "Each CL should be associated with a bug: use 'Bug:' or 'Fixed:' lines in\n\
the footer of the commit description. If you explicitly don't want to\n\
set a bug, use 'Bug: none' in the footer of the commit description.\n\
\n\
Note: the footer of the commit description is the last block of lines in\n\
the commit description that doesn't contain empty lines. 'Bug:' or\n\
'Fixed:' lines that are eventually followed by an empty line are not\n\
detected by this check.";

/// Requires the change to reference a bug in its description footer.
///
/// The same missing footer is a hard error when landing but only a notice
/// when uploading for review.
pub(crate) fn bug_association(ctx: &CheckContext) -> Vec<CheckResult> {
    let mut results = vec![CheckResult::notify("Bug association check:")];

    let bugs = ctx.changeset.bugs();
    if bugs.is_empty() {
        if ctx.mode.is_committing() {
            results.push(CheckResult::error(BUG_GUIDANCE));
        } else {
            results.push(CheckResult::notify(BUG_GUIDANCE));
        }
        return results;
    }

    for bug in bugs {
        results.push(CheckResult::notify(bug));
    }

    results
}

/// Requires a non-empty change description before landing.
pub(crate) fn has_description(ctx: &CheckContext) -> Vec<CheckResult> {
    if ctx.changeset.description.trim().is_empty() {
        vec![CheckResult::error("Change has no description.")]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testutil::context;
    use crate::checks::RunMode;
    use crate::core::result::Severity;
    use std::path::Path;

    fn ctx(description: &str, mode: RunMode) -> crate::checks::CheckContext {
        context(Path::new("/repo"), Vec::new(), description, mode)
    }

    // =========================================================================
    // bug_association
    // =========================================================================

    #[test]
    fn test_missing_bug_is_error_when_committing() {
        let results = bug_association(&ctx("Subject line", RunMode::Commit));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].severity, Severity::Notify);
        let errors: Vec<_> = results.iter().filter(|r| r.is_fatal()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'Bug:' or 'Fixed:'"));
    }

    #[test]
    fn test_missing_bug_is_notify_when_uploading() {
        let results = bug_association(&ctx("Subject line", RunMode::Upload));

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_fatal()));
        assert!(results
            .iter()
            .all(|r| r.severity == Severity::Notify));
    }

    #[test]
    fn test_one_notify_per_bug_and_no_error() {
        let results = bug_association(&ctx(
            "Subject\n\nBug: 1234\nFixed: 5678",
            RunMode::Commit,
        ));

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.is_fatal()));
        assert_eq!(results[1].message, "1234");
        assert_eq!(results[2].message, "5678");
    }

    #[test]
    fn test_bug_none_satisfies_commit_mode() {
        let results = bug_association(&ctx("Subject\n\nBug: none", RunMode::Commit));

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_fatal()));
        assert_eq!(results[1].message, "none");
    }

    #[test]
    fn test_header_result_comes_first() {
        let results = bug_association(&ctx("Subject\n\nBug: 1", RunMode::Upload));
        assert_eq!(results[0].message, "Bug association check:");
    }

    // =========================================================================
    // has_description
    // =========================================================================

    #[test]
    fn test_empty_description_is_error() {
        let results = has_description(&ctx("", RunMode::Commit));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_fatal());
    }

    #[test]
    fn test_whitespace_description_is_error() {
        let results = has_description(&ctx("  \n\t\n", RunMode::Commit));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_present_description_is_silent() {
        let results = has_description(&ctx("Fix the thing", RunMode::Commit));
        assert!(results.is_empty());
    }
}
