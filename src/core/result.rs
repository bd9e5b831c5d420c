//! Structured check results.
//!
//! Every check produces an ordered sequence of [`CheckResult`]s. The
//! orchestrator aggregates them without reordering or merging; the host
//! decides what to display and whether fatal results block submission.

/// Severity of a single check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational output, never blocking.
    Notify,
    /// A soft concern the user should see but that does not block.
    Warning,
    /// A blocking problem.
    Error,
}

impl Severity {
    /// Returns a human-readable name for the severity.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Notify => "notify",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One result produced by a check.
///
/// Results are immutable after creation. `fatal` is what the orchestrator
/// inspects when computing a check's pass/fail status for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Severity of the result.
    pub severity: Severity,
    /// Short, single-purpose message (may span lines for transcripts).
    pub message: String,
    /// Optional long-form detail, e.g. a file listing or a diff.
    pub long_text: Option<String>,
    /// Whether this result blocks submission.
    pub fatal: bool,
}

impl CheckResult {
    /// Creates an informational result.
    #[must_use]
    pub fn notify(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Notify,
            message: message.into(),
            long_text: None,
            fatal: false,
        }
    }

    /// Creates a non-blocking warning result.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            long_text: None,
            fatal: false,
        }
    }

    /// Creates a blocking error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            long_text: None,
            fatal: true,
        }
    }

    /// Attaches long-form detail to the result.
    #[must_use]
    pub fn with_long_text(mut self, long_text: impl Into<String>) -> Self {
        self.long_text = Some(long_text.into());
        self
    }

    /// Returns true if this result blocks submission.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.fatal
    }
}
