//! Error types for devtools-presubmit.
//!
//! Subprocess failures are NOT errors at this level: a check script that
//! exits non-zero becomes a fatal `CheckResult`. The variants here cover
//! the cases that abort a run: bad configuration, unusable changeset
//! input, missing tooling, and I/O trouble.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in devtools-presubmit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Changeset errors
    // =========================================================================
    /// Not in a Git repository.
    #[error("Not in a Git repository")]
    NotGitRepo,

    /// Git operation failed.
    #[error("Git operation failed: {operation} - {message}")]
    GitOperation {
        /// Name of the operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    /// Failed to parse a host-supplied changeset file.
    #[error("Failed to parse changeset {path}: {message}")]
    ChangesetParse {
        /// Path of the changeset file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    // =========================================================================
    // Check execution errors
    // =========================================================================
    /// External tool not found in PATH or configuration.
    #[error("Command not found: {command}")]
    CommandNotFound {
        /// The command that wasn't found.
        command: String,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new Git operation error.
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GitOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a new changeset parse error.
    pub fn changeset(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ChangesetParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a user-correctable error.
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::NotGitRepo
                | Self::ChangesetParse { .. }
                | Self::CommandNotFound { .. }
        )
    }

    /// Returns an exit code appropriate for this error.
    ///
    /// Config trouble maps to EX_CONFIG, unusable input to EX_DATAERR,
    /// missing tooling to the shell's command-not-found code.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                78
            }
            Self::NotGitRepo | Self::GitOperation { .. } | Self::ChangesetParse { .. } => 65,
            Self::CommandNotFound { .. } => 127,
            _ => 1,
        }
    }
}
