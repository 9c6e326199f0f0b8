//! Error types for branch reconciliation.

use thiserror::Error;

/// Main error type for branchsmith operations.
#[derive(Error, Debug)]
pub enum ReconcileError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Upgrade of '{dep_name}' has no branch name")]
    MissingBranchName { dep_name: String },

    // Edit errors - abort the whole pass
    #[error(
        "Could not update '{dep_name}' in '{package_file}': cannot represent this upgrade on the branch"
    )]
    FileUpdateFailed {
        package_file: String,
        dep_name: String,
    },

    // Repository errors
    #[error("Repository read failed: {0}")]
    RepositoryError(String),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Version/parsing errors - automatic conversions via #[from]
    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML edit error: {0}")]
    TomlEditError(#[from] toml_edit::TomlError),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReconcileError
pub type Result<T> = std::result::Result<T, ReconcileError>;

impl ReconcileError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an unrecoverable edit failure
    pub fn file_update_failed(
        package_file: impl Into<String>,
        dep_name: impl Into<String>,
    ) -> Self {
        Self::FileUpdateFailed {
            package_file: package_file.into(),
            dep_name: dep_name.into(),
        }
    }

    /// Create a repository read error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::RepositoryError(msg.into())
    }
}

// Wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
