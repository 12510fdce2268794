//! Error types for the AccountStack core.

use std::path::PathBuf;

/// Core error type for configuration and registry handling.
#[derive(Debug, thiserror::Error)]
pub enum AccountStackError {
    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Invalid environment name format.
    #[error("invalid environment name: {0:?} (must match [A-Z][A-Z0-9]*)")]
    InvalidEnvironmentName(String),

    /// The requested environment is not in the registry.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// A required external parameter is absent.
    #[error("missing required configuration: {0}")]
    MissingConfiguration(String),

    /// An external parameter is present but malformed.
    #[error("invalid configuration {name}: {reason}")]
    InvalidConfiguration {
        /// The parameter name.
        name: String,
        /// What is wrong with its value.
        reason: String,
    },

    /// The environment registry violates one of its invariants.
    #[error("invalid environment registry: {0}")]
    InvalidRegistry(String),

    /// Reading a configuration file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for AccountStack core operations.
pub type AccountStackResult<T> = Result<T, AccountStackError>;
