//! Policy loading errors.

use std::path::PathBuf;

/// Errors raised while loading or sizing policy documents.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// No document exists under the requested name.
    #[error("policy document not found: {name} (looked for {})", path.display())]
    PolicyNotFound {
        /// The requested document name.
        name: String,
        /// The path that was checked.
        path: PathBuf,
    },

    /// The document exists but is not a JSON object.
    #[error("policy document {name} is invalid: {reason}")]
    PolicyDocumentInvalid {
        /// The requested document name.
        name: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Reading the document failed for a reason other than absence.
    #[error("failed to read policy document {}: {source}", path.display())]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A managed policy or permission set exceeds a service limit.
    #[error("{subject} exceeds the {limit} limit: {actual} > {max}")]
    LimitExceeded {
        /// The offending policy or permission set.
        subject: String,
        /// Human-readable limit name.
        limit: &'static str,
        /// Observed value.
        actual: usize,
        /// Allowed maximum.
        max: usize,
    },
}
