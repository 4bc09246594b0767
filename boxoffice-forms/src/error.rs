//! Error types for the form engine

use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormsError>;

/// Errors that can occur in form operations.
///
/// Validation failures are not errors: they are reported through the
/// engine's per-field error state. The only error a caller sees from a
/// well-formed form is a failing submit handler.
#[derive(Debug, Error)]
pub enum FormsError {
    /// Field path is empty or has an empty segment (`a..b`)
    #[error("invalid field path: '{path}'")]
    InvalidPath { path: String },

    /// A non-numeric segment addresses a list
    #[error("cannot write '{path}': segment '{segment}' addresses a list")]
    PathConflict { path: String, segment: String },

    /// A record was expected (initial values, bulk assignment)
    #[error("expected a record of field values, got {kind}")]
    NotARecord { kind: &'static str },

    /// A list index lies too far past the end of the list to pad up to
    #[error("cannot write '{path}': index {segment} is beyond the end of the list")]
    IndexOutOfRange { path: String, segment: String },

    /// The submit handler failed; the form is no longer submitting
    #[error("submit handler failed: {0}")]
    Submit(#[source] anyhow::Error),

    /// A table source failed to fetch rows
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormsError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}
