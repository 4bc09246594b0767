//! Error types for query parameter validation

use thiserror::Error;

/// Result type for query validation
pub type Result<T> = std::result::Result<T, QueryError>;

/// Rejected listing query parameters. Both variants map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Page and limit do not describe a reachable offset
    #[error("Invalid pagination parameters. Page and limit must be valid numbers.")]
    InvalidPagination,

    /// `sortBy` names a field outside the allowed list
    #[error("Invalid sortBy field. Must be one of: {}", .valid.join(", "))]
    InvalidSortField { field: String, valid: Vec<String> },
}

impl QueryError {
    /// Create an invalid sort field error
    pub fn invalid_sort_field<S: AsRef<str>>(field: impl Into<String>, valid: &[S]) -> Self {
        Self::InvalidSortField {
            field: field.into(),
            valid: valid.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    /// HTTP status code for the error response
    pub fn status_code(&self) -> u16 {
        400
    }
}
