//! Full-record schema validation contract.
//!
//! A schema sees the complete value record and reports every issue it finds.
//! Expected validation failure is data ([`Validation::Invalid`]); an `Err`
//! means the schema itself could not run.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

/// One segment of an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single validation issue attributed to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    pub fn new<P, S>(path: P, message: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// An issue on a single top-level field.
    pub fn at(field: &str, message: impl Into<String>) -> Self {
        Self::new([field], message)
    }

    /// An issue on the record as a whole (no field path).
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Path segments joined with `.`, e.g. `profile.socialLinks.github`.
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Nest this issue under a parent segment.
    pub fn prefixed(mut self, parent: impl Into<PathSegment>) -> Self {
        self.path.insert(0, parent.into());
        self
    }
}

/// Outcome of validating a full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(Vec<Issue>),
}

impl Validation {
    /// `Valid` when there are no issues.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            Validation::Valid
        } else {
            Validation::Invalid(issues)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn issues(&self) -> &[Issue] {
        match self {
            Validation::Valid => &[],
            Validation::Invalid(issues) => issues,
        }
    }
}

/// The schema could not evaluate the record.
#[derive(Debug, Clone, Error)]
#[error("schema could not validate record: {message}")]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A full-record validator.
pub trait Schema: Send + Sync {
    fn validate(&self, record: &Value) -> Result<Validation, SchemaError>;
}

impl<F> Schema for F
where
    F: Fn(&Value) -> Result<Validation, SchemaError> + Send + Sync,
{
    fn validate(&self, record: &Value) -> Result<Validation, SchemaError> {
        self(record)
    }
}
