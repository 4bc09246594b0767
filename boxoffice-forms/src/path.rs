//! Field path parsing and resolution.
//!
//! A field path is a flat name (`email`) or a dot-delimited address into
//! nested records (`profile.name`). Numeric segments index into lists.

use std::fmt;
use std::str::FromStr;

use crate::error::{FormsError, Result};
use crate::value::{Record, Value};

/// How many nulls a single write may append to pad a list.
pub const MAX_LIST_PADDING: usize = 1024;

/// A parsed, non-empty field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-delimited path. Empty paths and empty segments are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.split('.').any(str::is_empty) {
            return Err(FormsError::invalid_path(raw));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The top-level field name this path lives under.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl FromStr for FieldPath {
    type Err = FormsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolve a path against a record. Missing segments yield `None`.
pub fn resolve<'a>(record: &'a Record, path: &FieldPath) -> Option<&'a Value> {
    let (head, rest) = path.segments.split_first()?;
    rest.iter()
        .try_fold(record.get(head)?, |node, segment| match node {
            Value::Record(child) => child.get(segment),
            Value::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Write `value` at `path`, creating intermediate records on demand.
///
/// Existing intermediate records are merged into, never replaced, so writing
/// `a.b` keeps `a.c`. A scalar intermediate is replaced by a record. Lists are
/// indexed by numeric segments and padded with nulls when written past the
/// end, up to [`MAX_LIST_PADDING`] new entries
/// ([`FormsError::IndexOutOfRange`] beyond that); a non-numeric segment
/// against a list is a [`FormsError::PathConflict`].
pub fn assign(record: &mut Record, path: &FieldPath, value: Value) -> Result<()> {
    let Some((head, rest)) = path.segments.split_first() else {
        return Err(FormsError::invalid_path(path.as_str()));
    };
    let slot = record.entry(head.clone()).or_insert(Value::Null);
    assign_at(slot, rest, value, path)
}

fn assign_at(node: &mut Value, segments: &[String], value: Value, path: &FieldPath) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        *node = value;
        return Ok(());
    };

    match node {
        Value::Record(record) => {
            let child = record.entry(segment.clone()).or_insert(Value::Null);
            assign_at(child, rest, value, path)
        }
        Value::List(items) => {
            let index: usize = segment.parse().map_err(|_| FormsError::PathConflict {
                path: path.to_string(),
                segment: segment.clone(),
            })?;
            if index >= items.len() {
                let len = index
                    .checked_add(1)
                    .filter(|len| len - items.len() <= MAX_LIST_PADDING)
                    .ok_or_else(|| FormsError::IndexOutOfRange {
                        path: path.to_string(),
                        segment: segment.clone(),
                    })?;
                items.resize(len, Value::Null);
            }
            assign_at(&mut items[index], rest, value, path)
        }
        scalar => {
            *scalar = Value::record();
            assign_at(scalar, segments, value, path)
        }
    }
}
