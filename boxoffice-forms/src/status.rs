//! Published form status.

use serde::Serialize;

/// Snapshot of a form's derived state, published to subscribers after every
/// mutation. `revision` increases on each write to values, errors or touched
/// state, so hosts can re-render field bindings even when the flags stay put.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub is_submitting: bool,
    pub is_valid: bool,
    pub is_touched: bool,
    pub is_dirty: bool,
    pub submit_count: u32,
    pub form_error: Option<String>,
    pub revision: u64,
}
