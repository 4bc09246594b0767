//! Reactive form state for the box office
//!
//! `boxoffice-forms` owns the state behind every form and listing in the
//! application: values, per-field errors and touched flags, submission
//! bookkeeping and paginated table queries. It knows nothing about users or
//! venues; those schemas live in `boxoffice-validation`.
//!
//! # Architecture
//!
//! - **Full-record validation**: a [`Schema`] always sees the whole record, so
//!   cross-field rules work; per-field validation filters issues by path
//! - **Top-level change tracking**: [`FormEngine::changed_values`] emits whole
//!   top-level fields so nested objects reach the server complete
//! - **Watch notifications**: every mutation publishes a [`FormStatus`] on a
//!   `tokio::sync::watch` channel
//! - **Borrowed bindings**: [`Field`], [`ReactiveField`] and [`Registration`]
//!   are short-lived views over one path of a form

pub mod engine;
pub mod error;
pub mod field;
pub mod path;
pub mod schema;
pub mod status;
pub mod table;
pub mod value;

pub use engine::{
    FieldState, FormEngine, FormEngineBuilder, FormSubmitEvent, SubmitEvent, SubmitHandler,
    SubmitOutcome, DEFAULT_EXCLUDED_FIELDS,
};
pub use error::{FormsError, Result};
pub use field::{Field, ReactiveField, Registration};
pub use path::FieldPath;
pub use schema::{Issue, PathSegment, Schema, SchemaError, Validation};
pub use status::FormStatus;
pub use table::{PageMeta, SortOrder, TableOptions, TableResponse, TableSource, TableState};
pub use value::{deep_equal, records_equal, Record, Value};
