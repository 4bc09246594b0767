//! Box office validation schemas
//!
//! Declarative [`RecordSchema`]s for every form and API request in the box
//! office, built on the [`Schema`](boxoffice_forms::Schema) contract of
//! `boxoffice-forms`, plus the listing query helpers used by API handlers.
//!
//! Schemas are looked up by name for tooling:
//!
//! ```rust,ignore
//! let schema = boxoffice_validation::schema_by_name("register").unwrap();
//! let form = FormEngine::builder().schema(schema).build()?;
//! ```

pub mod common;
pub mod error;
pub mod forms;
pub mod query;
pub mod rules;
pub mod sanitize;
pub mod user;
pub mod venue;

pub use common::{MembershipType, RoleType};
pub use error::{QueryError, Result};
pub use query::{paginated, validate_pagination, validate_sort, Pagination, Sort};
pub use rules::{fields_match, NumberRule, RecordSchema, Rule, StringRule};

type SchemaFactory = fn() -> rules::RecordSchema;

const REGISTRY: &[(&str, SchemaFactory)] = &[
    ("login", forms::login),
    ("register", forms::register),
    ("contact", forms::contact),
    ("profile_form", forms::profile_form),
    ("forgot_password", forms::forgot_password),
    ("reset_password", forms::reset_password),
    ("login_request", user::login_request),
    ("register_request", user::register_request),
    ("password_reset_initiate", user::password_reset_initiate),
    ("password_reset_complete", user::password_reset_complete),
    ("password_update", user::password_update),
    ("email_verification", user::email_verification),
    ("user_setup", user::user_setup),
    ("user_update", user::user_update),
    ("admin_user_update", user::admin_user_update),
    ("venue_create", venue::venue_create),
    ("venue_update", venue::venue_update),
    ("venue_feature_create", venue::venue_feature_create),
    ("venue_feature_update", venue::venue_feature_update),
];

/// Names accepted by [`schema_by_name`], in registry order.
pub fn schema_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Build the named schema.
pub fn schema_by_name(name: &str) -> Option<RecordSchema> {
    REGISTRY
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, factory)| factory())
}
