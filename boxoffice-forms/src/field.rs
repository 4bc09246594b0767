//! Per-field bindings over a [`FormEngine`].
//!
//! Three progressively richer views over one field path. Each borrows the
//! engine mutably for as long as it lives, so a host binds a field, reads or
//! writes through it, and lets it go.

use std::ops::{Deref, DerefMut};

use crate::engine::FormEngine;
use crate::error::Result;
use crate::value::Value;

/// Value access for one field.
pub struct Field<'a> {
    engine: &'a mut FormEngine,
    path: String,
}

impl<'a> Field<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self) -> Value {
        self.engine.get_value(&self.path)
    }

    pub fn set(&mut self, value: impl Into<Value>) -> Result<()> {
        self.engine.set_value(&self.path, value)
    }
}

/// A [`Field`] that also exposes error and touched state and blur handling.
pub struct ReactiveField<'a> {
    field: Field<'a>,
}

impl<'a> ReactiveField<'a> {
    pub fn error(&self) -> Option<&str> {
        self.field.engine.error(&self.field.path)
    }

    pub fn touched(&self) -> bool {
        self.field.engine.is_field_touched(&self.field.path)
    }

    /// Marks the field touched, which validates it.
    pub fn on_blur(&mut self) {
        self.field.engine.set_touched(&self.field.path, true);
    }

    pub fn on_focus(&mut self) {}
}

impl<'a> Deref for ReactiveField<'a> {
    type Target = Field<'a>;

    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl DerefMut for ReactiveField<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.field
    }
}

/// A [`ReactiveField`] that can also set its own error and touched state and
/// validate itself.
pub struct Registration<'a> {
    reactive: ReactiveField<'a>,
}

impl<'a> Registration<'a> {
    pub fn set_error(&mut self, message: Option<String>) {
        self.reactive.field.engine.set_error(&self.reactive.field.path, message);
    }

    pub fn set_touched(&mut self, is_touched: bool) {
        self.reactive
            .field
            .engine
            .set_touched(&self.reactive.field.path, is_touched);
    }

    pub fn validate(&mut self) -> bool {
        self.reactive
            .field
            .engine
            .validate_field(&self.reactive.field.path)
    }
}

impl<'a> Deref for Registration<'a> {
    type Target = ReactiveField<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reactive
    }
}

impl DerefMut for Registration<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reactive
    }
}

impl FormEngine {
    /// Bind a field for reading and writing.
    ///
    /// The first binding of a path registers it with initial value
    /// `default`, else the initial value at `path`, else the empty string.
    pub fn field(&mut self, path: &str, default: Option<Value>) -> Field<'_> {
        self.ensure_field(path, default);
        Field {
            engine: self,
            path: path.to_string(),
        }
    }

    /// Bind a field with error, touched and blur support.
    pub fn reactive_field(&mut self, path: &str, default: Option<Value>) -> ReactiveField<'_> {
        ReactiveField {
            field: self.field(path, default),
        }
    }

    /// Bind a field with full control over its error and touched state.
    pub fn register(&mut self, path: &str, default: Option<Value>) -> Registration<'_> {
        Registration {
            reactive: self.reactive_field(path, default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Issue, SchemaError, Validation};
    use serde_json::json;

    fn name_required(record: &Value) -> std::result::Result<Validation, SchemaError> {
        let name = record
            .get("profile")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("");
        Ok(if name.is_empty() {
            Validation::Invalid(vec![Issue::new(["profile", "name"], "Name is required")])
        } else {
            Validation::Valid
        })
    }

    #[test]
    fn field_reads_initial_value() {
        let mut form = FormEngine::builder()
            .initial_values(json!({"email": "olivia@theatre.test"}))
            .build()
            .unwrap();
        let field = form.field("email", None);
        assert_eq!(field.get(), Value::from("olivia@theatre.test"));
        assert_eq!(field.path(), "email");
    }

    #[test]
    fn field_default_wins_over_empty_string() {
        let mut form = FormEngine::builder().build().unwrap();
        let field = form.field("seats", Some(Value::from(4)));
        assert_eq!(field.get(), Value::from(4));
    }

    #[test]
    fn field_set_writes_through() {
        let mut form = FormEngine::builder().build().unwrap();
        form.field("name", None).set("Malvolio").unwrap();
        assert_eq!(form.get_value("name"), Value::from("Malvolio"));
    }

    #[test]
    fn reactive_field_blur_validates() {
        let mut form = FormEngine::builder()
            .schema(name_required)
            .initial_values(json!({"profile": {"name": ""}}))
            .build()
            .unwrap();
        let mut name = form.reactive_field("profile.name", None);
        assert!(!name.touched());
        name.on_focus();
        assert_eq!(name.error(), None);

        name.on_blur();
        assert!(name.touched());
        assert_eq!(name.error(), Some("Name is required"));

        name.set("Orsino").unwrap();
        assert_eq!(name.error(), None);
    }

    #[test]
    fn registration_controls_error_state() {
        let mut form = FormEngine::builder()
            .schema(name_required)
            .initial_values(json!({"profile": {"name": ""}}))
            .build()
            .unwrap();
        let mut reg = form.register("profile.name", None);
        reg.set_error(Some("Taken".into()));
        assert_eq!(reg.error(), Some("Taken"));
        assert!(!reg.validate());
        assert_eq!(reg.error(), Some("Name is required"));
        reg.set_touched(true);
        assert!(reg.touched());
    }

    #[test]
    fn registering_new_nested_path_keeps_form_clean() {
        let mut form = FormEngine::builder()
            .initial_values(json!({"profile": {"name": "Viola"}}))
            .build()
            .unwrap();
        let reg = form.register("profile.socialLinks.github", None);
        assert_eq!(reg.get(), Value::empty());
        drop(reg);

        assert!(!form.is_dirty());
        assert_eq!(form.changed_values_default(), Value::record());
        assert_eq!(form.get_value("profile.name"), Value::from("Viola"));
    }

    #[test]
    fn registered_field_survives_reset() {
        let mut form = FormEngine::builder().build().unwrap();
        form.register("notes", Some(Value::from("aisle seat")));
        form.set_value("notes", "box seat").unwrap();
        form.reset();
        assert_eq!(form.get_value("notes"), Value::from("aisle seat"));
    }
}
