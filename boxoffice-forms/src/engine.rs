//! State container for a single form.
//!
//! Owns the value record, the per-field error/touched registry and the
//! submission bookkeeping. Validation always runs the schema over the whole
//! record so that cross-field rules (password confirmation and the like) see
//! every field; single-field validation then filters the issues by path.
//!
//! Every mutation publishes a fresh [`FormStatus`] on a watch channel, and all
//! derived getters compute from current state, so nothing read after a write
//! is ever stale.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::error::{FormsError, Result};
use crate::path::{self, FieldPath};
use crate::schema::Schema;
use crate::status::FormStatus;
use crate::value::{deep_equal, records_equal, Record, Value};

/// Fields left out of changed values unless the caller says otherwise.
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &["password"];

/// Receives the record on a successful submit.
///
/// `changed` holds the top-level fields that differ from the original
/// snapshot (the whole record when there is none).
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: Value, changed: Value) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> SubmitHandler for F
where
    F: Fn(Value, Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn submit(&self, values: Value, changed: Value) -> anyhow::Result<()> {
        (self)(values, changed).await
    }
}

/// The host event that triggered a submit.
pub trait SubmitEvent {
    fn prevent_default(&mut self);
}

/// Minimal [`SubmitEvent`] for hosts without a native event type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormSubmitEvent {
    pub default_prevented: bool,
}

impl SubmitEvent for FormSubmitEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// How a call to [`FormEngine::handle_submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and the handler completed
    Submitted,
    /// Validation failed; the handler was not called
    Invalid,
    /// Validation passed and no handler is configured
    NoHandler,
}

/// Error and touched state of one registered field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub error: Option<String>,
    pub touched: bool,
}

impl FieldState {
    fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Builder for [`FormEngine`]. Created by [`FormEngine::builder()`].
#[derive(Default)]
pub struct FormEngineBuilder {
    schema: Option<Arc<dyn Schema>>,
    initial_values: Option<Value>,
    on_submit: Option<Arc<dyn SubmitHandler>>,
    excluded_fields: Option<Vec<String>>,
}

impl FormEngineBuilder {
    /// Validate with this schema. Without one every validation succeeds.
    pub fn schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Validate with a schema shared between forms.
    pub fn shared_schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Seed values, the reset baseline and the original snapshot.
    pub fn initial_values(mut self, values: impl Into<Value>) -> Self {
        self.initial_values = Some(values.into());
        self
    }

    /// Call this handler on a successful submit.
    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Top-level fields left out of the changed values passed to the submit
    /// handler. Defaults to [`DEFAULT_EXCLUDED_FIELDS`].
    pub fn excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Build the engine. Initial values must be a record.
    pub fn build(self) -> Result<FormEngine> {
        let initial = match self.initial_values {
            Some(Value::Record(record)) => Some(record),
            Some(other) => return Err(FormsError::NotARecord { kind: other.kind() }),
            None => None,
        };
        let baseline = initial.clone().unwrap_or_default();
        let fields = baseline
            .keys()
            .map(|key| (key.clone(), FieldState::default()))
            .collect();
        let (status_tx, _) = watch::channel(FormStatus::default());

        let engine = FormEngine {
            values: baseline.clone(),
            original: initial,
            baseline,
            fields,
            submit_count: 0,
            is_submitting: false,
            form_error: None,
            revision: 0,
            schema: self.schema,
            on_submit: self.on_submit,
            excluded_fields: self.excluded_fields.unwrap_or_else(|| {
                DEFAULT_EXCLUDED_FIELDS
                    .iter()
                    .map(|f| f.to_string())
                    .collect()
            }),
            status_tx,
        };
        engine.publish();

        debug!(
            fields = engine.fields.len(),
            has_schema = engine.schema.is_some(),
            has_handler = engine.on_submit.is_some(),
            "form engine created"
        );
        Ok(engine)
    }
}

/// Reactive state for one form.
pub struct FormEngine {
    values: Record,
    original: Option<Record>,
    baseline: Record,
    fields: IndexMap<String, FieldState>,
    submit_count: u32,
    is_submitting: bool,
    form_error: Option<String>,
    revision: u64,
    schema: Option<Arc<dyn Schema>>,
    on_submit: Option<Arc<dyn SubmitHandler>>,
    excluded_fields: Vec<String>,
    status_tx: watch::Sender<FormStatus>,
}

impl FormEngine {
    /// Start configuring a new form.
    ///
    /// ```rust,ignore
    /// let form = FormEngine::builder()
    ///     .schema(register_schema())
    ///     .initial_values(json!({"email": "", "password": ""}))
    ///     .on_submit(|values, changed| async move { save(values, changed).await })
    ///     .build()?;
    /// ```
    pub fn builder() -> FormEngineBuilder {
        FormEngineBuilder::default()
    }

    // --- values ---

    /// The current value record.
    pub fn values(&self) -> &Record {
        &self.values
    }

    /// Read a flat or dotted path. Unset paths read as the empty string.
    pub fn get_value(&self, path: &str) -> Value {
        self.try_get_value(path).cloned().unwrap_or_else(Value::empty)
    }

    /// Read a flat or dotted path, `None` when unset or malformed.
    pub fn try_get_value(&self, path: &str) -> Option<&Value> {
        let parsed = FieldPath::parse(path).ok()?;
        path::resolve(&self.values, &parsed)
    }

    /// Write a value. Re-validates the field if it is already touched; does
    /// not mark it touched.
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let parsed = FieldPath::parse(path)?;
        path::assign(&mut self.values, &parsed, value.into())?;
        self.revision += 1;
        if self.is_field_touched(path) {
            self.validate_field(path);
        }
        self.publish();
        Ok(())
    }

    /// Merge top-level entries into the values.
    ///
    /// With `mark_as_original`, the given record also becomes the original
    /// snapshot, so later edits diff against it. Use this when hydrating a
    /// form from a freshly fetched record. The reset baseline stays the
    /// builder's initial values.
    pub fn set_values(&mut self, values: impl Into<Value>, mark_as_original: bool) -> Result<()> {
        let incoming = match values.into() {
            Value::Record(record) => record,
            other => return Err(FormsError::NotARecord { kind: other.kind() }),
        };
        for (key, value) in &incoming {
            self.values.insert(key.clone(), value.clone());
            self.fields.entry(key.clone()).or_default();
        }
        if mark_as_original {
            self.original = Some(incoming);
        }
        self.revision += 1;
        self.publish();
        debug!(mark_as_original, "form values assigned");
        Ok(())
    }

    // --- errors and touched state ---

    /// Error message of a field, if any.
    pub fn error(&self, path: &str) -> Option<&str> {
        self.fields.get(path).and_then(|state| state.error.as_deref())
    }

    /// All present, non-empty field errors in registration order.
    pub fn errors(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, state)| state.has_error())
            .filter_map(|(path, state)| state.error.clone().map(|e| (path.clone(), e)))
            .collect()
    }

    /// Registered fields and their state.
    pub fn fields(&self) -> &IndexMap<String, FieldState> {
        &self.fields
    }

    pub fn is_field_touched(&self, path: &str) -> bool {
        self.fields.get(path).is_some_and(|state| state.touched)
    }

    /// Overwrite a field's error.
    pub fn set_error(&mut self, path: &str, message: Option<String>) {
        self.field_mut(path).error = message;
        self.revision += 1;
        self.publish();
    }

    /// Overwrite several field errors and mark those fields touched, e.g. to
    /// surface a server-side validation response. Does not re-validate, so
    /// the given messages stay in place.
    pub fn set_errors<I, K, M>(&mut self, errors: I)
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: Into<String>,
    {
        for (path, message) in errors {
            let state = self.fields.entry(path.into()).or_default();
            state.error = Some(message.into());
            state.touched = true;
        }
        self.revision += 1;
        self.publish();
    }

    /// Set a field's touched flag. Marking it touched re-validates it.
    pub fn set_touched(&mut self, path: &str, is_touched: bool) {
        self.field_mut(path).touched = is_touched;
        self.revision += 1;
        if is_touched {
            self.validate_field(path);
        }
        self.publish();
    }

    /// Mark a field touched.
    pub fn touch(&mut self, path: &str) {
        self.set_touched(path, true);
    }

    // --- form-level error ---

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn set_form_error(&mut self, message: Option<String>) {
        self.form_error = message;
        self.publish();
    }

    pub fn clear_form_error(&mut self) {
        self.set_form_error(None);
    }

    // --- validation ---

    /// Validate one field against the full record.
    ///
    /// The first issue whose dotted path equals `path` becomes the field's
    /// error; no matching issue clears it. Without a schema this returns
    /// `true` and leaves errors alone. If the schema itself fails the field
    /// is reported invalid and its error is left as it was.
    pub fn validate_field(&mut self, path: &str) -> bool {
        let Some(schema) = self.schema.clone() else {
            return true;
        };
        let validation = match schema.validate(&Value::Record(self.values.clone())) {
            Ok(validation) => validation,
            Err(err) => {
                warn!(field = path, error = %err, "schema failed while validating field");
                return false;
            }
        };

        let message = validation
            .issues()
            .iter()
            .find(|issue| issue.dotted_path() == path)
            .map(|issue| issue.message.clone());
        let valid = message.is_none();
        trace!(field = path, valid, "validated field");

        self.field_mut(path).error = message;
        self.revision += 1;
        self.publish();
        valid
    }

    /// Validate the full record.
    ///
    /// Success clears every error. Failure clears every error, then sets one
    /// error per issue path (the first issue for a path wins) and marks those
    /// fields touched. Issues without a path are form-level and are not
    /// attached to any field. A failing schema reports `false` and changes
    /// nothing.
    pub fn validate(&mut self) -> bool {
        let Some(schema) = self.schema.clone() else {
            return true;
        };
        let validation = match schema.validate(&Value::Record(self.values.clone())) {
            Ok(validation) => validation,
            Err(err) => {
                warn!(error = %err, "schema failed while validating form");
                return false;
            }
        };

        for state in self.fields.values_mut() {
            state.error = None;
        }
        for issue in validation.issues() {
            let path = issue.dotted_path();
            if path.is_empty() {
                debug!(message = %issue.message, "form-level issue has no field path");
                continue;
            }
            let state = self.field_mut(&path);
            if state.error.is_none() {
                state.error = Some(issue.message.clone());
            }
            state.touched = true;
        }
        self.revision += 1;
        self.publish();

        trace!(issues = validation.issues().len(), "validated form");
        validation.is_valid()
    }

    // --- submission ---

    /// Validate and submit.
    ///
    /// Increments the submit count, clears the form error, marks every
    /// registered field touched and validates. On success the configured
    /// handler receives the values and the changed values; `is_submitting`
    /// is set for the duration of the call and cleared afterwards whether the
    /// handler succeeds, fails or the returned future is dropped. A handler
    /// failure comes back as [`FormsError::Submit`].
    pub async fn handle_submit(&mut self) -> Result<SubmitOutcome> {
        self.submit_count += 1;
        self.form_error = None;

        let known: Vec<String> = self.fields.keys().cloned().collect();
        for path in &known {
            self.set_touched(path, true);
        }

        if !self.validate() {
            debug!(
                submit_count = self.submit_count,
                errors = self.errors().len(),
                "submit blocked by validation"
            );
            return Ok(SubmitOutcome::Invalid);
        }

        let Some(handler) = self.on_submit.clone() else {
            self.publish();
            return Ok(SubmitOutcome::NoHandler);
        };

        let values = Value::Record(self.values.clone());
        let changed = self.changed_values(self.excluded_fields.as_slice());

        let guard = SubmittingGuard::enter(self);
        let result = handler.submit(values, changed).await;
        drop(guard);

        match result {
            Ok(()) => {
                debug!(submit_count = self.submit_count, "form submitted");
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(error = %err, "submit handler failed");
                Err(FormsError::Submit(err))
            }
        }
    }

    /// [`handle_submit`](Self::handle_submit) driven by a host event, whose
    /// default action is suppressed first.
    pub async fn handle_submit_event(
        &mut self,
        event: &mut impl SubmitEvent,
    ) -> Result<SubmitOutcome> {
        event.prevent_default();
        self.handle_submit().await
    }

    // --- reset ---

    /// Restore the baseline values, clear every error and touched flag, the
    /// submit count and the form error. Schema and handler are kept.
    pub fn reset(&mut self) {
        self.values = self.baseline.clone();
        for state in self.fields.values_mut() {
            *state = FieldState::default();
        }
        self.submit_count = 0;
        self.form_error = None;
        self.revision += 1;
        self.publish();
        debug!(fields = self.fields.len(), "form reset");
    }

    // --- changes ---

    /// Top-level fields whose value differs from the original snapshot.
    ///
    /// A change anywhere below a top-level field emits that whole field, so
    /// consumers always receive complete nested objects. Fields named in
    /// `exclude` are skipped even if changed. Without a snapshot the full
    /// record is returned.
    pub fn changed_values<S: AsRef<str>>(&self, exclude: &[S]) -> Value {
        let Some(original) = &self.original else {
            return Value::Record(self.values.clone());
        };
        let changed: Record = self
            .values
            .iter()
            .filter(|(key, _)| !exclude.iter().any(|e| e.as_ref() == key.as_str()))
            .filter(|(key, value)| {
                !original
                    .get(key.as_str())
                    .is_some_and(|before| deep_equal(value, before))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Record(changed)
    }

    /// [`changed_values`](Self::changed_values) excluding `password`.
    pub fn changed_values_default(&self) -> Value {
        self.changed_values(DEFAULT_EXCLUDED_FIELDS)
    }

    // --- derived state ---

    /// No registered field carries a non-empty error.
    pub fn is_valid(&self) -> bool {
        !self.fields.values().any(FieldState::has_error)
    }

    /// Some registered field is touched.
    pub fn is_touched(&self) -> bool {
        self.fields.values().any(|state| state.touched)
    }

    /// Values differ from the original snapshot; `false` without one.
    pub fn is_dirty(&self) -> bool {
        self.original
            .as_ref()
            .is_some_and(|original| !records_equal(&self.values, original))
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Current derived state.
    pub fn status(&self) -> FormStatus {
        FormStatus {
            is_submitting: self.is_submitting,
            is_valid: self.is_valid(),
            is_touched: self.is_touched(),
            is_dirty: self.is_dirty(),
            submit_count: self.submit_count,
            form_error: self.form_error.clone(),
            revision: self.revision,
        }
    }

    /// Receive a new [`FormStatus`] whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<FormStatus> {
        self.status_tx.subscribe()
    }

    // --- internals ---

    fn field_mut(&mut self, path: &str) -> &mut FieldState {
        self.fields.entry(path.to_string()).or_default()
    }

    /// Register a field the first time it is bound.
    ///
    /// The initial value is `default`, else the baseline value at `path`,
    /// else the empty string. It is written wherever the path is still unset:
    /// the values, the original snapshot and the baseline, so binding a field
    /// neither dirties the form nor disappears on reset.
    pub(crate) fn ensure_field(&mut self, path: &str, default: Option<Value>) {
        if self.fields.contains_key(path) {
            return;
        }
        let parsed = match FieldPath::parse(path) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(field = path, error = %err, "not registering field with an unusable path");
                return;
            }
        };
        self.fields.insert(path.to_string(), FieldState::default());
        let initial = default
            .or_else(|| path::resolve(&self.baseline, &parsed).cloned())
            .unwrap_or_else(Value::empty);

        seed(&mut self.values, &parsed, &initial);
        if let Some(original) = self.original.as_mut() {
            seed(original, &parsed, &initial);
        }
        seed(&mut self.baseline, &parsed, &initial);

        self.revision += 1;
        self.publish();
        trace!(field = path, "field registered");
    }

    fn publish(&self) {
        let next = self.status();
        self.status_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Write `value` at `path` unless something is already there.
fn seed(record: &mut Record, path: &FieldPath, value: &Value) {
    if path::resolve(record, path).is_some() {
        return;
    }
    if let Err(err) = path::assign(record, path, value.clone()) {
        warn!(field = %path, error = %err, "could not seed field value");
    }
}

/// Holds `is_submitting` high while the submit handler runs.
struct SubmittingGuard<'a> {
    engine: &'a mut FormEngine,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(engine: &'a mut FormEngine) -> Self {
        engine.is_submitting = true;
        engine.publish();
        Self { engine }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.engine.is_submitting = false;
        self.engine.publish();
    }
}
