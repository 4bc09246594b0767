//! Behavioural properties of the form engine, exercised through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use boxoffice_forms::{
    FormEngine, FormStatus, FormsError, Issue, SchemaError, SubmitOutcome, Validation, Value,
};
use serde_json::json;
use tokio::sync::watch;

const MISMATCH: &str = "Passwords do not match";

fn always_invalid_email(_: &Value) -> Result<Validation, SchemaError> {
    Ok(Validation::Invalid(vec![Issue::at("email", "Invalid email address")]))
}

fn passwords_match(record: &Value) -> Result<Validation, SchemaError> {
    let password = record.get("password").and_then(Value::as_str).unwrap_or("");
    let confirm = record
        .get("confirmPassword")
        .and_then(Value::as_str)
        .unwrap_or("");
    Ok(if password == confirm {
        Validation::Valid
    } else {
        Validation::Invalid(vec![Issue::at("confirmPassword", MISMATCH)])
    })
}

#[test]
fn touching_twice_matches_touching_once() {
    let mut form = FormEngine::builder()
        .schema(always_invalid_email)
        .initial_values(json!({"email": "nope"}))
        .build()
        .unwrap();

    form.set_touched("email", true);
    let once = form.error("email").map(str::to_string);
    form.set_touched("email", true);
    assert_eq!(form.error("email").map(str::to_string), once);
    assert_eq!(once.as_deref(), Some("Invalid email address"));
}

#[test]
fn nested_writes_keep_siblings() {
    let mut form = FormEngine::builder().build().unwrap();
    form.set_value("profile.name", "A").unwrap();
    form.set_value("profile.bio", "B").unwrap();
    assert_eq!(form.get_value("profile.name"), Value::from("A"));
    assert_eq!(form.get_value("profile.bio"), Value::from("B"));
}

#[test]
fn dirty_tracking_follows_edits_and_reset() {
    let mut form = FormEngine::builder()
        .initial_values(json!({"name": "X"}))
        .build()
        .unwrap();
    assert!(!form.is_dirty());
    form.set_value("name", "Y").unwrap();
    assert!(form.is_dirty());
    form.reset();
    assert!(!form.is_dirty());
    assert_eq!(form.get_value("name"), Value::from("X"));
}

#[test]
fn password_is_excluded_from_changed_values() {
    let mut form = FormEngine::builder()
        .initial_values(json!({"password": "p1", "email": "e1"}))
        .build()
        .unwrap();
    form.set_value("password", "p2").unwrap();
    form.set_value("email", "e2").unwrap();
    assert_eq!(
        form.changed_values_default(),
        Value::from(json!({"email": "e2"}))
    );
}

#[tokio::test]
async fn invalid_form_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut form = FormEngine::builder()
        .schema(always_invalid_email)
        .initial_values(json!({"email": ""}))
        .on_submit(move |_values: Value, _changed: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { anyhow::Ok(()) }
        })
        .build()
        .unwrap();

    let outcome = form.handle_submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(!form.is_submitting());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(form.submit_count(), 1);
    assert_eq!(form.error("email"), Some("Invalid email address"));
}

#[test]
fn cross_field_issue_only_lands_on_its_own_field() {
    let mut form = FormEngine::builder()
        .schema(passwords_match)
        .initial_values(json!({"password": "", "confirmPassword": ""}))
        .build()
        .unwrap();
    form.set_value("password", "a").unwrap();
    form.set_value("confirmPassword", "b").unwrap();

    assert!(!form.validate_field("confirmPassword"));
    assert_eq!(form.error("confirmPassword"), Some(MISMATCH));

    assert!(form.validate_field("password"));
    assert_eq!(form.error("password"), None);
}

#[tokio::test]
async fn failing_handler_clears_submitting_and_surfaces_error() {
    let mut form = FormEngine::builder()
        .initial_values(json!({"email": "a@b.test"}))
        .on_submit(|_values: Value, _changed: Value| async {
            Err::<(), _>(anyhow::anyhow!("Email already registered"))
        })
        .build()
        .unwrap();

    let err = form.handle_submit().await.unwrap_err();
    assert!(matches!(err, FormsError::Submit(_)));
    assert!(err.to_string().contains("Email already registered"));
    assert!(!form.is_submitting());
}

#[test_log::test(tokio::test)]
async fn handler_receives_values_and_changed_values() {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let mut form = FormEngine::builder()
        .initial_values(json!({"email": "e1", "password": "p1", "name": "Sebastian"}))
        .on_submit(move |values: Value, changed: Value| {
            *sink.lock().unwrap() = Some((values, changed));
            async { anyhow::Ok(()) }
        })
        .build()
        .unwrap();
    form.set_value("email", "e2").unwrap();
    form.set_value("password", "p2").unwrap();

    assert_eq!(form.handle_submit().await.unwrap(), SubmitOutcome::Submitted);
    let (values, changed) = seen.lock().unwrap().take().unwrap();
    assert_eq!(
        values,
        Value::from(json!({"email": "e2", "password": "p2", "name": "Sebastian"}))
    );
    assert_eq!(changed, Value::from(json!({"email": "e2"})));
}

#[tokio::test]
async fn custom_exclusions_replace_the_default() {
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let mut form = FormEngine::builder()
        .initial_values(json!({"email": "e1", "password": "p1"}))
        .excluded_fields(Vec::<String>::new())
        .on_submit(move |_values: Value, changed: Value| {
            *sink.lock().unwrap() = Some(changed);
            async { anyhow::Ok(()) }
        })
        .build()
        .unwrap();
    form.set_value("password", "p2").unwrap();
    form.handle_submit().await.unwrap();

    assert_eq!(
        seen.lock().unwrap().take().unwrap(),
        Value::from(json!({"password": "p2"}))
    );
}

#[test_log::test(tokio::test)]
async fn observers_see_submitting_during_handler() {
    let slot: Arc<Mutex<Option<watch::Receiver<FormStatus>>>> = Arc::new(Mutex::new(None));
    let during = Arc::new(Mutex::new(Vec::new()));

    let handler_slot = slot.clone();
    let handler_seen = during.clone();
    let mut form = FormEngine::builder()
        .initial_values(json!({"email": "a@b.test"}))
        .on_submit(move |_values: Value, _changed: Value| {
            if let Some(rx) = handler_slot.lock().unwrap().as_ref() {
                handler_seen.lock().unwrap().push(rx.borrow().is_submitting);
            }
            async { anyhow::Ok(()) }
        })
        .build()
        .unwrap();

    let rx = form.subscribe();
    *slot.lock().unwrap() = Some(rx.clone());
    let before = rx.borrow().revision;

    form.handle_submit().await.unwrap();

    assert_eq!(*during.lock().unwrap(), vec![true]);
    let after = rx.borrow().clone();
    assert!(!after.is_submitting);
    assert_eq!(after.submit_count, 1);
    assert!(after.revision > before);
}

#[test]
fn server_errors_survive_until_next_validation() {
    let mut form = FormEngine::builder()
        .schema(passwords_match)
        .initial_values(json!({"email": "taken@theatre.test", "password": "", "confirmPassword": ""}))
        .build()
        .unwrap();
    form.set_errors([("email", "Email already registered")]);
    assert_eq!(form.error("email"), Some("Email already registered"));
    assert!(form.is_field_touched("email"));

    assert!(form.validate());
    assert_eq!(form.error("email"), None);
}
