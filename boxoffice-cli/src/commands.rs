//! Command implementations. Each writes its report to `out` so callers and
//! tests choose the sink.

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use boxoffice_config::BoxOfficeConfig;
use boxoffice_forms::{FormEngine, Schema, Value};
use boxoffice_validation::{schema_by_name, schema_names};
use tracing::debug;

/// Exit code when `validate` finds issues.
pub const INVALID_EXIT_CODE: i32 = 2;

/// Read a JSON document from `file`, or from stdin without one.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Validate `input` against the named schema and print `{valid, errors}`.
///
/// Returns the process exit code: 0 when valid, [`INVALID_EXIT_CODE`] when
/// not.
pub fn validate(schema_name: &str, input: &str, out: &mut impl Write) -> Result<i32> {
    let schema = schema_by_name(schema_name).with_context(|| {
        format!("unknown schema '{schema_name}'; run `boxoffice schemas` to list them")
    })?;
    validate_with(Arc::new(schema), schema_name, input, out)
}

/// Validate `input` with `schema`, reporting field errors under `errors` and
/// issues on the record as a whole under `formErrors`.
pub fn validate_with(
    schema: Arc<dyn Schema>,
    schema_name: &str,
    input: &str,
    out: &mut impl Write,
) -> Result<i32> {
    let record = Value::parse_json(input).context("input is not valid JSON")?;
    let mut form = FormEngine::builder()
        .shared_schema(Arc::clone(&schema))
        .initial_values(record.clone())
        .build()?;

    let valid = form.validate();
    let errors = form.errors();
    let form_errors: Vec<String> = if valid {
        Vec::new()
    } else {
        let validation = schema
            .validate(&record)
            .map_err(|err| anyhow!("schema '{schema_name}' failed to run: {err}"))?;
        validation
            .issues()
            .iter()
            .filter(|issue| issue.path.is_empty())
            .map(|issue| issue.message.clone())
            .collect()
    };
    debug!(
        schema = schema_name,
        valid,
        errors = errors.len(),
        form_errors = form_errors.len(),
        "record validated"
    );

    let errors: serde_json::Map<String, serde_json::Value> = errors
        .into_iter()
        .map(|(path, message)| (path, serde_json::Value::String(message)))
        .collect();
    let mut report = serde_json::json!({ "valid": valid, "errors": errors });
    if !form_errors.is_empty() {
        report["formErrors"] = serde_json::json!(form_errors);
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;

    Ok(if valid { 0 } else { INVALID_EXIT_CODE })
}

/// Print the changed values of `current` against `original`.
///
/// `exclude` replaces the configured exclusion list when non-empty.
pub fn diff(
    original: &str,
    current: &str,
    exclude: &[String],
    config: &BoxOfficeConfig,
    out: &mut impl Write,
) -> Result<()> {
    let original = Value::parse_json(original).context("original is not valid JSON")?;
    let current = Value::parse_json(current).context("current is not valid JSON")?;

    let mut form = FormEngine::builder().initial_values(original).build()?;
    form.set_values(current, false)?;

    let exclude = if exclude.is_empty() {
        config.forms.excluded_fields.as_slice()
    } else {
        exclude
    };
    let changed = form.changed_values(exclude);
    debug!(excluded = ?exclude, dirty = form.is_dirty(), "computed changed values");

    writeln!(out, "{}", serde_json::to_string_pretty(&changed.to_json())?)?;
    Ok(())
}

/// List every schema with its top-level fields.
pub fn schemas(out: &mut impl Write) -> Result<()> {
    for name in schema_names() {
        let fields = schema_by_name(name)
            .map(|schema| schema.field_names().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        writeln!(out, "{name}: {fields}")?;
    }
    Ok(())
}

/// Print the resolved configuration.
pub fn config(config: &BoxOfficeConfig, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
    Ok(())
}
