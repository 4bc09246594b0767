//! Declarative record rules.
//!
//! A [`RecordSchema`] maps field names to [`Rule`]s and implements
//! [`Schema`]. Evaluation follows object-then-refine order: every field rule
//! runs and reports its issues, then refinements run over the whole record
//! unless some field had the wrong type.

use std::fmt;
use std::sync::Arc;

use boxoffice_forms::{Issue, PathSegment, Record, Schema, SchemaError, Validation, Value};
use chrono::DateTime;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Local part, `@`, dotted domain with an alphabetic TLD.
static EMAIL: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
});

/// Whether evaluation may continue past a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// The value had the wrong type; refinements are skipped
    Aborted,
}

type Refinement = Arc<dyn Fn(&Record) -> Option<Issue> + Send + Sync>;

/// A rule for one value.
#[derive(Clone)]
pub struct Rule {
    kind: Kind,
    optional: bool,
    nullable: bool,
}

#[derive(Clone)]
enum Kind {
    String(StringRule),
    Number(NumberRule),
    Boolean,
    Date,
    List(Box<Rule>),
    Record(RecordSchema),
}

impl Rule {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
        }
    }

    pub fn string() -> StringRule {
        StringRule::default()
    }

    pub fn number() -> NumberRule {
        NumberRule::default()
    }

    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    /// An RFC 3339 UTC timestamp string (`...Z`) or a date value.
    pub fn date() -> Self {
        Self::of(Kind::Date)
    }

    /// A list whose every element satisfies `element`.
    pub fn list(element: impl Into<Rule>) -> Self {
        Self::of(Kind::List(Box::new(element.into())))
    }

    /// A nested record. Issues are reported under the parent key.
    pub fn record(schema: RecordSchema) -> Self {
        Self::of(Kind::Record(schema))
    }

    /// A string equal to one of `values`.
    pub fn one_of(values: &[&str]) -> Self {
        Rule::string().one_of(values).into()
    }

    /// The field may be absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The field may be null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &[PathSegment],
        issues: &mut Vec<Issue>,
    ) -> Result<Flow, SchemaError> {
        let value = match value {
            None if self.optional => return Ok(Flow::Continue),
            None => {
                issues.push(issue_at(path, "Required"));
                return Ok(Flow::Aborted);
            }
            Some(Value::Null) if self.nullable => return Ok(Flow::Continue),
            Some(value) => value,
        };

        match &self.kind {
            Kind::String(rule) => rule.check(value, path, issues),
            Kind::Number(rule) => Ok(rule.check(value, path, issues)),
            Kind::Boolean => Ok(match value {
                Value::Bool(_) => Flow::Continue,
                other => mismatch("boolean", other, path, issues),
            }),
            Kind::Date => Ok(check_date(value, path, issues)),
            Kind::List(element) => {
                let Value::List(items) = value else {
                    return Ok(mismatch("array", value, path, issues));
                };
                let mut flow = Flow::Continue;
                for (index, item) in items.iter().enumerate() {
                    let item_path = child(path, PathSegment::Index(index));
                    if element.check(Some(item), &item_path, issues)? == Flow::Aborted {
                        flow = Flow::Aborted;
                    }
                }
                Ok(flow)
            }
            Kind::Record(schema) => match value {
                Value::Record(record) => schema.check_record(record, path, issues),
                other => Ok(mismatch("object", other, path, issues)),
            },
        }
    }
}

#[derive(Clone)]
enum StringCheck {
    Min(usize, String),
    Max(usize, String),
    Email(String),
    Url(String),
    Pattern(Result<Regex, String>, String),
    OneOf(Vec<String>),
}

impl StringCheck {
    fn failure(&self, s: &str) -> Result<Option<String>, SchemaError> {
        let failed = match self {
            StringCheck::Min(min, message) => (s.chars().count() < *min).then(|| message.clone()),
            StringCheck::Max(max, message) => (s.chars().count() > *max).then(|| message.clone()),
            StringCheck::Email(message) => {
                let regex = EMAIL
                    .as_ref()
                    .map_err(|e| SchemaError::new(format!("email pattern: {e}")))?;
                let valid = regex.is_match(s) && !s.starts_with('.') && !s.contains("..");
                (!valid).then(|| message.clone())
            }
            StringCheck::Url(message) => url::Url::parse(s).is_err().then(|| message.clone()),
            StringCheck::Pattern(regex, message) => {
                let regex = regex
                    .as_ref()
                    .map_err(|e| SchemaError::new(format!("pattern: {e}")))?;
                (!regex.is_match(s)).then(|| message.clone())
            }
            StringCheck::OneOf(values) => (!values.iter().any(|v| v == s)).then(|| {
                let expected = values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!("Invalid enum value. Expected {expected}, received '{s}'")
            }),
        };
        Ok(failed)
    }
}

/// Builder for a string [`Rule`].
#[derive(Clone, Default)]
pub struct StringRule {
    checks: Vec<StringCheck>,
    or_empty: bool,
}

impl StringRule {
    /// At least `min` characters.
    pub fn min(mut self, min: usize, message: &str) -> Self {
        self.checks.push(StringCheck::Min(min, message.to_string()));
        self
    }

    /// At most `max` characters.
    pub fn max(mut self, max: usize, message: &str) -> Self {
        self.checks.push(StringCheck::Max(max, message.to_string()));
        self
    }

    pub fn email(mut self, message: &str) -> Self {
        self.checks.push(StringCheck::Email(message.to_string()));
        self
    }

    /// An absolute URL.
    pub fn url(mut self, message: &str) -> Self {
        self.checks.push(StringCheck::Url(message.to_string()));
        self
    }

    /// Matches `pattern`. A pattern that does not compile makes the schema
    /// fail with [`SchemaError`] when it runs.
    pub fn pattern(mut self, pattern: &str, message: &str) -> Self {
        let regex = Regex::new(pattern).map_err(|e| e.to_string());
        self.checks
            .push(StringCheck::Pattern(regex, message.to_string()));
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.checks.push(StringCheck::OneOf(
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    /// Also accept the empty string, skipping every other check.
    pub fn or_empty(mut self) -> Self {
        self.or_empty = true;
        self
    }

    pub fn optional(self) -> Rule {
        Rule::from(self).optional()
    }

    pub fn nullable(self) -> Rule {
        Rule::from(self).nullable()
    }

    fn check(
        &self,
        value: &Value,
        path: &[PathSegment],
        issues: &mut Vec<Issue>,
    ) -> Result<Flow, SchemaError> {
        let Value::String(s) = value else {
            return Ok(mismatch("string", value, path, issues));
        };
        if self.or_empty && s.is_empty() {
            return Ok(Flow::Continue);
        }
        for check in &self.checks {
            if let Some(message) = check.failure(s)? {
                issues.push(issue_at(path, message));
            }
        }
        Ok(Flow::Continue)
    }
}

impl From<StringRule> for Rule {
    fn from(rule: StringRule) -> Self {
        Rule::of(Kind::String(rule))
    }
}

#[derive(Clone)]
enum NumberCheck {
    Int(String),
    Min(f64, String),
    Max(f64, String),
    Positive(String),
}

/// Builder for a number [`Rule`].
#[derive(Clone, Default)]
pub struct NumberRule {
    checks: Vec<NumberCheck>,
}

impl NumberRule {
    pub fn int(mut self) -> Self {
        self.checks
            .push(NumberCheck::Int("Expected integer, received float".to_string()));
        self
    }

    pub fn min(mut self, min: f64, message: &str) -> Self {
        self.checks.push(NumberCheck::Min(min, message.to_string()));
        self
    }

    pub fn max(mut self, max: f64, message: &str) -> Self {
        self.checks.push(NumberCheck::Max(max, message.to_string()));
        self
    }

    pub fn positive(mut self, message: &str) -> Self {
        self.checks.push(NumberCheck::Positive(message.to_string()));
        self
    }

    pub fn optional(self) -> Rule {
        Rule::from(self).optional()
    }

    pub fn nullable(self) -> Rule {
        Rule::from(self).nullable()
    }

    fn check(&self, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Flow {
        let Value::Number(n) = value else {
            return mismatch("number", value, path, issues);
        };
        for check in &self.checks {
            let failed = match check {
                NumberCheck::Int(message) => (n.fract() != 0.0).then_some(message),
                NumberCheck::Min(min, message) => (n < min).then_some(message),
                NumberCheck::Max(max, message) => (n > max).then_some(message),
                NumberCheck::Positive(message) => (*n <= 0.0).then_some(message),
            };
            if let Some(message) = failed {
                issues.push(issue_at(path, message.clone()));
            }
        }
        Flow::Continue
    }
}

impl From<NumberRule> for Rule {
    fn from(rule: NumberRule) -> Self {
        Rule::of(Kind::Number(rule))
    }
}

/// Field rules for a record plus whole-record refinements.
#[derive(Clone, Default)]
pub struct RecordSchema {
    fields: IndexMap<String, Rule>,
    refinements: Vec<Refinement>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field rule, replacing any existing rule for `name`.
    pub fn field(mut self, name: &str, rule: impl Into<Rule>) -> Self {
        self.fields.insert(name.to_string(), rule.into());
        self
    }

    /// Add a whole-record check. It runs only when every field had the
    /// expected type; a returned issue's path is relative to this record.
    pub fn refine<F>(mut self, refinement: F) -> Self
    where
        F: Fn(&Record) -> Option<Issue> + Send + Sync + 'static,
    {
        self.refinements.push(Arc::new(refinement));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.fields.get(name)
    }

    fn check_record(
        &self,
        record: &Record,
        path: &[PathSegment],
        issues: &mut Vec<Issue>,
    ) -> Result<Flow, SchemaError> {
        let mut flow = Flow::Continue;
        for (name, rule) in &self.fields {
            let field_path = child(path, PathSegment::Key(name.clone()));
            if rule.check(record.get(name), &field_path, issues)? == Flow::Aborted {
                flow = Flow::Aborted;
            }
        }
        if flow == Flow::Continue {
            for refinement in &self.refinements {
                if let Some(issue) = refinement(record) {
                    let mut full = path.to_vec();
                    full.extend(issue.path);
                    issues.push(Issue {
                        path: full,
                        message: issue.message,
                    });
                }
            }
        }
        Ok(flow)
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

impl Schema for RecordSchema {
    fn validate(&self, record: &Value) -> Result<Validation, SchemaError> {
        let mut issues = Vec::new();
        match record {
            Value::Record(fields) => {
                self.check_record(fields, &[], &mut issues)?;
            }
            other => issues.push(Issue::form(format!(
                "Expected object, received {}",
                other.kind()
            ))),
        }
        trace!(issues = issues.len(), "record validated");
        Ok(Validation::from_issues(issues))
    }
}

/// Refinement reporting `message` on `confirmation` when it differs from
/// `field`.
pub fn fields_match(
    field: &str,
    confirmation: &str,
    message: &str,
) -> impl Fn(&Record) -> Option<Issue> + Send + Sync + 'static {
    let field = field.to_string();
    let confirmation = confirmation.to_string();
    let message = message.to_string();
    move |record: &Record| {
        (record.get(&field) != record.get(&confirmation))
            .then(|| Issue::at(&confirmation, message.clone()))
    }
}

fn check_date(value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Flow {
    match value {
        Value::Date(_) => Flow::Continue,
        Value::String(s) => {
            let valid = s.ends_with('Z') && DateTime::parse_from_rfc3339(s).is_ok();
            if !valid {
                issues.push(issue_at(path, "Invalid datetime"));
            }
            Flow::Continue
        }
        other => mismatch("string", other, path, issues),
    }
}

fn mismatch(expected: &str, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Flow {
    issues.push(issue_at(
        path,
        format!("Expected {expected}, received {}", value.kind()),
    ));
    Flow::Aborted
}

fn issue_at(path: &[PathSegment], message: impl Into<String>) -> Issue {
    Issue::new(path.iter().cloned(), message)
}

fn child(path: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut next = path.to_vec();
    next.push(segment);
    next
}
