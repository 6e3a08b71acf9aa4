//! Validation schemas for data entering and leaving the store.
//!
//! # Responsibility
//! - Turn untyped JSON payloads into typed values or a list of issues.
//! - Parse batches of stored records all-or-nothing.
//!
//! # Invariants
//! - Rejection is reported as data (`Err(issues)`), never as a panic.
//! - A rejected payload reports every issue the schema found.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// Human-readable reasons a payload was rejected.
pub type Issues = Vec<String>;

/// Parses an untyped payload into a typed value.
pub trait Schema: Send + Sync {
    type Output;

    fn parse(&self, input: &Value) -> Result<Self::Output, Issues>;
}

/// Parses every payload of a batch, failing the whole batch on any rejection.
///
/// Issues from different rows are aggregated and prefixed with the row index.
pub fn parse_batch<S: Schema>(schema: &S, inputs: &[Value]) -> Result<Vec<S::Output>, Issues> {
    let mut parsed = Vec::with_capacity(inputs.len());
    let mut issues = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        match schema.parse(input) {
            Ok(value) => parsed.push(value),
            Err(row_issues) => issues.extend(
                row_issues
                    .into_iter()
                    .map(|issue| format!("[{index}] {issue}")),
            ),
        }
    }

    if issues.is_empty() {
        Ok(parsed)
    } else {
        Err(issues)
    }
}

type Rule<T> = Box<dyn Fn(&T) -> Issues + Send + Sync>;
type FieldCheck = Box<dyn Fn(&Map<String, Value>) -> Issues + Send + Sync>;

/// Schema backed by serde deserialization plus field checks and rules.
///
/// Declared fields are deserialized one at a time so that a payload with
/// several bad fields reports each of them. Whole-value rules run once the
/// payload deserializes into `T`.
pub struct SerdeSchema<T> {
    fields: Vec<FieldCheck>,
    rules: Vec<Rule<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            rules: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares a required field that must deserialize as `F`.
    pub fn field<F: DeserializeOwned + 'static>(self, name: &'static str) -> Self {
        self.field_with(name, |_: &F| Vec::new())
    }

    /// Declares a required field and a rule checked against its value.
    pub fn field_with<F: DeserializeOwned + 'static>(
        mut self,
        name: &'static str,
        rule: impl Fn(&F) -> Issues + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(Box::new(move |object: &Map<String, Value>| match object.get(name) {
            None => vec![format!("missing field `{name}`")],
            Some(value) => check_value(name, value, &rule),
        }));
        self
    }

    /// Declares a field that may be absent or null.
    pub fn optional<F: DeserializeOwned + 'static>(self, name: &'static str) -> Self {
        self.optional_with(name, |_: &F| Vec::new())
    }

    /// Declares an optional field; `rule` runs only when a value is present.
    pub fn optional_with<F: DeserializeOwned + 'static>(
        mut self,
        name: &'static str,
        rule: impl Fn(&F) -> Issues + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(Box::new(move |object: &Map<String, Value>| match object.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => check_value(name, value, &rule),
        }));
        self
    }

    /// Adds a rule returning zero or more issues for a deserialized value.
    pub fn with_rule(mut self, rule: impl Fn(&T) -> Issues + Send + Sync + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }
}

fn check_value<F: DeserializeOwned + 'static>(
    name: &str,
    value: &Value,
    rule: &impl Fn(&F) -> Issues,
) -> Issues {
    match F::deserialize(value) {
        Ok(parsed) => rule(&parsed),
        Err(err) => vec![format!("{name}: {err}")],
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSchema")
            .field("type", &std::any::type_name::<T>())
            .field("fields", &self.fields.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<T: DeserializeOwned> Schema for SerdeSchema<T> {
    type Output = T;

    fn parse(&self, input: &Value) -> Result<T, Issues> {
        let Value::Object(object) = input else {
            return Err(vec![format!("expected an object, got {}", json_kind(input))]);
        };

        let mut issues: Issues = self.fields.iter().flat_map(|check| check(object)).collect();
        match T::deserialize(input) {
            Ok(value) => {
                issues.extend(self.rules.iter().flat_map(|rule| rule(&value)));
                if issues.is_empty() {
                    return Ok(value);
                }
            }
            // Declared fields already explain the failure.
            Err(err) if issues.is_empty() => issues.push(err.to_string()),
            Err(_) => {}
        }
        Err(issues)
    }
}

/// Schema backed by a plain parsing function.
pub struct FnSchema<T, F> {
    parse: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnSchema<T, F>
where
    F: Fn(&Value) -> Result<T, Issues> + Send + Sync,
{
    pub fn new(parse: F) -> Self {
        Self {
            parse,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Schema for FnSchema<T, F>
where
    F: Fn(&Value) -> Result<T, Issues> + Send + Sync,
{
    type Output = T;

    fn parse(&self, input: &Value) -> Result<T, Issues> {
        (self.parse)(input)
    }
}

/// Rule helper: rejects an empty string field.
pub fn non_empty(field: &str, value: &str) -> Issues {
    if value.is_empty() {
        vec![format!("{field} must not be empty")]
    } else {
        Vec::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
