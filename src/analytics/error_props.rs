//! Normalization of arbitrary error values into exception descriptions.

use serde_json::{Map, Number, Value};

/// An error-like value reported through `send_error`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportedError(Value);

impl ReportedError {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Captures the display text of `err` as `message` and of its source, if any, as `error`.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut fields = Map::new();
        fields.insert("message".into(), Value::String(err.to_string()));
        if let Some(source) = err.source() {
            fields.insert("error".into(), Value::String(source.to_string()));
        }
        Self(Value::Object(fields))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ReportedError {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for ReportedError {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for ReportedError {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for ReportedError {
    fn from(value: i64) -> Self {
        Self(Value::Number(value.into()))
    }
}

impl From<i32> for ReportedError {
    fn from(value: i32) -> Self {
        Self(Value::Number(value.into()))
    }
}

impl From<f64> for ReportedError {
    fn from(value: f64) -> Self {
        Self(Number::from_f64(value).map_or(Value::Null, Value::Number))
    }
}

/// Extracts `message`, `code`, `error`, `name` and `stack` from `error`.
///
/// Field checks run after the string/number checks, so a `code` field replaces a numeric code.
pub fn normalize(error: &ReportedError) -> Map<String, Value> {
    let mut props = Map::new();
    let value = error.value();

    match value {
        Value::String(text) if !text.is_empty() => {
            props.insert("message".into(), value.clone());
        }
        Value::Number(_) => {
            props.insert("code".into(), value.clone());
        }
        _ => {}
    }

    if let Value::Object(fields) = value {
        if let Some(message) = fields.get("message").filter(|v| is_truthy(v)) {
            props.insert("message".into(), message.clone());
        }
        if let Some(inner) = fields.get("error").filter(|v| !v.is_null()) {
            props.insert("error".into(), inner.clone());
        }
        if let Some(code) = fields.get("code").filter(|v| !v.is_null()) {
            props.insert("code".into(), code.clone());
        }
        if let Some(name) = fields.get("name").filter(|v| is_truthy(v)) {
            props.insert("name".into(), name.clone());
        }
        if let Some(stack) = fields.get("stack").filter(|v| is_truthy(v)) {
            props.insert("stack".into(), stack.clone());
        }
    }

    props
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
