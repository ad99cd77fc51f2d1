//! Priority lookup of a semantic field across the column names used by
//! different survey export schemas.

use serde_json::{Map, Value};

use crate::types::RawSurveyRecord;

/// Anything that can answer "what is stored under this column name".
pub trait FieldLookup {
    fn lookup(&self, key: &str) -> Option<&Value>;
}

impl FieldLookup for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl FieldLookup for RawSurveyRecord {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Return the first candidate value that is present and, when textual,
/// not blank. Text is returned trimmed; numbers and booleans are returned
/// as-is. Falls back to `default` when no candidate matches.
pub fn first_non_empty<R>(record: &R, candidates: &[&str], default: Value) -> Value
where
    R: FieldLookup + ?Sized,
{
    for key in candidates {
        match record.lookup(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) => {
                let cleaned = text.trim();
                if !cleaned.is_empty() {
                    return Value::String(cleaned.to_string());
                }
            }
            Some(other) => return other.clone(),
        }
    }
    default
}

/// Text form of [`first_non_empty`]; an unmatched lookup yields an empty string.
pub fn first_non_empty_text<R>(record: &R, candidates: &[&str]) -> String
where
    R: FieldLookup + ?Sized,
{
    match first_non_empty(record, candidates, Value::Null) {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Trimmed text of a value; numbers and booleans are rendered, null is `None`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Numeric reading of a value. Blank or unparseable text is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// True when the field holds one of the accepted answers, compared case-insensitively.
pub fn is_affirmative<R>(record: &R, column: &str, accepted: &[&str]) -> bool
where
    R: FieldLookup + ?Sized,
{
    record
        .lookup(column)
        .and_then(value_text)
        .map(|answer| {
            let answer = answer.to_lowercase();
            accepted.iter().any(|a| *a == answer)
        })
        .unwrap_or(false)
}
