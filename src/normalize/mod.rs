//! Schema-directed value normalization
//!
//! The upstream API has inconsistent typing: it overloads boolean `false` as
//! "absent" for non-boolean fields, returns numbers as strings, and emits
//! boolean placeholders where integers are expected. Records are rewritten
//! in place against the stream's declared schema before being yielded.
//!
//! Normalization is idempotent: applying it twice is a no-op. It performs no
//! I/O and never mutates the schema, so it can be tested with static
//! fixtures.

use crate::schema::{SchemaNode, SchemaType};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Normalize a raw record (or any value tree) against a schema node.
///
/// Keys absent from the schema pass through verbatim, for forward
/// compatibility with API fields not yet modeled.
pub fn normalize(value: &mut Value, schema: &SchemaNode) {
    match value {
        Value::Array(items) => {
            if let Some(element) = schema.element() {
                for item in items.iter_mut() {
                    // Composite elements are normalized against the element
                    // sub-schema; scalars pass through at this level.
                    if item.is_object() || item.is_array() {
                        normalize(item, element);
                    }
                }
            }
        }
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if let Some(field_schema) = schema.property(key) {
                    normalize_field(field, field_schema);
                }
            }
        }
        _ => {}
    }
}

/// Normalize a single field value against its declared schema
fn normalize_field(value: &mut Value, schema: &SchemaNode) {
    match value {
        Value::Null => {}
        Value::Object(_) | Value::Array(_) => normalize(value, schema),
        _ => coerce_scalar(value, schema.kind),
    }
}

/// Apply the scalar coercion rules for one declared type
fn coerce_scalar(value: &mut Value, kind: SchemaType) {
    // The API uses `false` as an "absent" marker for non-boolean fields.
    if kind != SchemaType::Boolean && *value == Value::Bool(false) {
        *value = Value::Null;
        return;
    }

    match kind {
        SchemaType::Number => {
            if let Some(coerced) = coerce_number(value) {
                *value = coerced;
            }
        }
        SchemaType::Integer => {
            if let Some(coerced) = coerce_integer(value) {
                *value = coerced;
            }
        }
        SchemaType::DateTime => {
            if let Value::String(s) = value {
                if let Some(canonical) = parse_datetime(s) {
                    *s = canonical;
                }
            }
        }
        SchemaType::String => {
            match value {
                Value::Number(n) => *value = Value::String(n.to_string()),
                Value::Bool(b) => *value = Value::String(b.to_string()),
                _ => {}
            };
        }
        // Boolean, Object, Array, Any: no scalar coercion beyond the
        // false-to-null rule above.
        _ => {}
    }
}

/// Coerce a raw scalar to a floating-point number, where possible.
/// Returns None when the value should pass through unchanged.
fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            Some(serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number))
        }
        Value::String(s) if s.is_empty() => Some(Value::Null),
        Value::String(s) => {
            let f: f64 = s.trim().parse().ok()?;
            Some(serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number))
        }
        _ => None,
    }
}

/// Coerce a raw scalar to an integer, where possible.
///
/// Boolean placeholders under an integer declaration carry no recoverable
/// semantic and normalize to null rather than misrepresenting the value.
fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(Value::Null),
        Value::String(s) if s.is_empty() => Some(Value::Null),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Value::Number(i.into()));
            }
            let f: f64 = trimmed.parse().ok()?;
            Some(serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number))
        }
        _ => None,
    }
}

/// Parse a date-time string into canonical UTC RFC 3339.
///
/// A value that is already canonical round-trips to itself, which makes
/// normalization a no-op on the second pass. Unparseable values return None
/// and pass through unchanged.
fn parse_datetime(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        );
    }
    // Bare timestamps are taken as UTC.
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(
                naive
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests;
