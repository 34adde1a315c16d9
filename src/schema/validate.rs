//! Record validation and coercion

use super::types::{JsonSchema, JsonType, SchemaProperty};
use crate::catalog::EntityKind;
use crate::error::{Error, Result};
use crate::types::{JsonObject, RawRecord};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use tracing::trace;

/// A record that conforms to its entity's schema
///
/// Only [`validate`] constructs one, so holding a `ValidatedRecord` means the
/// fields have been checked and coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    entity: EntityKind,
    fields: JsonObject,
}

impl ValidatedRecord {
    /// Entity this record belongs to
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Validated fields
    pub fn fields(&self) -> &JsonObject {
        &self.fields
    }

    /// Take the validated fields
    pub fn into_inner(self) -> JsonObject {
        self.fields
    }
}

/// Validate a raw record against a schema, coercing compatible values
pub fn validate(schema: &JsonSchema, entity: EntityKind, raw: RawRecord) -> Result<ValidatedRecord> {
    let mut fields = JsonObject::new();

    for (name, value) in raw {
        let Some(property) = schema.get_property(&name) else {
            trace!(entity = %entity, field = %name, "Dropping undeclared field");
            continue;
        };
        let value = coerce(property, value)
            .map_err(|message| Error::schema_violation(entity.name(), &name, message))?;
        fields.insert(name, value);
    }

    for name in &schema.required {
        match fields.get(name) {
            None => {
                return Err(Error::schema_violation(
                    entity.name(),
                    name,
                    "required field is missing",
                ))
            }
            Some(Value::Null) => {
                return Err(Error::schema_violation(
                    entity.name(),
                    name,
                    "required field is null",
                ))
            }
            Some(_) => {}
        }
    }

    Ok(ValidatedRecord { entity, fields })
}

fn coerce(property: &SchemaProperty, value: Value) -> std::result::Result<Value, String> {
    if value.is_null() {
        return if property.is_nullable() {
            Ok(Value::Null)
        } else {
            Err("null is not allowed".to_string())
        };
    }

    let Some(expected) = property.json_type.primary_type() else {
        return Err(format!("expected null, got {}", JsonType::of(&value)));
    };

    let mismatch = |value: &Value| format!("expected {expected}, got {}", JsonType::of(value));

    match (expected, value) {
        (JsonType::String, Value::String(s)) if property.is_date_time() => {
            normalize_timestamp(&s).map(Value::String)
        }
        (JsonType::String, Value::String(s)) => Ok(Value::String(s)),
        (JsonType::String, Value::Number(n)) if !property.is_date_time() => {
            Ok(Value::String(n.to_string()))
        }
        (JsonType::String, Value::Bool(b)) if !property.is_date_time() => {
            Ok(Value::String(b.to_string()))
        }

        (JsonType::Number, Value::Number(n)) => Ok(Value::Number(n)),
        (JsonType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{s}' is not a number")),

        (JsonType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        (JsonType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| format!("'{s}' is not an integer")),

        (JsonType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (JsonType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },

        (JsonType::Object, v @ Value::Object(_)) => Ok(v),
        (JsonType::Array, v @ Value::Array(_)) => Ok(v),

        (_, other) => Err(mismatch(&other)),
    }
}

/// Normalise a timestamp to RFC 3339 in UTC
///
/// Offset-less timestamps are read as UTC.
fn normalize_timestamp(raw: &str) -> std::result::Result<String, String> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .map_err(|_| format!("'{raw}' is not a date-time"))?;

    Ok(parsed.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
