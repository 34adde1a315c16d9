//! Decoder implementations

use super::types::{Page, PageDecoder};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde_json::Value;

const RECORDS_KEY: &str = "results";
const NEXT_KEY: &str = "next";

/// JSON list-response decoder
///
/// Shippo list endpoints answer with
/// `{"next": <url|null>, "previous": .., "results": [ {..}, .. ]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageDecoder;

impl JsonPageDecoder {
    fn extract_next(body: &Value) -> Result<Option<String>> {
        match body.get(NEXT_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone()).none_if_empty()),
            Some(other) => Err(Error::decode(format!(
                "'{NEXT_KEY}' must be a string or null, got {}",
                type_name(other)
            ))),
        }
    }
}

impl PageDecoder for JsonPageDecoder {
    fn decode(&self, body: &Value) -> Result<Page> {
        if !body.is_object() {
            return Err(Error::decode(format!(
                "response body must be an object, got {}",
                type_name(body)
            )));
        }

        let items = match body.get(RECORDS_KEY) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::decode(format!(
                    "'{RECORDS_KEY}' must be an array, got {}",
                    type_name(other)
                )))
            }
            None => {
                return Err(Error::decode(format!(
                    "response has no '{RECORDS_KEY}' array"
                )))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::Object(map) => records.push(map.clone()),
                other => {
                    return Err(Error::decode(format!(
                        "record {index} in '{RECORDS_KEY}' must be an object, got {}",
                        type_name(other)
                    )))
                }
            }
        }

        Ok(Page {
            records,
            next: Self::extract_next(body)?,
        })
    }
}

/// JSON type name for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
