//! Schema types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON Schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// The type a JSON value has as-is, without coercion
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// JSON type can be a single type or array of types (for nullable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Create a single type
    pub fn single(t: JsonType) -> Self {
        JsonTypeOrArray::Single(t)
    }

    /// Create a nullable type
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![t, JsonType::Null])
        }
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(JsonType::Null) => true,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
            _ => false,
        }
    }

    /// Get the primary (non-null) type
    pub fn primary_type(&self) -> Option<JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(*t),
            JsonTypeOrArray::Multiple(types) => {
                types.iter().copied().find(|t| *t != JsonType::Null)
            }
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// Format hint (only "date-time" is interpreted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a new property with the given type
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::single(json_type),
            format: None,
            properties: None,
            items: None,
        }
    }

    /// Create a nullable property
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            ..Self::new(json_type)
        }
    }

    /// Create a nullable object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::nullable(JsonType::Object)
        }
    }

    /// Create a nullable array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::nullable(JsonType::Array)
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Check if nullable
    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }

    /// Check if this property carries an RFC 3339 timestamp
    pub fn is_date_time(&self) -> bool {
        self.format.as_deref() == Some("date-time")
    }
}

/// Full JSON Schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Schema description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Allow additional properties
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// Create a new empty, closed schema
    pub fn new() -> Self {
        Self {
            json_type: JsonType::Object,
            description: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional_properties: false,
        }
    }

    /// Set the schema description
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add a property
    pub fn add_property(&mut self, name: &str, property: SchemaProperty) {
        self.properties.insert(name.to_string(), property);
    }

    /// Add a required property
    pub fn add_required(&mut self, name: &str) {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
