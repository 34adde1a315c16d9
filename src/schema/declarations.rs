//! Hand-maintained record shapes for the Shippo collections
//!
//! Field lists follow the Shippo object reference. `object_id` is the only
//! required field; everything else may be absent or null.

use super::types::{JsonSchema, JsonType, SchemaProperty};
use crate::catalog::EntityKind;
use std::collections::BTreeMap;

/// Text stored in every schema's `description`
pub const COERCION_POLICY: &str = "Fields not listed here are dropped. \
Numbers and booleans declared as string are stringified. Numeric strings \
declared as number or integer are parsed. \"true\"/\"false\" declared as \
boolean are parsed. date-time values are normalised to RFC 3339 UTC. \
Nested objects and arrays are checked at the top level only.";

#[derive(Clone, Copy)]
enum Field {
    Text,
    Timestamp,
    Flag,
    Object,
    List,
    Messages,
}

use Field::{Flag, List, Messages, Object, Text, Timestamp};

const ADDRESS: &[(&str, Field)] = &[
    ("object_state", Text),
    ("object_purpose", Text),
    ("object_source", Text),
    ("object_created", Timestamp),
    ("object_updated", Timestamp),
    ("object_owner", Text),
    ("name", Text),
    ("company", Text),
    ("street1", Text),
    ("street2", Text),
    ("city", Text),
    ("state", Text),
    ("zip", Text),
    ("country", Text),
    ("phone", Text),
    ("email", Text),
    ("is_residential", Flag),
    ("metadata", Text),
    ("test", Flag),
    ("messages", Messages),
];

const PARCEL: &[(&str, Field)] = &[
    ("object_state", Text),
    ("object_created", Timestamp),
    ("object_updated", Timestamp),
    ("object_owner", Text),
    ("template", Text),
    ("length", Text),
    ("width", Text),
    ("height", Text),
    ("distance_unit", Text),
    ("weight", Text),
    ("mass_unit", Text),
    ("metadata", Text),
    ("extra", Object),
    ("test", Flag),
];

const SHIPMENT: &[(&str, Field)] = &[
    ("object_state", Text),
    ("object_status", Text),
    ("object_purpose", Text),
    ("object_created", Timestamp),
    ("object_updated", Timestamp),
    ("object_owner", Text),
    ("object_from", Text),
    ("object_to", Text),
    ("object_return", Text),
    ("object_parcel", Text),
    ("submission_date", Timestamp),
    ("insurance_amount", Text),
    ("insurance_currency", Text),
    ("extra", Object),
    ("customs_declaration", Text),
    ("reference1", Text),
    ("reference2", Text),
    ("rates_url", Text),
    ("rates_list", List),
    ("carrier_accounts", List),
    ("metadata", Text),
    ("test", Flag),
    ("messages", Messages),
];

const TRANSACTION: &[(&str, Field)] = &[
    ("object_state", Text),
    ("object_status", Text),
    ("object_created", Timestamp),
    ("object_updated", Timestamp),
    ("object_owner", Text),
    ("test", Flag),
    ("rate", Text),
    ("tracking_number", Text),
    ("tracking_status", Object),
    ("tracking_history", List),
    ("tracking_url_provider", Text),
    ("label_url", Text),
    ("commercial_invoice_url", Text),
    ("metadata", Text),
    ("messages", Messages),
];

const REFUND: &[(&str, Field)] = &[
    ("object_status", Text),
    ("object_created", Timestamp),
    ("object_updated", Timestamp),
    ("object_owner", Text),
    ("transaction", Text),
    ("test", Flag),
];

/// Build the fixed schema for an entity
pub fn declaration(kind: EntityKind) -> JsonSchema {
    let fields = match kind {
        EntityKind::Addresses => ADDRESS,
        EntityKind::Parcels => PARCEL,
        EntityKind::Shipments => SHIPMENT,
        EntityKind::Transactions => TRANSACTION,
        EntityKind::Refunds => REFUND,
    };

    let mut schema = JsonSchema::new().with_description(COERCION_POLICY);
    schema.add_property("object_id", SchemaProperty::new(JsonType::String));
    schema.add_required("object_id");

    for (name, field) in fields {
        schema.add_property(name, property(*field));
    }
    schema
}

fn property(field: Field) -> SchemaProperty {
    match field {
        Text => SchemaProperty::nullable(JsonType::String),
        Timestamp => SchemaProperty::nullable(JsonType::String).with_format("date-time"),
        Flag => SchemaProperty::nullable(JsonType::Boolean),
        Object => SchemaProperty::nullable(JsonType::Object),
        List => SchemaProperty::nullable(JsonType::Array),
        Messages => {
            let item: BTreeMap<String, SchemaProperty> = ["code", "source", "text"]
                .into_iter()
                .map(|name| (name.to_string(), SchemaProperty::nullable(JsonType::String)))
                .collect();
            SchemaProperty::array(SchemaProperty::object(item))
        }
    }
}
