//! Built-in entity catalog
//!
//! The five collections the Shippo API exposes for extraction, with their
//! endpoint paths and primary keys. The order of [`ENTITIES`] is the order
//! in which a sync visits them.

use crate::types::ReplicationMethod;
use serde::Serialize;
use std::fmt;
use url::Url;

/// One of the supported remote collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Addresses,
    Parcels,
    Shipments,
    Transactions,
    Refunds,
}

impl EntityKind {
    /// Stream name used in messages and state keys
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Addresses => "addresses",
            EntityKind::Parcels => "parcels",
            EntityKind::Shipments => "shipments",
            EntityKind::Transactions => "transactions",
            EntityKind::Refunds => "refunds",
        }
    }

    /// Look up an entity by stream name
    pub fn from_name(name: &str) -> Option<Self> {
        ENTITIES
            .iter()
            .map(|d| d.kind)
            .find(|kind| kind.name() == name)
    }

    /// Determine which collection a Shippo URL points at
    ///
    /// `https://api.goshippo.com/addresses?results=1000&page=2` → `Addresses`.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let found = parsed.path_segments()?.find_map(Self::from_name);
        found
    }

    /// Whether a state key belongs to one of the supported entities
    pub fn is_known(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static extraction metadata for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Which collection this is
    pub kind: EntityKind,
    /// Endpoint path relative to the API base URL
    pub path: &'static str,
    /// Primary-key fields
    pub key_properties: &'static [&'static str],
    /// Replication behaviour
    pub replication: ReplicationMethod,
}

impl EntityDescriptor {
    /// Stream name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

const OBJECT_ID: &[&str] = &["object_id"];

/// All supported entities, in sync order
pub const ENTITIES: [EntityDescriptor; 5] = [
    EntityDescriptor {
        kind: EntityKind::Addresses,
        path: "addresses/",
        key_properties: OBJECT_ID,
        replication: ReplicationMethod::FullTable,
    },
    EntityDescriptor {
        kind: EntityKind::Parcels,
        path: "parcels/",
        key_properties: OBJECT_ID,
        replication: ReplicationMethod::FullTable,
    },
    EntityDescriptor {
        kind: EntityKind::Shipments,
        path: "shipments/",
        key_properties: OBJECT_ID,
        replication: ReplicationMethod::FullTable,
    },
    EntityDescriptor {
        kind: EntityKind::Transactions,
        path: "transactions/",
        key_properties: OBJECT_ID,
        replication: ReplicationMethod::FullTable,
    },
    EntityDescriptor {
        kind: EntityKind::Refunds,
        path: "refunds/",
        key_properties: OBJECT_ID,
        replication: ReplicationMethod::FullTable,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_are_unique_and_ordered() {
        let names: Vec<_> = ENTITIES.iter().map(EntityDescriptor::name).collect();
        assert_eq!(
            names,
            vec!["addresses", "parcels", "shipments", "transactions", "refunds"]
        );
    }

    #[test]
    fn test_all_entities_full_table_with_object_id() {
        for descriptor in &ENTITIES {
            assert_eq!(descriptor.replication, ReplicationMethod::FullTable);
            assert_eq!(descriptor.key_properties, &["object_id"]);
            assert!(descriptor.path.starts_with(descriptor.name()));
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(EntityKind::from_name("refunds"), Some(EntityKind::Refunds));
        assert_eq!(EntityKind::from_name("customs"), None);
        assert!(EntityKind::is_known("parcels"));
        assert!(!EntityKind::is_known("next"));
    }

    #[test]
    fn test_from_url() {
        let url = "https://api.goshippo.com/addresses?results=1000&page=2";
        assert_eq!(EntityKind::from_url(url), Some(EntityKind::Addresses));

        let url = "https://api.goshippo.com/shipments/?page=3";
        assert_eq!(EntityKind::from_url(url), Some(EntityKind::Shipments));
    }

    #[test]
    fn test_from_url_fails() {
        assert_eq!(EntityKind::from_url("foobar"), None);
        assert_eq!(EntityKind::from_url("https://api.goshippo.com/"), None);
        assert_eq!(EntityKind::from_url("https://api.goshippo.com/orders"), None);
    }

    #[test]
    fn test_from_url_with_path_prefix() {
        let url = "http://127.0.0.1:4010/v1/transactions/?page=2";
        assert_eq!(EntityKind::from_url(url), Some(EntityKind::Transactions));
        assert_eq!(EntityKind::Transactions.to_string(), "transactions");
    }
}
