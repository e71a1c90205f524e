//! Node implementation for the property graph.

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A labeled node with properties and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,

    /// The node's label ("User", "Book", "Genre").
    pub label: Label,

    /// Properties associated with this node.
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds).
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with no properties.
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        Self::with_properties(id, label, PropertyMap::new())
    }

    /// Create a new node with initial properties.
    pub fn with_properties(id: NodeId, label: impl Into<Label>, properties: PropertyMap) -> Self {
        let now = Utc::now().timestamp_millis();
        Node {
            id,
            label: label.into(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a property value, returning the previous value if any.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let old = self.properties.insert(key.into(), value.into());
        self.updated_at = Utc::now().timestamp_millis();
        old
    }

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if a property exists.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Get a string property, treating missing and non-string values alike.
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.get_property(key).and_then(|v| v.as_str())
    }

    /// Get an integer property.
    pub fn integer_property(&self, key: &str) -> Option<i64> {
        self.get_property(key).and_then(|v| v.as_integer())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}
