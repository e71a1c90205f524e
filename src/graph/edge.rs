//! Directed, typed edge implementation for the property graph.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, NodeId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A directed edge between two nodes.
///
/// Edges carry an update timestamp because some relationship types (ratings)
/// are mutated in place rather than recreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,

    /// The edge goes FROM this node.
    pub source: NodeId,

    /// The edge goes TO this node.
    pub target: NodeId,

    /// Relationship type ("RATED", "SIMILAR_TO", "BELONGS_TO").
    pub edge_type: EdgeType,

    /// Properties associated with this edge.
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds).
    pub updated_at: i64,
}

impl Edge {
    /// Create a new edge with no properties.
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> Self {
        Self::with_properties(id, source, target, edge_type, PropertyMap::new())
    }

    /// Create a new edge with initial properties.
    pub fn with_properties(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a property value and bump the update timestamp.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
        self.updated_at = Utc::now().timestamp_millis();
    }

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Get an integer property.
    pub fn integer_property(&self, key: &str) -> Option<i64> {
        self.get_property(key).and_then(|v| v.as_integer())
    }

    /// Get a float property.
    pub fn float_property(&self, key: &str) -> Option<f64> {
        self.get_property(key).and_then(|v| v.as_float())
    }

    /// Get a string property.
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.get_property(key).and_then(|v| v.as_str())
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}
