//! Edge implementation for the property graph
//!
//! Edges are directed, labeled, and may carry properties. Several edges may
//! connect the same pair of vertices, even with the same label.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source vertex (edge goes FROM this vertex)
    pub source: VertexId,

    /// Target vertex (edge goes TO this vertex)
    pub target: VertexId,

    /// Edge label
    pub label: String,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(id: EdgeId, source: VertexId, target: VertexId, label: impl Into<String>) -> Self {
        Edge {
            id,
            source,
            target,
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Create a new edge with properties
    pub fn new_with_properties(
        id: EdgeId,
        source: VertexId,
        target: VertexId,
        label: impl Into<String>,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            label: label.into(),
            properties,
        }
    }

    /// Set a property value, returning the previous one
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Check if this edge goes FROM a specific vertex
    pub fn starts_from(&self, vertex: VertexId) -> bool {
        self.source == vertex
    }

    /// Check if this edge goes TO a specific vertex
    pub fn ends_at(&self, vertex: VertexId) -> bool {
        self.target == vertex
    }

    /// Check whether a vertex is one of the endpoints
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.source == vertex || self.target == vertex
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
