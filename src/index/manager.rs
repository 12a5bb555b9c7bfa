//! Manager for key indices
//!
//! Handles creation and maintenance of the per-key indices a graph keeps
//! over its vertices and edges.

use super::property_index::PropertyIndex;
use crate::graph::{EdgeId, ElementKind, PropertyValue, VertexId};
use rustc_hash::FxHashMap;

/// Manager for all key indices of a graph
#[derive(Debug, Default)]
pub struct IndexManager {
    vertex_indices: FxHashMap<String, PropertyIndex<VertexId>>,
    edge_indices: FxHashMap<String, PropertyIndex<EdgeId>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index for a key; returns false when it already existed
    pub fn create_index(&mut self, key: &str, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Vertex => {
                if self.vertex_indices.contains_key(key) {
                    return false;
                }
                self.vertex_indices.insert(key.to_string(), PropertyIndex::new());
            }
            ElementKind::Edge => {
                if self.edge_indices.contains_key(key) {
                    return false;
                }
                self.edge_indices.insert(key.to_string(), PropertyIndex::new());
            }
        }
        true
    }

    /// Drop an index
    pub fn drop_index(&mut self, key: &str, kind: ElementKind) {
        match kind {
            ElementKind::Vertex => {
                self.vertex_indices.remove(key);
            }
            ElementKind::Edge => {
                self.edge_indices.remove(key);
            }
        }
    }

    /// Check if an index exists
    pub fn has_index(&self, key: &str, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Vertex => self.vertex_indices.contains_key(key),
            ElementKind::Edge => self.edge_indices.contains_key(key),
        }
    }

    /// Keys indexed for an element class
    pub fn indexed_keys(&self, kind: ElementKind) -> Vec<String> {
        match kind {
            ElementKind::Vertex => self.vertex_indices.keys().cloned().collect(),
            ElementKind::Edge => self.edge_indices.keys().cloned().collect(),
        }
    }

    /// Update index when a vertex property is set
    pub fn vertex_insert(&mut self, key: &str, value: PropertyValue, id: VertexId) {
        if let Some(index) = self.vertex_indices.get_mut(key) {
            index.insert(value, id);
        }
    }

    /// Update index when a vertex property is removed (or old value replaced)
    pub fn vertex_remove(&mut self, key: &str, value: &PropertyValue, id: VertexId) {
        if let Some(index) = self.vertex_indices.get_mut(key) {
            index.remove(value, id);
        }
    }

    pub fn edge_insert(&mut self, key: &str, value: PropertyValue, id: EdgeId) {
        if let Some(index) = self.edge_indices.get_mut(key) {
            index.insert(value, id);
        }
    }

    pub fn edge_remove(&mut self, key: &str, value: &PropertyValue, id: EdgeId) {
        if let Some(index) = self.edge_indices.get_mut(key) {
            index.remove(value, id);
        }
    }

    /// Look up vertices; `None` when the key is not indexed
    pub fn vertices(&self, key: &str, value: &PropertyValue) -> Option<Vec<VertexId>> {
        self.vertex_indices.get(key).map(|index| index.get(value))
    }

    /// Look up edges; `None` when the key is not indexed
    pub fn edges(&self, key: &str, value: &PropertyValue) -> Option<Vec<EdgeId>> {
        self.edge_indices.get(key).map(|index| index.get(value))
    }

    /// Empty every index but keep the set of indexed keys
    pub fn clear_entries(&mut self) {
        self.vertex_indices.values_mut().for_each(PropertyIndex::clear);
        self.edge_indices.values_mut().for_each(PropertyIndex::clear);
    }
}
