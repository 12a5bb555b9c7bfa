//! The graph interface a quad store is built on
//!
//! Any key-indexable property graph can host a quad store by implementing
//! [`KeyIndexableGraph`]. [`GraphStore`](super::GraphStore) is the bundled
//! in-memory implementation.

use super::edge::Edge;
use super::property::PropertyValue;
use super::store::GraphResult;
use super::types::{EdgeId, ElementKind, VertexId};
use super::vertex::Vertex;

/// Capabilities a backend advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphFeatures {
    /// Several edges may share source, target and label
    pub supports_duplicate_edges: bool,
    /// `commit`/`rollback` are meaningful; otherwise both are no-ops
    pub supports_transactions: bool,
}

/// A property graph with key indices and transactions
///
/// Mutations become visible immediately to readers of the same graph;
/// `commit` makes them durable and `rollback` undoes everything since the
/// last commit.
pub trait KeyIndexableGraph: Send + Sync {
    fn features(&self) -> GraphFeatures;

    fn add_vertex(&mut self) -> GraphResult<VertexId>;

    fn vertex(&self, id: VertexId) -> Option<&Vertex>;

    /// Remove a vertex and every edge incident to it
    fn remove_vertex(&mut self, id: VertexId) -> GraphResult<Vertex>;

    fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>>;

    fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>>;

    fn add_edge(&mut self, source: VertexId, target: VertexId, label: &str) -> GraphResult<EdgeId>;

    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge>;

    fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>>;

    fn remove_edge_property(&mut self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>>;

    /// Edges leaving a vertex
    fn out_edges(&self, id: VertexId) -> Vec<EdgeId>;

    /// Edges entering a vertex
    fn in_edges(&self, id: VertexId) -> Vec<EdgeId>;

    /// Edges carrying `label`; backends without a label index scan
    fn edges_with_label(&self, label: &str) -> Vec<EdgeId> {
        self.edge_ids()
            .into_iter()
            .filter(|&id| self.edge(id).map_or(false, |e| e.label == label))
            .collect()
    }

    fn vertex_ids(&self) -> Vec<VertexId>;

    fn edge_ids(&self) -> Vec<EdgeId>;

    fn vertex_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Create a key index and index existing elements; a no-op if it exists
    fn create_key_index(&mut self, key: &str, kind: ElementKind) -> GraphResult<()>;

    fn has_key_index(&self, key: &str, kind: ElementKind) -> bool;

    /// Vertices whose `key` property equals `value` (scans when unindexed)
    fn vertices_by_key(&self, key: &str, value: &PropertyValue) -> Vec<VertexId>;

    /// Edges whose `key` property equals `value` (scans when unindexed)
    fn edges_by_key(&self, key: &str, value: &PropertyValue) -> Vec<EdgeId>;

    fn commit(&mut self) -> GraphResult<()>;

    fn rollback(&mut self) -> GraphResult<()>;
}
