//! In-memory graph storage implementation
//!
//! Arena storage for vertices and edges with adjacency lists, an edge label
//! index, key indices, and an undo journal that gives the graph
//! commit/rollback semantics.

use super::backend::{GraphFeatures, KeyIndexableGraph};
use super::edge::Edge;
use super::property::PropertyValue;
use super::types::{EdgeId, ElementKind, VertexId};
use super::vertex::Vertex;
use crate::index::IndexManager;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source vertex {0} does not exist")]
    InvalidEdgeSource(VertexId),

    #[error("Invalid edge: target vertex {0} does not exist")]
    InvalidEdgeTarget(VertexId),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// One undoable mutation
#[derive(Debug, Clone)]
enum JournalEntry {
    VertexAdded(VertexId),
    VertexRemoved(Vertex),
    VertexPropertySet {
        id: VertexId,
        key: String,
        old: Option<PropertyValue>,
    },
    EdgeAdded(EdgeId),
    EdgeRemoved(Edge),
    EdgePropertySet {
        id: EdgeId,
        key: String,
        old: Option<PropertyValue>,
    },
}

/// In-memory graph storage
///
/// - vertices: VertexId -> Vertex (arena slot, `None` once removed)
/// - edges: EdgeId -> Edge
/// - outgoing / incoming: adjacency lists per vertex
/// - label_index: edge label -> edges
/// - key_indices: property key -> value -> elements
#[derive(Debug)]
pub struct GraphStore {
    vertices: Vec<Option<Vertex>>,
    edges: Vec<Option<Edge>>,

    /// Outgoing edges for each vertex (adjacency list)
    outgoing: Vec<Vec<EdgeId>>,

    /// Incoming edges for each vertex (adjacency list)
    incoming: Vec<Vec<EdgeId>>,

    free_vertex_ids: Vec<u64>,
    free_edge_ids: Vec<u64>,

    label_index: HashMap<String, HashSet<EdgeId>>,
    key_indices: IndexManager,

    /// Mutations since the last commit, oldest first
    journal: Vec<JournalEntry>,

    live_vertices: usize,
    live_edges: usize,
    next_vertex_id: u64,
    next_edge_id: u64,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            vertices: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            free_vertex_ids: Vec::new(),
            free_edge_ids: Vec::new(),
            label_index: HashMap::new(),
            key_indices: IndexManager::new(),
            journal: Vec::new(),
            live_vertices: 0,
            live_edges: 0,
            next_vertex_id: 1,
            next_edge_id: 1,
        }
    }

    /// Number of mutations waiting for commit
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }

    /// Clear all data from the graph. Key index definitions survive.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.free_vertex_ids.clear();
        self.free_edge_ids.clear();
        self.label_index.clear();
        self.key_indices.clear_entries();
        self.journal.clear();
        self.live_vertices = 0;
        self.live_edges = 0;
        self.next_vertex_id = 1;
        self.next_edge_id = 1;
    }

    // ============================================================
    // Untracked primitives shared by mutations and rollback
    // ============================================================

    fn allocate_vertex_id(&mut self) -> VertexId {
        let id = if let Some(id) = self.free_vertex_ids.pop() {
            id
        } else {
            let id = self.next_vertex_id;
            self.next_vertex_id += 1;
            id
        };
        VertexId::new(id)
    }

    fn allocate_edge_id(&mut self) -> EdgeId {
        let id = if let Some(id) = self.free_edge_ids.pop() {
            id
        } else {
            let id = self.next_edge_id;
            self.next_edge_id += 1;
            id
        };
        EdgeId::new(id)
    }

    /// Place a vertex under its own id (new or restored)
    fn insert_vertex_raw(&mut self, vertex: Vertex) {
        let id = vertex.id.as_u64();
        let idx = id as usize;

        if idx >= self.vertices.len() {
            self.vertices.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
            self.incoming.resize(idx + 1, Vec::new());
        }
        self.free_vertex_ids.retain(|&free| free != id);
        if id >= self.next_vertex_id {
            self.next_vertex_id = id + 1;
        }

        for (key, value) in &vertex.properties {
            self.key_indices.vertex_insert(key, value.clone(), vertex.id);
        }
        self.vertices[idx] = Some(vertex);
        self.live_vertices += 1;
    }

    /// Take a vertex out of the arena; incident edges must already be gone
    fn remove_vertex_raw(&mut self, id: VertexId) -> GraphResult<Vertex> {
        let idx = id.as_u64() as usize;
        let vertex = self
            .vertices
            .get_mut(idx)
            .and_then(Option::take)
            .ok_or(GraphError::VertexNotFound(id))?;

        for (key, value) in &vertex.properties {
            self.key_indices.vertex_remove(key, value, id);
        }
        self.free_vertex_ids.push(id.as_u64());
        self.live_vertices -= 1;
        Ok(vertex)
    }

    fn insert_edge_raw(&mut self, edge: Edge) -> GraphResult<()> {
        if !self.has_vertex(edge.source) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.has_vertex(edge.target) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }

        let id = edge.id.as_u64();
        let idx = id as usize;
        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }
        self.free_edge_ids.retain(|&free| free != id);
        if id >= self.next_edge_id {
            self.next_edge_id = id + 1;
        }

        // Update adjacency lists
        self.outgoing[edge.source.as_u64() as usize].push(edge.id);
        self.incoming[edge.target.as_u64() as usize].push(edge.id);

        self.label_index
            .entry(edge.label.clone())
            .or_insert_with(HashSet::new)
            .insert(edge.id);

        for (key, value) in &edge.properties {
            self.key_indices.edge_insert(key, value.clone(), edge.id);
        }

        self.edges[idx] = Some(edge);
        self.live_edges += 1;
        Ok(())
    }

    fn remove_edge_raw(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let idx = id.as_u64() as usize;
        let edge = self
            .edges
            .get_mut(idx)
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        if let Some(edge_set) = self.label_index.get_mut(&edge.label) {
            edge_set.remove(&id);
            if edge_set.is_empty() {
                self.label_index.remove(&edge.label);
            }
        }
        if let Some(adj) = self.outgoing.get_mut(edge.source.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        if let Some(adj) = self.incoming.get_mut(edge.target.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        for (key, value) in &edge.properties {
            self.key_indices.edge_remove(key, value, id);
        }

        self.free_edge_ids.push(id.as_u64());
        self.live_edges -= 1;
        Ok(edge)
    }

    fn set_vertex_property_raw(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        let vertex = self
            .vertices
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::VertexNotFound(id))?;
        let old = vertex.set_property(key, value.clone());
        if let Some(old_value) = &old {
            self.key_indices.vertex_remove(key, old_value, id);
        }
        self.key_indices.vertex_insert(key, value, id);
        Ok(old)
    }

    fn remove_vertex_property_raw(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let vertex = self
            .vertices
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::VertexNotFound(id))?;
        let old = vertex.remove_property(key);
        if let Some(old_value) = &old {
            self.key_indices.vertex_remove(key, old_value, id);
        }
        Ok(old)
    }

    fn set_edge_property_raw(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::EdgeNotFound(id))?;
        let old = edge.set_property(key, value.clone());
        if let Some(old_value) = &old {
            self.key_indices.edge_remove(key, old_value, id);
        }
        self.key_indices.edge_insert(key, value, id);
        Ok(old)
    }

    fn remove_edge_property_raw(&mut self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::EdgeNotFound(id))?;
        let old = edge.remove_property(key);
        if let Some(old_value) = &old {
            self.key_indices.edge_remove(key, old_value, id);
        }
        Ok(old)
    }

    fn undo(&mut self, entry: JournalEntry) -> GraphResult<()> {
        match entry {
            JournalEntry::VertexAdded(id) => {
                self.remove_vertex_raw(id)?;
            }
            JournalEntry::VertexRemoved(vertex) => self.insert_vertex_raw(vertex),
            JournalEntry::VertexPropertySet { id, key, old } => {
                match old {
                    Some(value) => self.set_vertex_property_raw(id, &key, value)?,
                    None => self.remove_vertex_property_raw(id, &key)?,
                };
            }
            JournalEntry::EdgeAdded(id) => {
                self.remove_edge_raw(id)?;
            }
            JournalEntry::EdgeRemoved(edge) => self.insert_edge_raw(edge)?,
            JournalEntry::EdgePropertySet { id, key, old } => {
                match old {
                    Some(value) => self.set_edge_property_raw(id, &key, value)?,
                    None => self.remove_edge_property_raw(id, &key)?,
                };
            }
        }
        Ok(())
    }

    fn has_vertex(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }
}

impl KeyIndexableGraph for GraphStore {
    fn features(&self) -> GraphFeatures {
        GraphFeatures {
            supports_duplicate_edges: true,
            supports_transactions: true,
        }
    }

    fn add_vertex(&mut self) -> GraphResult<VertexId> {
        let id = self.allocate_vertex_id();
        self.insert_vertex_raw(Vertex::new(id));
        self.journal.push(JournalEntry::VertexAdded(id));
        Ok(id)
    }

    fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    fn remove_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        if !self.has_vertex(id) {
            return Err(GraphError::VertexNotFound(id));
        }
        let idx = id.as_u64() as usize;
        let mut incident: Vec<EdgeId> = self.outgoing[idx].clone();
        for edge_id in &self.incoming[idx] {
            if !incident.contains(edge_id) {
                incident.push(*edge_id);
            }
        }
        for edge_id in incident {
            self.remove_edge(edge_id)?;
        }

        let vertex = self.remove_vertex_raw(id)?;
        self.journal.push(JournalEntry::VertexRemoved(vertex.clone()));
        Ok(vertex)
    }

    fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        let old = self.set_vertex_property_raw(id, key, value)?;
        self.journal.push(JournalEntry::VertexPropertySet {
            id,
            key: key.to_string(),
            old: old.clone(),
        });
        Ok(old)
    }

    fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let old = self.remove_vertex_property_raw(id, key)?;
        if old.is_some() {
            self.journal.push(JournalEntry::VertexPropertySet {
                id,
                key: key.to_string(),
                old: old.clone(),
            });
        }
        Ok(old)
    }

    fn add_edge(&mut self, source: VertexId, target: VertexId, label: &str) -> GraphResult<EdgeId> {
        if !self.has_vertex(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_vertex(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }
        let id = self.allocate_edge_id();
        self.insert_edge_raw(Edge::new(id, source, target, label))?;
        self.journal.push(JournalEntry::EdgeAdded(id));
        Ok(id)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.remove_edge_raw(id)?;
        self.journal.push(JournalEntry::EdgeRemoved(edge.clone()));
        Ok(edge)
    }

    fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> GraphResult<Option<PropertyValue>> {
        let old = self.set_edge_property_raw(id, key, value)?;
        self.journal.push(JournalEntry::EdgePropertySet {
            id,
            key: key.to_string(),
            old: old.clone(),
        });
        Ok(old)
    }

    fn remove_edge_property(&mut self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let old = self.remove_edge_property_raw(id, key)?;
        if old.is_some() {
            self.journal.push(JournalEntry::EdgePropertySet {
                id,
                key: key.to_string(),
                old: old.clone(),
            });
        }
        Ok(old)
    }

    fn out_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.outgoing
            .get(id.as_u64() as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn in_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.incoming
            .get(id.as_u64() as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn edges_with_label(&self, label: &str) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self
            .label_index
            .get(label)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.iter().flatten().map(|v| v.id).collect()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().flatten().map(|e| e.id).collect()
    }

    fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    fn edge_count(&self) -> usize {
        self.live_edges
    }

    fn create_key_index(&mut self, key: &str, kind: ElementKind) -> GraphResult<()> {
        if !self.key_indices.create_index(key, kind) {
            return Ok(());
        }
        debug!("Created {} key index on '{}'", kind, key);
        match kind {
            ElementKind::Vertex => {
                for vertex in self.vertices.iter().flatten() {
                    if let Some(value) = vertex.get_property(key) {
                        self.key_indices.vertex_insert(key, value.clone(), vertex.id);
                    }
                }
            }
            ElementKind::Edge => {
                for edge in self.edges.iter().flatten() {
                    if let Some(value) = edge.get_property(key) {
                        self.key_indices.edge_insert(key, value.clone(), edge.id);
                    }
                }
            }
        }
        Ok(())
    }

    fn has_key_index(&self, key: &str, kind: ElementKind) -> bool {
        self.key_indices.has_index(key, kind)
    }

    fn vertices_by_key(&self, key: &str, value: &PropertyValue) -> Vec<VertexId> {
        match self.key_indices.vertices(key, value) {
            Some(ids) => ids,
            None => self
                .vertices
                .iter()
                .flatten()
                .filter(|v| v.get_property(key) == Some(value))
                .map(|v| v.id)
                .collect(),
        }
    }

    fn edges_by_key(&self, key: &str, value: &PropertyValue) -> Vec<EdgeId> {
        match self.key_indices.edges(key, value) {
            Some(ids) => ids,
            None => self
                .edges
                .iter()
                .flatten()
                .filter(|e| e.get_property(key) == Some(value))
                .map(|e| e.id)
                .collect(),
        }
    }

    fn commit(&mut self) -> GraphResult<()> {
        debug!("Committing {} graph mutations", self.journal.len());
        self.journal.clear();
        Ok(())
    }

    fn rollback(&mut self) -> GraphResult<()> {
        debug!("Rolling back {} graph mutations", self.journal.len());
        while let Some(entry) = self.journal.pop() {
            self.undo(entry)?;
        }
        Ok(())
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
