//! RDF quad store over a key-indexable property graph
//!
//! Statements are persisted purely as graph elements:
//!
//! - each RDF value is a vertex (see [`codec`](super::codec)),
//! - each statement is an edge from subject to object labeled with the
//!   predicate IRI, carrying `ng` for named graphs and one property per
//!   configured index pattern holding that pattern's key,
//! - a control vertex holds the namespaces.
//!
//! A vertex exists only while some statement references it; removals sweep
//! the endpoints they leave without edges.

use super::codec::{self, KeyParts, ValueKind, NAMED_GRAPH, VALUE};
use super::config::QuadStoreConfig;
use super::connection::QuadStoreConnection;
use super::error::{SailError, SailResult};
use super::event::{ListenerId, ListenerRegistry, SailChangeEvent, SailChangedListener};
use super::matcher;
use super::namespace::{self, NamespaceStore};
use super::types::{Literal, NamedNode, Quad, QuadPattern, RdfObject, RdfTerm};
use crate::graph::{EdgeId, ElementKind, GraphError, GraphStore, KeyIndexableGraph, PropertyValue, VertexId};
use crate::index::{BoundFields, IndexPatterns};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// State shared by a store and all of its connections
pub(crate) struct SharedStore<G: KeyIndexableGraph> {
    graph: RwLock<G>,
    config: QuadStoreConfig,
    patterns: IndexPatterns,
    namespaces: NamespaceStore,
    listeners: RwLock<ListenerRegistry>,
    /// Connection owning the backend's pending changes, if any
    writer: Mutex<Option<u64>>,
    next_connection: AtomicU64,
}

/// An RDF quad store persisted in a property graph
///
/// Cloning is cheap and yields another handle to the same store.
///
/// # Example
///
/// ```rust
/// use quadgraph::rdf::{QuadStore, QuadStoreConfig, NamedNode, Literal, Quad, QuadPattern};
///
/// let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
/// let mut conn = store.connection();
///
/// let alice = NamedNode::new("http://example.org/alice").unwrap();
/// let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
/// conn.add_quad(&Quad::new(
///     alice.clone().into(),
///     name.into(),
///     Literal::new_simple_literal("Alice").into(),
///     None,
/// ))
/// .unwrap();
/// conn.commit().unwrap();
///
/// let pattern = QuadPattern::new(Some(alice.into()), None, None, vec![]);
/// assert_eq!(conn.get_statements(&pattern).unwrap().count(), 1);
/// ```
pub struct QuadStore<G: KeyIndexableGraph = GraphStore> {
    shared: Arc<SharedStore<G>>,
}

impl<G: KeyIndexableGraph> Clone for QuadStore<G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl QuadStore<GraphStore> {
    /// Create a store over a fresh in-memory graph
    pub fn in_memory(config: QuadStoreConfig) -> SailResult<Self> {
        Self::new(GraphStore::new(), config)
    }
}

impl<G: KeyIndexableGraph> QuadStore<G> {
    /// Open a quad store on `graph`
    ///
    /// Validates the index patterns, creates the key indices they need and
    /// the namespaces control vertex, and commits that setup.
    pub fn new(mut graph: G, config: QuadStoreConfig) -> SailResult<Self> {
        let patterns = config.parsed_patterns()?;
        if !config.enforce_unique_statements && !graph.features().supports_duplicate_edges {
            return Err(SailError::Config(
                "duplicate statements require a backend supporting duplicate edges".to_string(),
            ));
        }

        graph.create_key_index(VALUE, ElementKind::Vertex)?;
        for pattern in patterns.iter() {
            graph.create_key_index(pattern.token(), ElementKind::Edge)?;
        }
        let control = namespace::find_or_create_control_vertex(&mut graph)?;
        graph.commit()?;

        info!(
            "Opened quad store: index patterns '{}', unique statements {}",
            patterns, config.enforce_unique_statements
        );

        Ok(Self {
            shared: Arc::new(SharedStore {
                graph: RwLock::new(graph),
                config,
                patterns,
                namespaces: NamespaceStore::new(control),
                listeners: RwLock::new(ListenerRegistry::default()),
                writer: Mutex::new(None),
                next_connection: AtomicU64::new(1),
            }),
        })
    }

    /// Open a new connection
    pub fn connection(&self) -> QuadStoreConnection<G> {
        QuadStoreConnection::new(Arc::clone(&self.shared))
    }

    pub fn config(&self) -> &QuadStoreConfig {
        &self.shared.config
    }

    pub fn index_patterns(&self) -> &IndexPatterns {
        &self.shared.patterns
    }

    /// The vertex holding the namespaces
    pub fn namespaces_vertex(&self) -> VertexId {
        self.shared.namespaces.control_vertex()
    }

    /// Register a listener for committed changes
    pub fn add_listener(&self, listener: Arc<dyn SailChangedListener>) -> SailResult<ListenerId> {
        Ok(self.shared.listeners_mut()?.add(listener))
    }

    /// Unregister a listener; `false` if it was not registered
    pub fn remove_listener(&self, id: ListenerId) -> SailResult<bool> {
        Ok(self.shared.listeners_mut()?.remove(id))
    }

    /// Run `f` with read access to the underlying graph
    pub fn with_graph<R>(&self, f: impl FnOnce(&G) -> R) -> SailResult<R> {
        Ok(f(&*self.shared.read_graph()?))
    }

    pub fn vertex_count(&self) -> SailResult<usize> {
        self.with_graph(|g| g.vertex_count())
    }

    pub fn edge_count(&self) -> SailResult<usize> {
        self.with_graph(|g| g.edge_count())
    }
}

fn poisoned() -> SailError {
    SailError::Store(GraphError::Backend("graph lock poisoned".to_string()))
}

impl<G: KeyIndexableGraph> SharedStore<G> {
    pub(crate) fn read_graph(&self) -> SailResult<RwLockReadGuard<'_, G>> {
        self.graph.read().map_err(|_| poisoned())
    }

    pub(crate) fn write_graph(&self) -> SailResult<RwLockWriteGuard<'_, G>> {
        self.graph.write().map_err(|_| poisoned())
    }

    fn listeners_mut(&self) -> SailResult<RwLockWriteGuard<'_, ListenerRegistry>> {
        self.listeners.write().map_err(|_| poisoned())
    }

    pub(crate) fn next_connection_id(&self) -> u64 {
        self.next_connection.fetch_add(1, Ordering::Relaxed)
    }

    /// Claim the write transaction for `connection`
    ///
    /// The backend keeps a single set of pending changes, so only one
    /// connection at a time may have uncommitted writes.
    pub(crate) fn acquire_writer(&self, connection: u64) -> SailResult<()> {
        let mut writer = self.writer.lock().map_err(|_| poisoned())?;
        match *writer {
            Some(owner) if owner != connection => Err(SailError::WriteConflict),
            _ => {
                *writer = Some(connection);
                Ok(())
            }
        }
    }

    pub(crate) fn release_writer(&self, connection: u64) -> SailResult<()> {
        let mut writer = self.writer.lock().map_err(|_| poisoned())?;
        if *writer == Some(connection) {
            *writer = None;
        }
        Ok(())
    }

    pub(crate) fn patterns(&self) -> &IndexPatterns {
        &self.patterns
    }

    pub(crate) fn namespaces(&self) -> &NamespaceStore {
        &self.namespaces
    }

    /// Deliver events to every listener, in registration order
    pub(crate) fn notify(&self, events: &[SailChangeEvent]) -> SailResult<()> {
        let listeners = self.listeners.read().map_err(|_| poisoned())?.snapshot();
        for event in events {
            for listener in &listeners {
                listener.statements_changed(event);
            }
        }
        Ok(())
    }

    /// Add one statement; `false` when unique mode found it already present
    pub(crate) fn add_statement(&self, graph: &mut G, quad: &Quad) -> SailResult<bool> {
        if !self.config.allow_blank_node_objects && quad.object.is_blank_node() {
            return Err(SailError::Unsupported(format!(
                "blank node object {} is not allowed by this store",
                quad.object
            )));
        }

        let subject = codec::value_to_vertex(graph, &RdfTerm::from(quad.subject.clone()))?;
        let object = codec::value_to_vertex(graph, &RdfTerm::from(quad.object.clone()))?;
        let predicate = quad.predicate.as_str();
        let context = quad.graph.as_ref().map(NamedNode::as_str);

        if self.config.enforce_unique_statements
            && self
                .find_statement_edge(graph, subject, predicate, object, context)
                .is_some()
        {
            debug!("Statement already present: {}", quad);
            return Ok(false);
        }

        let edge = graph.add_edge(subject, object, predicate)?;
        if let Some(context) = context {
            graph.set_edge_property(edge, NAMED_GRAPH, context.into())?;
        }
        let parts = KeyParts {
            subject: Some(subject),
            predicate: Some(predicate),
            object: Some(object),
            context: Some(context),
        };
        for pattern in self.patterns.iter() {
            if let Some(key) = codec::encode_index_key(pattern, &parts) {
                graph.set_edge_property(edge, pattern.token(), PropertyValue::String(key))?;
            }
        }
        debug!("Added statement {} as {}", quad, edge);
        Ok(true)
    }

    /// An edge carrying exactly this statement
    fn find_statement_edge(
        &self,
        graph: &G,
        subject: VertexId,
        predicate: &str,
        object: VertexId,
        context: Option<&str>,
    ) -> Option<EdgeId> {
        let parts = KeyParts {
            subject: Some(subject),
            predicate: Some(predicate),
            object: Some(object),
            context: Some(context),
        };
        let candidates = match self.patterns.select(BoundFields::all()) {
            Some(index) => match codec::encode_index_key(index, &parts) {
                Some(key) => graph.edges_by_key(index.token(), &PropertyValue::String(key)),
                None => graph.out_edges(subject),
            },
            None => graph.out_edges(subject),
        };
        candidates.into_iter().find(|id| {
            graph.edge(*id).map_or(false, |edge| {
                edge.source == subject
                    && edge.target == object
                    && edge.label == predicate
                    && matcher::edge_context(edge) == context
            })
        })
    }

    /// Remove every statement matching `pattern`, then sweep orphans
    pub(crate) fn remove_statements(&self, graph: &mut G, pattern: &QuadPattern) -> SailResult<Vec<Quad>> {
        let edges = matcher::match_edges(graph, &self.patterns, pattern);
        self.remove_edges(graph, edges)
    }

    fn remove_edges(&self, graph: &mut G, edges: Vec<EdgeId>) -> SailResult<Vec<Quad>> {
        let mut removed = Vec::with_capacity(edges.len());
        let mut endpoints = Vec::with_capacity(edges.len() * 2);
        for id in edges {
            removed.push(matcher::read_quad(graph, id)?);
            let edge = graph.remove_edge(id)?;
            endpoints.push(edge.source);
            endpoints.push(edge.target);
        }
        let swept = self.sweep_orphans(graph, endpoints)?;
        if !removed.is_empty() {
            debug!("Removed {} statements, {} orphan vertices", removed.len(), swept);
        }
        Ok(removed)
    }

    /// Delete candidates left without incident edges, except the control vertex
    fn sweep_orphans(&self, graph: &mut G, candidates: Vec<VertexId>) -> SailResult<usize> {
        let control = self.namespaces.control_vertex();
        let mut seen = FxHashSet::default();
        let mut swept = 0;
        for id in candidates {
            if id == control || !seen.insert(id) || graph.vertex(id).is_none() {
                continue;
            }
            if graph.out_edges(id).is_empty() && graph.in_edges(id).is_empty() {
                graph.remove_vertex(id)?;
                swept += 1;
            }
        }
        Ok(swept)
    }

    /// Count statements in `contexts` (all contexts when empty)
    pub(crate) fn size(&self, graph: &G, contexts: &[Option<NamedNode>]) -> usize {
        let pattern = QuadPattern::new(None, None, None, contexts.to_vec());
        matcher::match_edges(graph, &self.patterns, &pattern).len()
    }

    /// Distinct named graphs holding at least one statement
    pub(crate) fn context_ids(&self, graph: &G) -> Vec<NamedNode> {
        let mut seen = FxHashSet::default();
        let mut contexts = Vec::new();
        for id in graph.edge_ids() {
            if let Some(context) = graph.edge(id).and_then(matcher::edge_context) {
                if seen.insert(context.to_string()) {
                    contexts.push(NamedNode::new_unchecked(context));
                }
            }
        }
        contexts
    }

    /// Re-type a literal vertex
    ///
    /// Every statement referencing the old literal is removed and re-added
    /// with the new literal in the same position. Returns the new literal and
    /// the removed and added statements.
    pub(crate) fn update_literal(
        &self,
        graph: &mut G,
        vertex: VertexId,
        datatype: Option<NamedNode>,
        language: Option<&str>,
    ) -> SailResult<(Literal, Vec<Quad>, Vec<Quad>)> {
        let old = match codec::read_value(graph, vertex)? {
            RdfTerm::Literal(literal) => literal,
            other => {
                return Err(SailError::Unsupported(format!(
                    "{} is a {} vertex; only literals carry mutable properties",
                    other,
                    ValueKind::of(&other).as_str()
                )))
            }
        };
        let new = Literal::from_parts(old.value(), datatype, language)?;

        let mut edges = graph.in_edges(vertex);
        for id in graph.out_edges(vertex) {
            if !edges.contains(&id) {
                edges.push(id);
            }
        }
        let removed = self.remove_edges(graph, edges)?;

        let old_term = RdfTerm::Literal(old.clone());
        let new_term = RdfTerm::Literal(new.clone());
        let mut added = Vec::with_capacity(removed.len());
        for quad in &removed {
            let mut quad = quad.clone();
            // Literals only ever occupy the object position
            if RdfTerm::from(quad.object.clone()) == old_term {
                quad.object = RdfObject::from(new_term.clone());
            }
            if self.add_statement(graph, &quad)? {
                added.push(quad);
            }
        }
        debug!("Re-typed {} as {}, {} statements relinked", old, new, added.len());
        Ok((new, removed, added))
    }
}
