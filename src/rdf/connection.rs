//! Connections and transactions
//!
//! A connection owns at most one open transaction. Mutations outside an
//! explicit [`begin`](QuadStoreConnection::begin) open one implicitly.
//! `commit` commits the backend and then publishes the buffered changes as
//! one `StatementsAdded` and one `StatementsRemoved` event; `rollback`
//! rolls the backend back and drops them.
//!
//! The backend keeps one set of pending changes per store, so a store has
//! a single writer: the first mutation of a transaction claims the store's
//! write transaction, and until that connection commits or rolls back,
//! mutations on any other connection fail with
//! [`SailError::WriteConflict`]. Commit and rollback only reach the backend
//! from the connection that owns the writes. Readers on other connections
//! see uncommitted writes.

use super::error::{SailError, SailResult};
use super::event::SailChangeEvent;
use super::namespace::Namespace;
use super::store::SharedStore;
use super::types::{Literal, NamedNode, Quad, QuadPattern, RdfObject, RdfPredicate, RdfSubject, RdfTerm};
use super::{codec, matcher};
use crate::graph::{GraphStore, KeyIndexableGraph, VertexId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Statements returned by a match
///
/// The matching statements are collected while the graph is locked, so the
/// iterator holds no backend resources; dropping it early is always safe.
#[derive(Debug)]
pub struct StatementIterator {
    quads: std::vec::IntoIter<Quad>,
}

impl StatementIterator {
    pub(crate) fn new(quads: Vec<Quad>) -> Self {
        Self {
            quads: quads.into_iter(),
        }
    }

    /// Release the iterator before reaching its end
    pub fn close(self) {}
}

impl Iterator for StatementIterator {
    type Item = Quad;

    fn next(&mut self) -> Option<Self::Item> {
        self.quads.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.quads.size_hint()
    }
}

impl ExactSizeIterator for StatementIterator {}

/// A connection to a [`QuadStore`](super::QuadStore)
pub struct QuadStoreConnection<G: KeyIndexableGraph = GraphStore> {
    store: Arc<SharedStore<G>>,
    id: u64,
    active: bool,
    /// This connection owns the store's write transaction
    writing: bool,
    added: Vec<Quad>,
    removed: Vec<Quad>,
}

impl<G: KeyIndexableGraph> QuadStoreConnection<G> {
    pub(crate) fn new(store: Arc<SharedStore<G>>) -> Self {
        Self {
            id: store.next_connection_id(),
            store,
            active: false,
            writing: false,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Start a transaction
    pub fn begin(&mut self) -> SailResult<()> {
        if self.active {
            return Err(SailError::TransactionActive);
        }
        self.active = true;
        debug!("Transaction started");
        Ok(())
    }

    /// Whether a transaction is open
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open a transaction if needed and claim the store's writer
    fn ensure_writer(&mut self) -> SailResult<()> {
        if !self.writing {
            self.store.acquire_writer(self.id)?;
            self.writing = true;
        }
        if !self.active {
            self.active = true;
            debug!("Transaction started implicitly");
        }
        Ok(())
    }

    fn release_writer(&mut self) -> SailResult<()> {
        if self.writing {
            self.writing = false;
            self.store.release_writer(self.id)?;
        }
        Ok(())
    }

    /// Commit the open transaction and publish its changes
    ///
    /// A backend failure is returned as is and leaves the transaction open
    /// so the caller can roll it back. Without an open transaction this is a
    /// no-op.
    pub fn commit(&mut self) -> SailResult<()> {
        if !self.active {
            return Ok(());
        }
        if self.writing {
            self.store.write_graph()?.commit()?;
            self.release_writer()?;
        }
        self.active = false;

        let mut events = Vec::with_capacity(2);
        if !self.added.is_empty() {
            events.push(SailChangeEvent::StatementsAdded(std::mem::take(&mut self.added)));
        }
        if !self.removed.is_empty() {
            events.push(SailChangeEvent::StatementsRemoved(std::mem::take(&mut self.removed)));
        }
        debug!("Transaction committed, {} change events", events.len());
        self.store.notify(&events)
    }

    /// Roll back the open transaction, discarding its changes
    pub fn rollback(&mut self) -> SailResult<()> {
        if !self.active {
            return Ok(());
        }
        if self.writing {
            self.store.write_graph()?.rollback()?;
            self.release_writer()?;
        }
        self.added.clear();
        self.removed.clear();
        self.active = false;
        debug!("Transaction rolled back");
        Ok(())
    }

    /// Add a statement; returns `false` if it was already present
    pub fn add_statement(
        &mut self,
        subject: RdfSubject,
        predicate: RdfPredicate,
        object: RdfObject,
        context: Option<NamedNode>,
    ) -> SailResult<bool> {
        self.add_quad(&Quad::new(subject, predicate, object, context))
    }

    /// Add a quad; returns `false` if it was already present
    pub fn add_quad(&mut self, quad: &Quad) -> SailResult<bool> {
        self.ensure_writer()?;
        let added = {
            let mut graph = self.store.write_graph()?;
            self.store.add_statement(&mut *graph, quad)?
        };
        if added {
            self.added.push(quad.clone());
        }
        Ok(added)
    }

    /// Remove every statement matching `pattern`, returning how many
    pub fn remove_statements(&mut self, pattern: &QuadPattern) -> SailResult<usize> {
        self.ensure_writer()?;
        let removed = {
            let mut graph = self.store.write_graph()?;
            self.store.remove_statements(&mut *graph, pattern)?
        };
        let count = removed.len();
        self.removed.extend(removed);
        Ok(count)
    }

    /// Remove exactly this quad
    pub fn remove_quad(&mut self, quad: &Quad) -> SailResult<usize> {
        let pattern = QuadPattern::new(
            Some(quad.subject.clone().into()),
            Some(quad.predicate.as_named_node().clone()),
            Some(quad.object.clone().into()),
            vec![quad.graph.clone()],
        );
        self.remove_statements(&pattern)
    }

    /// Remove all statements in `contexts`, or everything when empty
    pub fn clear(&mut self, contexts: &[Option<NamedNode>]) -> SailResult<usize> {
        self.remove_statements(&QuadPattern::new(None, None, None, contexts.to_vec()))
    }

    /// Statements matching `pattern`
    pub fn get_statements(&self, pattern: &QuadPattern) -> SailResult<StatementIterator> {
        let graph = self.store.read_graph()?;
        let quads = matcher::match_quads(&*graph, self.store.patterns(), pattern)?;
        Ok(StatementIterator::new(quads))
    }

    pub fn has_statement(&self, pattern: &QuadPattern) -> SailResult<bool> {
        let graph = self.store.read_graph()?;
        Ok(!matcher::match_edges(&*graph, self.store.patterns(), pattern).is_empty())
    }

    /// Number of statements in `contexts`; all contexts when empty, `None`
    /// standing for the default graph
    pub fn size(&self, contexts: &[Option<NamedNode>]) -> SailResult<usize> {
        let graph = self.store.read_graph()?;
        Ok(self.store.size(&*graph, contexts))
    }

    /// Named graphs holding at least one statement
    pub fn context_ids(&self) -> SailResult<Vec<NamedNode>> {
        let graph = self.store.read_graph()?;
        Ok(self.store.context_ids(&*graph))
    }

    /// The vertex representing `value`, if any
    pub fn find_vertex(&self, value: &RdfTerm) -> SailResult<Option<VertexId>> {
        let graph = self.store.read_graph()?;
        Ok(codec::find_vertex(&*graph, value))
    }

    /// The RDF value a vertex represents
    pub fn vertex_value(&self, vertex: VertexId) -> SailResult<RdfTerm> {
        let graph = self.store.read_graph()?;
        codec::read_value(&*graph, vertex)
    }

    /// Change the datatype and language of a literal vertex
    ///
    /// Statements referencing the literal are relinked to the literal with
    /// the new metadata. Fails with [`SailError::Unsupported`] for IRI and
    /// blank node vertices.
    pub fn update_literal(
        &mut self,
        vertex: VertexId,
        datatype: Option<NamedNode>,
        language: Option<&str>,
    ) -> SailResult<Literal> {
        self.ensure_writer()?;
        let (literal, removed, added) = {
            let mut graph = self.store.write_graph()?;
            self.store.update_literal(&mut *graph, vertex, datatype, language)?
        };
        self.removed.extend(removed);
        self.added.extend(added);
        Ok(literal)
    }

    pub fn set_namespace(&mut self, prefix: &str, iri: &str) -> SailResult<()> {
        self.ensure_writer()?;
        let mut graph = self.store.write_graph()?;
        Ok(self.store.namespaces().set(&mut *graph, prefix, iri)?)
    }

    /// Remove a namespace, returning its IRI
    pub fn remove_namespace(&mut self, prefix: &str) -> SailResult<Option<String>> {
        self.ensure_writer()?;
        let mut graph = self.store.write_graph()?;
        Ok(self.store.namespaces().remove(&mut *graph, prefix)?)
    }

    pub fn get_namespace(&self, prefix: &str) -> SailResult<Option<String>> {
        let graph = self.store.read_graph()?;
        Ok(self.store.namespaces().get(&*graph, prefix)?)
    }

    /// All namespaces, ordered by prefix
    pub fn namespaces(&self) -> SailResult<Vec<Namespace>> {
        let graph = self.store.read_graph()?;
        Ok(self.store.namespaces().list(&*graph)?)
    }

    pub fn clear_namespaces(&mut self) -> SailResult<usize> {
        self.ensure_writer()?;
        let mut graph = self.store.write_graph()?;
        Ok(self.store.namespaces().clear(&mut *graph)?)
    }
}

impl<G: KeyIndexableGraph> Drop for QuadStoreConnection<G> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.rollback() {
                warn!("Rollback of abandoned transaction failed: {}", e);
            }
        }
    }
}
