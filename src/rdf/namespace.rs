//! RDF namespace and prefix management
//!
//! Namespaces live as properties of a single control vertex, one
//! `ns:<prefix>` property per namespace. The control vertex carries the
//! reserved `value` [`NAMESPACES_VERTEX`] and no `kind`, so it never decodes
//! as an RDF value and is never garbage collected.

use super::codec::{self, NAMESPACES_VERTEX, VALUE};
use crate::graph::{GraphError, GraphResult, KeyIndexableGraph, PropertyValue, VertexId};
use tracing::debug;

/// Property key prefix of namespace entries on the control vertex
pub const NAMESPACE_KEY_PREFIX: &str = "ns:";

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Namespace {
    /// Prefix; the empty string is the default namespace
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

fn namespace_key(prefix: &str) -> String {
    format!("{}{}", NAMESPACE_KEY_PREFIX, prefix)
}

/// Find the control vertex, creating it on a fresh graph
pub(crate) fn find_or_create_control_vertex<G: KeyIndexableGraph + ?Sized>(
    graph: &mut G,
) -> GraphResult<VertexId> {
    let marker = PropertyValue::from(NAMESPACES_VERTEX);
    let existing = graph.vertices_by_key(VALUE, &marker).into_iter().find(|id| {
        graph
            .vertex(*id)
            .map_or(false, |v| codec::vertex_kind(v).is_none())
    });
    if let Some(id) = existing {
        return Ok(id);
    }
    let id = graph.add_vertex()?;
    graph.set_vertex_property(id, VALUE, marker)?;
    debug!("Created namespaces control vertex {}", id);
    Ok(id)
}

/// Namespace operations over the control vertex of a graph
pub(crate) struct NamespaceStore {
    control: VertexId,
}

impl NamespaceStore {
    pub(crate) fn new(control: VertexId) -> Self {
        Self { control }
    }

    pub(crate) fn control_vertex(&self) -> VertexId {
        self.control
    }

    pub(crate) fn get<G: KeyIndexableGraph + ?Sized>(
        &self,
        graph: &G,
        prefix: &str,
    ) -> GraphResult<Option<String>> {
        let vertex = graph
            .vertex(self.control)
            .ok_or(GraphError::VertexNotFound(self.control))?;
        Ok(vertex
            .get_property(&namespace_key(prefix))
            .and_then(PropertyValue::as_string)
            .map(str::to_string))
    }

    pub(crate) fn set<G: KeyIndexableGraph + ?Sized>(
        &self,
        graph: &mut G,
        prefix: &str,
        iri: &str,
    ) -> GraphResult<()> {
        graph.set_vertex_property(self.control, &namespace_key(prefix), iri.into())?;
        debug!("Set namespace '{}' -> {}", prefix, iri);
        Ok(())
    }

    pub(crate) fn remove<G: KeyIndexableGraph + ?Sized>(
        &self,
        graph: &mut G,
        prefix: &str,
    ) -> GraphResult<Option<String>> {
        let old = graph.remove_vertex_property(self.control, &namespace_key(prefix))?;
        Ok(old.and_then(|v| v.as_string().map(str::to_string)))
    }

    /// All namespaces, ordered by prefix
    pub(crate) fn list<G: KeyIndexableGraph + ?Sized>(&self, graph: &G) -> GraphResult<Vec<Namespace>> {
        let vertex = graph
            .vertex(self.control)
            .ok_or(GraphError::VertexNotFound(self.control))?;
        let mut namespaces: Vec<Namespace> = vertex
            .property_keys()
            .filter_map(|key| {
                let prefix = key.strip_prefix(NAMESPACE_KEY_PREFIX)?;
                let iri = vertex.get_property(key)?.as_string()?;
                Some(Namespace::new(prefix, iri))
            })
            .collect();
        namespaces.sort();
        Ok(namespaces)
    }

    /// Remove every namespace, returning how many there were
    pub(crate) fn clear<G: KeyIndexableGraph + ?Sized>(&self, graph: &mut G) -> GraphResult<usize> {
        let namespaces = self.list(graph)?;
        for namespace in &namespaces {
            graph.remove_vertex_property(self.control, &namespace_key(&namespace.prefix))?;
        }
        Ok(namespaces.len())
    }
}
