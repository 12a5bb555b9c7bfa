//! Quad pattern matching
//!
//! A pattern binds any subset of subject, predicate and object, plus a list
//! of acceptable contexts. Candidate edges come from the best access path:
//!
//! 1. the configured index covering the most bound fields,
//! 2. the out-edges of a bound subject,
//! 3. the in-edges of a bound object,
//! 4. the edges labeled with a bound predicate,
//! 5. every edge.
//!
//! Each candidate is then checked against all bound fields, so the access
//! path only affects cost, never the result.

use super::codec::{self, KeyParts, NAMED_GRAPH};
use super::error::SailResult;
use super::types::{NamedNode, Quad, QuadPattern, RdfObject, RdfPredicate, RdfSubject};
use crate::graph::{Edge, EdgeId, GraphError, KeyIndexableGraph, PropertyValue, VertexId};
use crate::index::{BoundFields, IndexPatterns, QuadField};
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::debug;

/// How candidate edges are enumerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPath {
    /// Key index lookup under the given pattern token
    Index(String),
    /// Out-edges of the subject vertex
    SubjectEdges,
    /// In-edges of the object vertex
    ObjectEdges,
    /// Edges labeled with the predicate
    PredicateEdges,
    /// Every edge in the graph
    FullScan,
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPath::Index(token) => write!(f, "index '{}'", token),
            AccessPath::SubjectEdges => write!(f, "subject edges"),
            AccessPath::ObjectEdges => write!(f, "object edges"),
            AccessPath::PredicateEdges => write!(f, "predicate edges"),
            AccessPath::FullScan => write!(f, "full scan"),
        }
    }
}

/// Fields bound by a pattern; contexts count as bound when any are listed
pub fn bound_fields(pattern: &QuadPattern) -> BoundFields {
    let mut bound = BoundFields::empty();
    if pattern.subject.is_some() {
        bound.insert(QuadField::Subject);
    }
    if pattern.predicate.is_some() {
        bound.insert(QuadField::Predicate);
    }
    if pattern.object.is_some() {
        bound.insert(QuadField::Object);
    }
    if !pattern.contexts.is_empty() {
        bound.insert(QuadField::Context);
    }
    bound
}

/// Choose the access path for a set of bound fields
pub fn access_path(patterns: &IndexPatterns, bound: BoundFields) -> AccessPath {
    if let Some(index) = patterns.select(bound) {
        AccessPath::Index(index.token().to_string())
    } else if bound.contains(QuadField::Subject) {
        AccessPath::SubjectEdges
    } else if bound.contains(QuadField::Object) {
        AccessPath::ObjectEdges
    } else if bound.contains(QuadField::Predicate) {
        AccessPath::PredicateEdges
    } else {
        AccessPath::FullScan
    }
}

/// A pattern whose bound values have been mapped to vertices
struct ResolvedPattern<'a> {
    subject: Option<VertexId>,
    predicate: Option<&'a str>,
    object: Option<VertexId>,
    /// Distinct alternatives; empty accepts every context
    contexts: Vec<Option<&'a str>>,
}

impl<'a> ResolvedPattern<'a> {
    /// `None` when a bound value has no vertex, which means nothing matches
    fn resolve<G: KeyIndexableGraph + ?Sized>(graph: &G, pattern: &'a QuadPattern) -> Option<Self> {
        let subject = match &pattern.subject {
            Some(term) => Some(codec::find_vertex(graph, term)?),
            None => None,
        };
        let object = match &pattern.object {
            Some(term) => Some(codec::find_vertex(graph, term)?),
            None => None,
        };
        let mut contexts: Vec<Option<&str>> = Vec::with_capacity(pattern.contexts.len());
        for context in &pattern.contexts {
            let context = context.as_ref().map(NamedNode::as_str);
            if !contexts.contains(&context) {
                contexts.push(context);
            }
        }
        Some(Self {
            subject,
            predicate: pattern.predicate.as_ref().map(NamedNode::as_str),
            object,
            contexts,
        })
    }

    fn accepts(&self, edge: &Edge) -> bool {
        if self.subject.map_or(false, |s| edge.source != s) {
            return false;
        }
        if self.object.map_or(false, |o| edge.target != o) {
            return false;
        }
        if self.predicate.map_or(false, |p| edge.label != p) {
            return false;
        }
        self.contexts.is_empty() || self.contexts.contains(&edge_context(edge))
    }

    fn key_parts(&self, context: Option<Option<&'a str>>) -> KeyParts<'a> {
        KeyParts {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            context,
        }
    }
}

/// The named graph of a statement edge, `None` for the default graph
pub fn edge_context(edge: &Edge) -> Option<&str> {
    edge.get_property(NAMED_GRAPH).and_then(PropertyValue::as_string)
}

/// Ids of the statement edges matching `pattern`, without duplicates
pub fn match_edges<G: KeyIndexableGraph + ?Sized>(
    graph: &G,
    patterns: &IndexPatterns,
    pattern: &QuadPattern,
) -> Vec<EdgeId> {
    let resolved = match ResolvedPattern::resolve(graph, pattern) {
        Some(resolved) => resolved,
        None => {
            debug!("Pattern references unknown values, no match");
            return Vec::new();
        }
    };

    let path = access_path(patterns, bound_fields(pattern));
    debug!("Matching statements via {}", path);

    let candidates: Vec<EdgeId> = match &path {
        AccessPath::Index(token) => index_candidates(graph, patterns, token, &resolved),
        AccessPath::SubjectEdges => resolved.subject.map(|s| graph.out_edges(s)).unwrap_or_default(),
        AccessPath::ObjectEdges => resolved.object.map(|o| graph.in_edges(o)).unwrap_or_default(),
        AccessPath::PredicateEdges => resolved.predicate.map(|p| graph.edges_with_label(p)).unwrap_or_default(),
        AccessPath::FullScan => graph.edge_ids(),
    };

    let mut seen = FxHashSet::default();
    candidates
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter(|id| graph.edge(*id).map_or(false, |edge| resolved.accepts(edge)))
        .collect()
}

fn index_candidates<G: KeyIndexableGraph + ?Sized>(
    graph: &G,
    patterns: &IndexPatterns,
    token: &str,
    resolved: &ResolvedPattern<'_>,
) -> Vec<EdgeId> {
    let index = match patterns.iter().find(|p| p.token() == token) {
        Some(index) => index,
        None => return graph.edge_ids(),
    };
    // One lookup per context alternative when the index covers contexts
    let lookups: Vec<Option<Option<&str>>> = if index.fields().contains(&QuadField::Context) {
        resolved.contexts.iter().map(|c| Some(*c)).collect()
    } else {
        vec![None]
    };

    let mut candidates = Vec::new();
    for context in lookups {
        if let Some(key) = codec::encode_index_key(index, &resolved.key_parts(context)) {
            candidates.extend(graph.edges_by_key(index.token(), &PropertyValue::String(key)));
        }
    }
    candidates
}

/// Decode a statement edge into a quad
pub fn edge_to_quad<G: KeyIndexableGraph + ?Sized>(graph: &G, edge: &Edge) -> SailResult<Quad> {
    let subject = RdfSubject::try_from(codec::read_value(graph, edge.source)?)?;
    let predicate = RdfPredicate::from(NamedNode::new_unchecked(edge.label.clone()));
    let object = RdfObject::from(codec::read_value(graph, edge.target)?);
    let context = edge_context(edge).map(NamedNode::new_unchecked);
    Ok(Quad::new(subject, predicate, object, context))
}

/// Decode the statement edge with the given id
pub fn read_quad<G: KeyIndexableGraph + ?Sized>(graph: &G, id: EdgeId) -> SailResult<Quad> {
    let edge = graph.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
    edge_to_quad(graph, edge)
}

/// Quads matching `pattern`
pub fn match_quads<G: KeyIndexableGraph + ?Sized>(
    graph: &G,
    patterns: &IndexPatterns,
    pattern: &QuadPattern,
) -> SailResult<Vec<Quad>> {
    match_edges(graph, patterns, pattern)
        .into_iter()
        .map(|id| read_quad(graph, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DEFAULT_INDEX_PATTERNS;

    fn patterns(spec: &str) -> IndexPatterns {
        IndexPatterns::parse(spec).unwrap()
    }

    fn bound(subject: bool, predicate: bool, object: bool, contexts: usize) -> BoundFields {
        let iri = NamedNode::new("http://example.org/x").unwrap();
        bound_fields(&QuadPattern::new(
            subject.then(|| iri.clone().into()),
            predicate.then(|| iri.clone()),
            object.then(|| iri.clone().into()),
            vec![None; contexts],
        ))
    }

    #[test]
    fn test_bound_fields() {
        assert!(bound(false, false, false, 0).is_empty());
        let fields = bound(true, false, true, 2);
        assert!(fields.contains(QuadField::Subject));
        assert!(fields.contains(QuadField::Object));
        assert!(fields.contains(QuadField::Context));
        assert!(!fields.contains(QuadField::Predicate));
    }

    #[test]
    fn test_access_path_prefers_index() {
        let defaults = patterns(DEFAULT_INDEX_PATTERNS);
        assert_eq!(
            access_path(&defaults, bound(true, true, false, 0)),
            AccessPath::Index("sp".into())
        );
        assert_eq!(
            access_path(&defaults, bound(false, true, false, 1)),
            AccessPath::Index("pc".into())
        );
        assert_eq!(
            access_path(&defaults, bound(false, false, false, 2)),
            AccessPath::Index("c".into())
        );
        assert_eq!(access_path(&defaults, bound(false, false, false, 0)), AccessPath::FullScan);
    }

    #[test]
    fn test_access_path_fallbacks() {
        let only_p = patterns("p");
        assert_eq!(access_path(&only_p, bound(true, false, true, 0)), AccessPath::SubjectEdges);
        assert_eq!(access_path(&only_p, bound(false, false, true, 0)), AccessPath::ObjectEdges);
        assert_eq!(access_path(&only_p, bound(false, false, false, 1)), AccessPath::FullScan);

        let only_s = patterns("s");
        assert_eq!(access_path(&only_s, bound(false, true, false, 0)), AccessPath::PredicateEdges);
        assert_eq!(access_path(&only_s, bound(false, true, true, 1)), AccessPath::ObjectEdges);
    }

    #[test]
    fn test_access_path_display() {
        assert_eq!(AccessPath::Index("sp".into()).to_string(), "index 'sp'");
        assert_eq!(AccessPath::PredicateEdges.to_string(), "predicate edges");
        assert_eq!(AccessPath::FullScan.to_string(), "full scan");
    }
}
