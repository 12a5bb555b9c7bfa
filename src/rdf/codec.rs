//! Value codec
//!
//! Every RDF value is persisted as one vertex:
//!
//! | property   | content                                            |
//! |------------|----------------------------------------------------|
//! | `kind`     | `uri`, `bnode` or `literal`                        |
//! | `value`    | IRI, blank node id, or literal label (maybe cast)  |
//! | `datatype` | literal datatype IRI, absent for implied datatypes |
//! | `language` | literal language tag                               |
//!
//! Literal labels are stored as native scalars when their datatype is in the
//! cast table and the scalar renders back to exactly the same label.
//! Statements are edges; see [`crate::rdf::store`] for their properties and
//! the index key format produced by [`encode_index_key`].

use super::error::{SailError, SailResult};
use super::types::{BlankNode, Literal, NamedNode, RdfTerm};
use crate::graph::{GraphError, GraphResult, KeyIndexableGraph, PropertyValue, Vertex, VertexId};
use crate::index::{IndexPattern, QuadField};
use oxrdf::vocab::xsd;
use tracing::debug;

/// Vertex property holding the value kind
pub const KIND: &str = "kind";
/// Vertex property holding the IRI, blank node id or literal label
pub const VALUE: &str = "value";
/// Vertex property holding a literal's explicit datatype IRI
pub const DATATYPE: &str = "datatype";
/// Vertex property holding a literal's language tag
pub const LANGUAGE: &str = "language";
/// Edge property holding the named graph of a statement
pub const NAMED_GRAPH: &str = "ng";

/// `value` of the control vertex that stores namespaces
pub const NAMESPACES_VERTEX: &str = "urn:quadgraph:namespaces";

/// Index key component standing for the default graph
pub const DEFAULT_CONTEXT_KEY: &str = "N";

const KEY_SEPARATOR: char = ' ';

/// The three kinds of RDF value a vertex can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Uri,
    BlankNode,
    Literal,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Uri => "uri",
            ValueKind::BlankNode => "bnode",
            ValueKind::Literal => "literal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uri" => Some(ValueKind::Uri),
            "bnode" => Some(ValueKind::BlankNode),
            "literal" => Some(ValueKind::Literal),
            _ => None,
        }
    }

    pub fn of(term: &RdfTerm) -> Self {
        match term {
            RdfTerm::NamedNode(_) => ValueKind::Uri,
            RdfTerm::BlankNode(_) => ValueKind::BlankNode,
            RdfTerm::Literal(_) => ValueKind::Literal,
        }
    }
}

/// Native scalar for a literal label, following the datatype cast table
///
/// `xsd:int`, `xsd:integer`, `xsd:long` become integers and `xsd:float`,
/// `xsd:double` become floats, but only when the scalar's canonical rendering
/// equals the label. Everything else stays a string.
pub fn literal_scalar(literal: &Literal) -> PropertyValue {
    let label = literal.value();
    if literal.language().is_some() {
        return PropertyValue::String(label.to_string());
    }
    let datatype = literal.datatype();
    let datatype = datatype.as_str();

    if datatype == xsd::INT.as_str()
        || datatype == xsd::INTEGER.as_str()
        || datatype == xsd::LONG.as_str()
    {
        if let Ok(i) = label.parse::<i64>() {
            if i.to_string() == label {
                return PropertyValue::Integer(i);
            }
        }
    } else if datatype == xsd::FLOAT.as_str() || datatype == xsd::DOUBLE.as_str() {
        if let Ok(f) = label.parse::<f64>() {
            if f.to_string() == label {
                return PropertyValue::Float(f);
            }
        }
    }
    PropertyValue::String(label.to_string())
}

/// The property set of the vertex representing `term`
pub fn vertex_properties(term: &RdfTerm) -> Vec<(&'static str, PropertyValue)> {
    let kind = (KIND, PropertyValue::from(ValueKind::of(term).as_str()));
    match term {
        RdfTerm::NamedNode(n) => vec![kind, (VALUE, n.as_str().into())],
        RdfTerm::BlankNode(b) => vec![kind, (VALUE, b.as_str().into())],
        RdfTerm::Literal(l) => {
            let mut props = vec![kind, (VALUE, literal_scalar(l))];
            if let Some(datatype) = l.explicit_datatype() {
                props.push((DATATYPE, datatype.as_str().into()));
            }
            if let Some(language) = l.language() {
                props.push((LANGUAGE, language.into()));
            }
            props
        }
    }
}

/// Whether `vertex` represents exactly `term`
///
/// Literals must agree on label, datatype and language; a missing
/// `datatype`/`language` only matches a literal without one.
pub fn vertex_represents(vertex: &Vertex, term: &RdfTerm) -> bool {
    let expected = vertex_properties(term);
    let kind_matches = expected
        .iter()
        .all(|(key, value)| vertex.get_property(key) == Some(value));
    if !kind_matches {
        return false;
    }
    [DATATYPE, LANGUAGE]
        .iter()
        .all(|key| vertex.has_property(key) == expected.iter().any(|(k, _)| k == key))
}

/// Look up the vertex representing `term` without creating it
pub fn find_vertex<G: KeyIndexableGraph + ?Sized>(graph: &G, term: &RdfTerm) -> Option<VertexId> {
    let value = match term {
        RdfTerm::NamedNode(n) => PropertyValue::from(n.as_str()),
        RdfTerm::BlankNode(b) => PropertyValue::from(b.as_str()),
        RdfTerm::Literal(l) => literal_scalar(l),
    };
    graph.vertices_by_key(VALUE, &value).into_iter().find(|id| {
        graph
            .vertex(*id)
            .map_or(false, |vertex| vertex_represents(vertex, term))
    })
}

/// Find the vertex representing `term`, creating it when absent
pub fn value_to_vertex<G: KeyIndexableGraph + ?Sized>(
    graph: &mut G,
    term: &RdfTerm,
) -> GraphResult<VertexId> {
    if let Some(id) = find_vertex(graph, term) {
        return Ok(id);
    }
    let id = graph.add_vertex()?;
    for (key, value) in vertex_properties(term) {
        graph.set_vertex_property(id, key, value)?;
    }
    debug!("Created vertex {} for {}", id, term);
    Ok(id)
}

/// Rebuild the RDF value a vertex represents
pub fn vertex_to_value(vertex: &Vertex) -> SailResult<RdfTerm> {
    let kind = vertex
        .get_property(KIND)
        .and_then(PropertyValue::as_string)
        .and_then(ValueKind::parse)
        .ok_or_else(|| SailError::InvalidValue(format!("{} does not represent an RDF value", vertex.id)))?;
    let value = vertex
        .get_property(VALUE)
        .map(PropertyValue::to_lexical)
        .ok_or_else(|| SailError::InvalidValue(format!("{} has no value", vertex.id)))?;

    let term = match kind {
        ValueKind::Uri => RdfTerm::NamedNode(NamedNode::new_unchecked(value)),
        ValueKind::BlankNode => RdfTerm::BlankNode(BlankNode::from_str(&value)?),
        ValueKind::Literal => {
            let datatype = vertex
                .get_property(DATATYPE)
                .and_then(PropertyValue::as_string)
                .map(NamedNode::new_unchecked);
            let language = vertex.get_property(LANGUAGE).and_then(PropertyValue::as_string);
            RdfTerm::Literal(Literal::from_parts(value, datatype, language)?)
        }
    };
    Ok(term)
}

/// Rebuild the RDF value of the vertex with the given id
pub fn read_value<G: KeyIndexableGraph + ?Sized>(graph: &G, id: VertexId) -> SailResult<RdfTerm> {
    let vertex = graph.vertex(id).ok_or(GraphError::VertexNotFound(id))?;
    vertex_to_value(vertex)
}

/// The kind recorded on a vertex, `None` for control vertices
pub fn vertex_kind(vertex: &Vertex) -> Option<ValueKind> {
    vertex
        .get_property(KIND)
        .and_then(PropertyValue::as_string)
        .and_then(ValueKind::parse)
}

/// Quad fields resolved to their graph representation
///
/// `context` is `Some(None)` for the default graph and `None` when the
/// context is unbound.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyParts<'a> {
    pub subject: Option<VertexId>,
    pub predicate: Option<&'a str>,
    pub object: Option<VertexId>,
    pub context: Option<Option<&'a str>>,
}

/// Encode the index key of `pattern`, or `None` if a field it covers is unbound
///
/// Subject and object are keyed by vertex id, predicate and context by IRI,
/// and the default graph by [`DEFAULT_CONTEXT_KEY`]. IRIs never contain
/// spaces, so the space separator keeps keys unambiguous.
pub fn encode_index_key(pattern: &IndexPattern, parts: &KeyParts<'_>) -> Option<String> {
    let mut key = String::new();
    for (i, field) in pattern.fields().iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        match field {
            QuadField::Subject => key.push_str(&format!("#{}", parts.subject?.as_u64())),
            QuadField::Predicate => key.push_str(&format!("<{}>", parts.predicate?)),
            QuadField::Object => key.push_str(&format!("#{}", parts.object?.as_u64())),
            QuadField::Context => match parts.context? {
                Some(iri) => key.push_str(&format!("<{}>", iri)),
                None => key.push_str(DEFAULT_CONTEXT_KEY),
            },
        }
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;

    fn typed(label: &str, datatype: oxrdf::NamedNodeRef<'_>) -> Literal {
        Literal::new_typed_literal(label, NamedNode::new(datatype.as_str()).unwrap())
    }

    fn sample_values() -> Vec<RdfTerm> {
        vec![
            NamedNode::new("http://example.org/alice").unwrap().into(),
            BlankNode::from_str("b0").unwrap().into(),
            Literal::new_simple_literal("Alice").into(),
            Literal::new_language_tagged_literal("chat", "fr").unwrap().into(),
            typed("42", xsd::INT).into(),
            typed("042", xsd::INTEGER).into(),
            typed("2.5", xsd::DOUBLE).into(),
            typed("1.0", xsd::FLOAT).into(),
            typed("true", xsd::BOOLEAN).into(),
        ]
    }

    #[test]
    fn test_literal_cast_table() {
        assert_eq!(literal_scalar(&typed("42", xsd::INT)), PropertyValue::Integer(42));
        assert_eq!(literal_scalar(&typed("-7", xsd::LONG)), PropertyValue::Integer(-7));
        assert_eq!(literal_scalar(&typed("2.5", xsd::DOUBLE)), PropertyValue::Float(2.5));
        // Non-canonical labels stay strings so they round-trip exactly
        assert_eq!(literal_scalar(&typed("042", xsd::INT)), PropertyValue::String("042".into()));
        assert_eq!(literal_scalar(&typed("1.0", xsd::FLOAT)), PropertyValue::String("1.0".into()));
        assert_eq!(literal_scalar(&typed("abc", xsd::INT)), PropertyValue::String("abc".into()));
        assert_eq!(literal_scalar(&typed("true", xsd::BOOLEAN)), PropertyValue::String("true".into()));
    }

    #[test]
    fn test_vertex_properties() {
        let props = vertex_properties(&typed("42", xsd::INT).into());
        assert!(props.contains(&(KIND, "literal".into())));
        assert!(props.contains(&(VALUE, PropertyValue::Integer(42))));
        assert!(props.contains(&(DATATYPE, xsd::INT.as_str().into())));

        let props = vertex_properties(&Literal::new_simple_literal("x").into());
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_round_trip() {
        let mut graph = GraphStore::new();
        for value in sample_values() {
            let id = value_to_vertex(&mut graph, &value).unwrap();
            assert_eq!(read_value(&graph, id).unwrap(), value);
        }
    }

    #[test]
    fn test_value_to_vertex_reuses_vertex() {
        let mut graph = GraphStore::new();
        let alice: RdfTerm = NamedNode::new("http://example.org/alice").unwrap().into();
        let first = value_to_vertex(&mut graph, &alice).unwrap();
        let second = value_to_vertex(&mut graph, &alice).unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_literal_metadata_distinguishes_vertices() {
        let mut graph = GraphStore::new();
        let values: Vec<RdfTerm> = vec![
            Literal::new_simple_literal("42").into(),
            typed("42", xsd::INT).into(),
            typed("42", xsd::LONG).into(),
            Literal::new_language_tagged_literal("42", "en").unwrap().into(),
            NamedNode::new("http://example.org/42").unwrap().into(),
        ];
        let ids: Vec<VertexId> = values
            .iter()
            .map(|v| value_to_vertex(&mut graph, v).unwrap())
            .collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), values.len());
    }

    #[test]
    fn test_find_vertex_does_not_create() {
        let graph = GraphStore::new();
        let alice: RdfTerm = NamedNode::new("http://example.org/alice").unwrap().into();
        assert_eq!(find_vertex(&graph, &alice), None);
        assert_eq!(graph.vertex_count(), 0);
    }

    #[test]
    fn test_control_vertex_is_not_a_value() {
        let mut graph = GraphStore::new();
        let id = graph.add_vertex().unwrap();
        graph.set_vertex_property(id, VALUE, NAMESPACES_VERTEX.into()).unwrap();
        assert!(matches!(read_value(&graph, id), Err(SailError::InvalidValue(_))));
        assert_eq!(vertex_kind(graph.vertex(id).unwrap()), None);
    }

    #[test]
    fn test_encode_index_key() {
        let sp = IndexPattern::parse("sp").unwrap();
        let c = IndexPattern::parse("c").unwrap();
        let parts = KeyParts {
            subject: Some(VertexId::new(3)),
            predicate: Some("http://example.org/p"),
            object: None,
            context: Some(None),
        };
        assert_eq!(
            encode_index_key(&sp, &parts).as_deref(),
            Some("#3 <http://example.org/p>")
        );
        assert_eq!(encode_index_key(&c, &parts).as_deref(), Some("N"));

        let named = KeyParts {
            context: Some(Some("http://example.org/g")),
            ..parts
        };
        assert_eq!(encode_index_key(&c, &named).as_deref(), Some("<http://example.org/g>"));

        let po = IndexPattern::parse("po").unwrap();
        assert_eq!(encode_index_key(&po, &parts), None);
    }
}
