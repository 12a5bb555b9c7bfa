//! Conversions between rio's borrowed model and the owned RDF types
//!
//! Parsing goes through a [`BlankNodeScope`]: blank node labels only mean
//! something inside one document, so every load mints fresh blank nodes.

use super::{ParseError, ParseResult};
use crate::rdf::{BlankNode, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use rio_api::model;
use std::collections::HashMap;

/// Document-local blank node labels mapped to fresh blank nodes
#[derive(Debug, Default)]
pub(super) struct BlankNodeScope {
    nodes: HashMap<String, BlankNode>,
}

impl BlankNodeScope {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn resolve(&mut self, label: &str) -> BlankNode {
        self.nodes
            .entry(label.to_string())
            .or_insert_with(BlankNode::new)
            .clone()
    }

    pub(super) fn subject(&mut self, s: model::Subject<'_>) -> ParseResult<RdfSubject> {
        match s {
            model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(named_node(n)?)),
            model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(self.resolve(b.id))),
            _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
        }
    }

    pub(super) fn object(&mut self, o: model::Term<'_>) -> ParseResult<RdfObject> {
        match o {
            model::Term::NamedNode(n) => Ok(RdfObject::NamedNode(named_node(n)?)),
            model::Term::BlankNode(b) => Ok(RdfObject::BlankNode(self.resolve(b.id))),
            model::Term::Literal(l) => Ok(RdfObject::Literal(literal(l)?)),
            _ => Err(ParseError::Parse("Unsupported object type".to_string())),
        }
    }

    pub(super) fn triple(&mut self, t: model::Triple<'_>) -> ParseResult<Quad> {
        Ok(Quad::new(
            self.subject(t.subject)?,
            RdfPredicate::from(named_node(t.predicate)?),
            self.object(t.object)?,
            None,
        ))
    }

    pub(super) fn quad(&mut self, q: model::Quad<'_>) -> ParseResult<Quad> {
        let graph = match q.graph_name {
            None => None,
            Some(model::GraphName::NamedNode(n)) => Some(named_node(n)?),
            Some(model::GraphName::BlankNode(b)) => {
                return Err(ParseError::Parse(format!(
                    "blank node graph name _:{} cannot name a context",
                    b.id
                )))
            }
        };
        Ok(Quad::new(
            self.subject(q.subject)?,
            RdfPredicate::from(named_node(q.predicate)?),
            self.object(q.object)?,
            graph,
        ))
    }
}

fn named_node(n: model::NamedNode<'_>) -> ParseResult<NamedNode> {
    NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn literal(l: model::Literal<'_>) -> ParseResult<Literal> {
    match l {
        model::Literal::Simple { value } => Ok(Literal::new_simple_literal(value)),
        model::Literal::LanguageTaggedString { value, language } => {
            Literal::new_language_tagged_literal(value, language)
                .map_err(|e| ParseError::Parse(e.to_string()))
        }
        model::Literal::Typed { value, datatype } => {
            Ok(Literal::new_typed_literal(value, named_node(datatype)?))
        }
    }
}

/// Borrowed rio view of a subject
pub(super) fn rio_subject(s: &RdfSubject) -> model::Subject<'_> {
    match s {
        RdfSubject::NamedNode(n) => model::Subject::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => model::Subject::BlankNode(model::BlankNode { id: b.as_str() }),
    }
}

/// Borrowed rio view of an object; `datatype` keeps a typed literal's
/// datatype IRI alive for the returned term
pub(super) fn rio_object<'a>(o: &'a RdfObject, datatype: &'a mut Option<NamedNode>) -> model::Term<'a> {
    match o {
        RdfObject::NamedNode(n) => model::Term::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => model::Term::BlankNode(model::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => {
            if let Some(language) = l.language() {
                return model::Term::Literal(model::Literal::LanguageTaggedString {
                    value: l.value(),
                    language,
                });
            }
            *datatype = l.explicit_datatype();
            let datatype: &'a Option<NamedNode> = datatype;
            match datatype {
                Some(dt) => model::Term::Literal(model::Literal::Typed {
                    value: l.value(),
                    datatype: model::NamedNode { iri: dt.as_str() },
                }),
                None => model::Term::Literal(model::Literal::Simple { value: l.value() }),
            }
        }
    }
}
