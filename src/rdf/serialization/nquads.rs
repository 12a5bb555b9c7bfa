//! N-Triples and N-Quads implementation

use super::convert::{rio_object, rio_subject, BlankNodeScope};
use super::{ParseError, ParseResult, ParsedDocument, SerializeError, SerializeResult};
use crate::rdf::Quad;
use rio_api::formatter::{QuadsFormatter, TriplesFormatter};
use rio_api::model;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{NQuadsFormatter, NQuadsParser, NTriplesFormatter, NTriplesParser};
use std::io::{BufReader, Cursor};

/// Parse an N-Triples document into default-graph quads
pub fn parse_ntriples(input: &str) -> ParseResult<ParsedDocument> {
    let mut parser = NTriplesParser::new(BufReader::new(Cursor::new(input)));
    let mut scope = BlankNodeScope::new();
    let mut quads = Vec::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        quads.push(scope.triple(t)?);
        Ok(())
    })?;
    Ok(ParsedDocument {
        quads,
        prefixes: Vec::new(),
    })
}

/// Parse an N-Quads document
pub fn parse_nquads(input: &str) -> ParseResult<ParsedDocument> {
    let mut parser = NQuadsParser::new(BufReader::new(Cursor::new(input)));
    let mut scope = BlankNodeScope::new();
    let mut quads = Vec::new();
    parser.parse_all(&mut |q| -> Result<(), ParseError> {
        quads.push(scope.quad(q)?);
        Ok(())
    })?;
    Ok(ParsedDocument {
        quads,
        prefixes: Vec::new(),
    })
}

/// Serialize quads to N-Triples, dropping graph names
pub fn serialize_ntriples(quads: &[Quad]) -> SerializeResult<String> {
    let mut formatter = NTriplesFormatter::new(Vec::new());
    for quad in quads {
        let mut datatype = None;
        let triple = model::Triple {
            subject: rio_subject(&quad.subject),
            predicate: model::NamedNode {
                iri: quad.predicate.as_str(),
            },
            object: rio_object(&quad.object, &mut datatype),
        };
        formatter
            .format(&triple)
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    }
    let output = formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Serialize quads to N-Quads
pub fn serialize_nquads(quads: &[Quad]) -> SerializeResult<String> {
    let mut formatter = NQuadsFormatter::new(Vec::new());
    for quad in quads {
        let mut datatype = None;
        let rio_quad = model::Quad {
            subject: rio_subject(&quad.subject),
            predicate: model::NamedNode {
                iri: quad.predicate.as_str(),
            },
            object: rio_object(&quad.object, &mut datatype),
            graph_name: quad
                .graph
                .as_ref()
                .map(|g| model::GraphName::NamedNode(model::NamedNode { iri: g.as_str() })),
        };
        formatter
            .format(&rio_quad)
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    }
    let output = formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}
