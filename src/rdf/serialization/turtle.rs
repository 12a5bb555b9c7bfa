//! Turtle format implementation

use super::convert::{rio_object, rio_subject, BlankNodeScope};
use super::{ParseError, ParseResult, ParsedDocument, SerializeError, SerializeResult};
use crate::rdf::{Namespace, Quad};
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::{BufReader, Cursor};

/// Turtle parser
pub struct TurtleParserWrapper;

impl TurtleParserWrapper {
    /// Parse a Turtle document into default-graph quads and its prefixes
    pub fn parse(input: &str) -> ParseResult<ParsedDocument> {
        let mut reader = BufReader::new(Cursor::new(input));
        let mut parser = TurtleParser::new(&mut reader, None);
        let mut scope = BlankNodeScope::new();
        let mut quads = Vec::new();

        parser.parse_all(&mut |t| -> Result<(), ParseError> {
            quads.push(scope.triple(t)?);
            Ok(())
        })?;

        let mut prefixes: Vec<Namespace> = parser
            .prefixes()
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.as_str(), iri.as_str()))
            .collect();
        prefixes.sort();

        Ok(ParsedDocument { quads, prefixes })
    }
}

/// Turtle serializer
pub struct TurtleSerializerWrapper;

impl TurtleSerializerWrapper {
    /// Serialize the triples of `quads` to Turtle; graph names are dropped
    pub fn serialize(quads: &[Quad]) -> SerializeResult<String> {
        let mut formatter = TurtleFormatter::new(Vec::new());

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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{RdfObject, RdfSubject};

    #[test]
    fn test_turtle_parse() {
        let input = r#"
            @prefix ex: <http://example.org/> .
            ex:alice ex:knows ex:bob ;
                     ex:name "Alice"@en .
        "#;
        let doc = TurtleParserWrapper::parse(input).unwrap();
        assert_eq!(doc.quads.len(), 2);
        assert!(doc.quads.iter().all(|q| q.graph.is_none()));
        assert_eq!(doc.prefixes, vec![Namespace::new("ex", "http://example.org/")]);
    }

    #[test]
    fn test_turtle_blank_nodes_are_fresh_per_parse() {
        let input = r#"_:x <http://example.org/p> "v" ."#;
        let first = TurtleParserWrapper::parse(input).unwrap();
        let second = TurtleParserWrapper::parse(input).unwrap();
        assert!(matches!(first.quads[0].subject, RdfSubject::BlankNode(_)));
        assert_ne!(first.quads[0].subject, second.quads[0].subject);
    }

    #[test]
    fn test_turtle_parse_error() {
        assert!(matches!(
            TurtleParserWrapper::parse("<http://example.org/a> <http://example.org/b> ."),
            Err(ParseError::Parse(_))
        ));
    }

    #[test]
    fn test_turtle_roundtrip() {
        let input = r#"<http://example.org/a> <http://example.org/b> "c" ."#;
        let doc = TurtleParserWrapper::parse(input).unwrap();
        let output = TurtleSerializerWrapper::serialize(&doc.quads).unwrap();
        assert!(output.contains("http://example.org/a"));

        let again = TurtleParserWrapper::parse(&output).unwrap();
        assert_eq!(again.quads, doc.quads);
        assert!(matches!(again.quads[0].object, RdfObject::Literal(_)));
    }
}
