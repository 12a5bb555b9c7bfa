//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL), whose prefixes are registered as namespaces on load
//! - N-Triples (NT)
//! - N-Quads (NQ), the only format that carries named graphs
//!
//! Every load mints fresh blank nodes, so loading the same document twice
//! yields two copies of its blank-node statements.

mod convert;
mod nquads;
mod turtle;

pub use turtle::{TurtleParserWrapper, TurtleSerializerWrapper};

use super::connection::QuadStoreConnection;
use super::error::SailResult;
use super::namespace::Namespace;
use super::types::{NamedNode, Quad, QuadPattern};
use crate::graph::KeyIndexableGraph;
use rio_turtle::TurtleError;
use thiserror::Error;
use tracing::info;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq)
    NQuads,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "nq" => Some(RdfFormat::NQuads),
            _ => None,
        }
    }

    /// Whether documents in this format can name graphs
    pub fn supports_contexts(&self) -> bool {
        matches!(self, RdfFormat::NQuads)
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<TurtleError> for ParseError {
    fn from(e: TurtleError) -> Self {
        ParseError::Parse(e.to_string())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// Statements and prefixes read from one document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub quads: Vec<Quad>,
    pub prefixes: Vec<Namespace>,
}

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a string
    pub fn parse(input: &str, format: RdfFormat) -> ParseResult<ParsedDocument> {
        match format {
            RdfFormat::Turtle => TurtleParserWrapper::parse(input),
            RdfFormat::NTriples => nquads::parse_ntriples(input),
            RdfFormat::NQuads => nquads::parse_nquads(input),
        }
    }

    /// Parse RDF data from a file
    pub fn parse_file(path: &std::path::Path, format: RdfFormat) -> ParseResult<ParsedDocument> {
        let input = std::fs::read_to_string(path)?;
        Self::parse(&input, format)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize quads to a string
    pub fn serialize(quads: &[Quad], format: RdfFormat) -> SerializeResult<String> {
        match format {
            RdfFormat::Turtle => TurtleSerializerWrapper::serialize(quads),
            RdfFormat::NTriples => nquads::serialize_ntriples(quads),
            RdfFormat::NQuads => nquads::serialize_nquads(quads),
        }
    }

    /// Serialize quads to a file
    pub fn serialize_file(quads: &[Quad], path: &std::path::Path, format: RdfFormat) -> SerializeResult<()> {
        let output = Self::serialize(quads, format)?;
        std::fs::write(path, output)?;
        Ok(())
    }
}

impl<G: KeyIndexableGraph> QuadStoreConnection<G> {
    /// Load a document inside the connection's transaction
    ///
    /// Statements without a graph go to `context` (the default graph when
    /// `None`). Document prefixes are registered as namespaces. Returns the
    /// number of statements actually added.
    pub fn load(&mut self, input: &str, format: RdfFormat, context: Option<&NamedNode>) -> SailResult<usize> {
        let doc = RdfParser::parse(input, format)?;
        for namespace in &doc.prefixes {
            self.set_namespace(&namespace.prefix, &namespace.iri)?;
        }
        let mut added = 0;
        for mut quad in doc.quads {
            if quad.graph.is_none() {
                quad.graph = context.cloned();
            }
            if self.add_quad(&quad)? {
                added += 1;
            }
        }
        info!("Loaded {} statements ({:?})", added, format);
        Ok(added)
    }

    /// Serialize every statement
    pub fn export(&self, format: RdfFormat) -> SailResult<String> {
        let quads: Vec<Quad> = self.get_statements(&QuadPattern::any())?.collect();
        Ok(RdfSerializer::serialize(&quads, format)?)
    }
}
