//! RDF quad store over a property graph
//!
//! This module makes any [`KeyIndexableGraph`](crate::graph::KeyIndexableGraph)
//! behave as an RDF quad store:
//! - RDF values persisted as vertices, statements as labeled edges
//! - Named graphs (contexts) with default-graph semantics
//! - Configurable compound edge indices for quad-pattern lookup
//! - Transactions with aggregated change events at commit
//! - Namespaces persisted on a control vertex
//! - Turtle, N-Triples and N-Quads loading and export
//!
//! # Example
//!
//! ```rust
//! use quadgraph::rdf::{QuadStore, QuadStoreConfig, NamedNode, Literal, QuadPattern};
//!
//! let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
//! let mut conn = store.connection();
//!
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let graph = NamedNode::new("http://example.org/people").unwrap();
//!
//! conn.add_statement(
//!     alice.clone().into(),
//!     name.into(),
//!     Literal::new_simple_literal("Alice").into(),
//!     Some(graph.clone()),
//! )
//! .unwrap();
//! conn.commit().unwrap();
//!
//! assert_eq!(conn.size(&[Some(graph)]).unwrap(), 1);
//! assert_eq!(conn.size(&[None]).unwrap(), 0);
//! ```

pub mod codec;
mod config;
mod connection;
mod error;
mod event;
pub mod matcher;
mod namespace;
mod serialization;
mod store;
mod types;

pub use types::{
    RdfTerm, RdfSubject, RdfPredicate, RdfObject,
    NamedNode, BlankNode, Literal, Triple, Quad,
    QuadPattern, RdfError, RdfResult,
};

pub use config::QuadStoreConfig;
pub use connection::{QuadStoreConnection, StatementIterator};
pub use error::{SailError, SailResult};
pub use event::{ListenerId, SailChangeEvent, SailChangedListener};
pub use namespace::Namespace;
pub use store::QuadStore;

pub use serialization::{
    ParsedDocument, RdfFormat, RdfParser, RdfSerializer,
    ParseError, ParseResult,
    SerializeError, SerializeResult,
    TurtleParserWrapper, TurtleSerializerWrapper,
};
