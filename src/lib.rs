//! Quadgraph
//!
//! An RDF quad store layered over a key-indexable property graph, with
//! named graphs, transactions, change notification and a basic SPARQL
//! evaluator.
//!
//! # Architecture
//!
//! - [`graph`]: the property graph interface and an in-memory backend
//! - [`index`]: key indices and the index patterns selecting compound edge keys
//! - [`rdf`]: value codec, quad pattern matching, mutations with orphan
//!   collection, connections, namespaces and RDF file formats
//! - [`sparql`]: query evaluation over any statement source
//!
//! Each RDF value is one vertex. Each statement is one edge from subject to
//! object, labeled with the predicate IRI, carrying its context and one
//! index key per configured pattern.
//!
//! ## Example Usage
//!
//! ```rust
//! use quadgraph::rdf::{NamedNode, QuadPattern, QuadStore, QuadStoreConfig};
//!
//! let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
//! let mut conn = store.connection();
//!
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let knows = NamedNode::new("http://xmlns.com/foaf/0.1/knows").unwrap();
//! let bob = NamedNode::new("http://example.org/bob").unwrap();
//!
//! conn.add_statement(alice.clone().into(), knows.into(), bob.into(), None).unwrap();
//! conn.commit().unwrap();
//!
//! let pattern = QuadPattern::new(Some(alice.into()), None, None, vec![]);
//! assert_eq!(conn.get_statements(&pattern).unwrap().count(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod index;
pub mod rdf;
pub mod sparql;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeId, GraphError, GraphFeatures, GraphResult, GraphStore, KeyIndexableGraph,
    PropertyMap, PropertyValue, Vertex, VertexId,
};

pub use index::{IndexPattern, IndexPatterns, PatternError, DEFAULT_INDEX_PATTERNS};

pub use rdf::{
    BlankNode, Literal, NamedNode, Namespace, Quad, QuadPattern, QuadStore, QuadStoreConfig,
    QuadStoreConnection, RdfFormat, RdfObject, RdfPredicate, RdfSubject, RdfTerm, SailChangeEvent,
    SailChangedListener, SailError, SailResult, Triple,
};

pub use sparql::{
    QuerySolution, ResultFormat, SparqlEngine, SparqlError, SparqlResult, SparqlResults,
    TripleSource,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
