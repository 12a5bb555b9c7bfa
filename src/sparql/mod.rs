//! SPARQL query support
//!
//! Queries are parsed with `spargebra` and evaluated against any
//! [`TripleSource`], which quad store connections implement. The evaluator
//! covers basic graph patterns combined with:
//!
//! - `Join`
//! - `Project`, `Distinct`, `Reduced`
//! - `Slice` (OFFSET / LIMIT)
//! - `GRAPH <iri>` and `GRAPH ?g`
//!
//! for `SELECT` and `ASK` queries. Other algebra operators and query forms
//! return [`SparqlError::Unsupported`].
//!
//! Outside a `GRAPH` clause the default graph is the union of all contexts.
//!
//! # Example
//!
//! ```rust
//! use quadgraph::rdf::{QuadStore, QuadStoreConfig, RdfFormat};
//! use quadgraph::sparql::{SparqlEngine, SparqlResults};
//!
//! let store = QuadStore::in_memory(QuadStoreConfig::default()).unwrap();
//! let mut conn = store.connection();
//! conn.load(
//!     r#"@prefix foaf: <http://xmlns.com/foaf/0.1/> .
//!        <http://example.org/alice> foaf:name "Alice" ."#,
//!     RdfFormat::Turtle,
//!     None,
//! )
//! .unwrap();
//! conn.commit().unwrap();
//!
//! let engine = SparqlEngine::new(&conn);
//! let query = r#"
//!     PREFIX foaf: <http://xmlns.com/foaf/0.1/>
//!     SELECT ?name WHERE {
//!         ?person foaf:name ?name .
//!     }
//! "#;
//!
//! let results = engine.query(query).unwrap();
//! assert_eq!(results.len(), 1);
//! ```

mod executor;
mod optimizer;
mod parser;
mod results;
mod source;

pub use executor::SparqlExecutor;
pub use optimizer::SparqlOptimizer;
pub use parser::SparqlParser;
pub use results::{QuerySolution, ResultFormat, SparqlResults};
pub use source::TripleSource;

use crate::rdf::SailError;
use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Query form or algebra operator the evaluator does not cover
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Statement source failure
    #[error("Store error: {0}")]
    Store(#[from] SailError),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

/// SPARQL query engine over a statement source
pub struct SparqlEngine<'a, S: TripleSource + ?Sized> {
    executor: SparqlExecutor<'a, S>,
}

impl<'a, S: TripleSource + ?Sized> SparqlEngine<'a, S> {
    /// Create a new SPARQL engine
    pub fn new(source: &'a S) -> Self {
        Self {
            executor: SparqlExecutor::new(source),
        }
    }

    /// Parse and execute a SPARQL query
    pub fn query(&self, query_str: &str) -> SparqlResult<SparqlResults> {
        let query = SparqlParser::parse(query_str)?;
        self.executor.execute(&query)
    }
}
