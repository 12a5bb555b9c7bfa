//! SPARQL parser using spargebra library

use super::{SparqlError, SparqlResult};
use spargebra::Query;

/// SPARQL parser
pub struct SparqlParser;

impl SparqlParser {
    /// Parse a SPARQL query string
    pub fn parse(query: &str) -> SparqlResult<Query> {
        Query::parse(query, None).map_err(|e| SparqlError::Parse(e.to_string()))
    }
}
