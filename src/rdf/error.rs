//! Quad store errors

use super::serialization::{ParseError, SerializeError};
use super::types::RdfError;
use crate::graph::GraphError;
use crate::index::PatternError;
use thiserror::Error;

/// Errors raised by a quad store and its connections
#[derive(Error, Debug)]
pub enum SailError {
    /// Invalid construction parameters
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation the value or backend cannot support
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Failure reported by the graph backend, propagated unchanged
    #[error("Store error: {0}")]
    Store(#[from] GraphError),

    /// A graph element that does not decode to an RDF value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// `begin` called while a transaction is open
    #[error("A transaction is already active on this connection")]
    TransactionActive,

    /// Another connection holds uncommitted writes on the same store
    #[error("Another connection has an uncommitted write transaction")]
    WriteConflict,

    /// RDF document could not be read
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// RDF document could not be written
    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),
}

impl From<PatternError> for SailError {
    fn from(e: PatternError) -> Self {
        SailError::Config(e.to_string())
    }
}

impl From<RdfError> for SailError {
    fn from(e: RdfError) -> Self {
        SailError::InvalidValue(e.to_string())
    }
}

pub type SailResult<T> = Result<T, SailError>;
