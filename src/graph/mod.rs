//! Property graph layer
//!
//! This module implements the graph a quad store persists into:
//! - Vertices with key/value properties
//! - Directed, labeled edges with properties, parallel edges allowed
//! - Key indices over vertex and edge properties
//! - Commit/rollback through an undo journal

pub mod backend;
pub mod edge;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use backend::{GraphFeatures, KeyIndexableGraph};
pub use edge::Edge;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, ElementKind, VertexId};
pub use vertex::Vertex;
