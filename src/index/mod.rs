//! Indexing module
//!
//! Key indices over graph elements, and the index pattern specifications
//! that decide which compound edge indices a quad store maintains.

pub mod manager;
pub mod pattern;
pub mod property_index;

pub use manager::IndexManager;
pub use pattern::{
    BoundFields, IndexPattern, IndexPatterns, PatternError, PatternResult, QuadField,
    DEFAULT_INDEX_PATTERNS,
};
pub use property_index::PropertyIndex;
