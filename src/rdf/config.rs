//! Quad store configuration

use super::error::{SailError, SailResult};
use crate::index::{IndexPatterns, DEFAULT_INDEX_PATTERNS};
use serde::{Deserialize, Serialize};

/// Construction parameters of a [`QuadStore`](super::QuadStore)
///
/// All settings are fixed for the lifetime of the store.
///
/// ```yaml
/// index_patterns: "sp,p,c,pc"
/// enforce_unique_statements: true
/// allow_blank_node_objects: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadStoreConfig {
    /// Comma-separated index pattern specification
    pub index_patterns: String,
    /// Re-adding an existing statement is a no-op instead of a duplicate edge
    pub enforce_unique_statements: bool,
    /// Accept statements whose object is a blank node
    pub allow_blank_node_objects: bool,
}

impl QuadStoreConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            index_patterns: DEFAULT_INDEX_PATTERNS.to_string(),
            enforce_unique_statements: true,
            allow_blank_node_objects: true,
        }
    }

    pub fn with_index_patterns(mut self, spec: impl Into<String>) -> Self {
        self.index_patterns = spec.into();
        self
    }

    pub fn with_unique_statements(mut self, enforce: bool) -> Self {
        self.enforce_unique_statements = enforce;
        self
    }

    pub fn with_blank_node_objects(mut self, allow: bool) -> Self {
        self.allow_blank_node_objects = allow;
        self
    }

    /// Load a configuration from YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> SailResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| SailError::Config(e.to_string()))
    }

    /// Parse and validate the index pattern specification
    pub fn parsed_patterns(&self) -> SailResult<IndexPatterns> {
        Ok(IndexPatterns::parse(&self.index_patterns)?)
    }
}

impl Default for QuadStoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuadStoreConfig::default();
        assert_eq!(config.index_patterns, "s,p,c,sp,pc");
        assert!(config.enforce_unique_statements);
        assert!(config.allow_blank_node_objects);
        assert_eq!(config.parsed_patterns().unwrap().len(), 5);
    }

    #[test]
    fn test_builder() {
        let config = QuadStoreConfig::new()
            .with_index_patterns("spoc,poc")
            .with_unique_statements(false)
            .with_blank_node_objects(false);
        assert_eq!(config.index_patterns, "spoc,poc");
        assert!(!config.enforce_unique_statements);
        assert!(!config.allow_blank_node_objects);
    }

    #[test]
    fn test_from_yaml() {
        let config = QuadStoreConfig::from_yaml_str(
            "index_patterns: \"sp,p,c,pc\"\nenforce_unique_statements: false\n",
        )
        .unwrap();
        assert_eq!(config.index_patterns, "sp,p,c,pc");
        assert!(!config.enforce_unique_statements);
        assert!(config.allow_blank_node_objects);
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        let result = QuadStoreConfig::from_yaml_str("index_patterns: [1, 2");
        assert!(matches!(result, Err(SailError::Config(_))));
    }

    #[test]
    fn test_invalid_patterns() {
        let config = QuadStoreConfig::new().with_index_patterns("sp,xpoc");
        assert!(matches!(config.parsed_patterns(), Err(SailError::Config(_))));
    }
}
