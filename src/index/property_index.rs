//! B-Tree based key index for fast property lookups

use crate::graph::PropertyValue;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Index for a single property key over one element class
///
/// `I` is the element id type (`VertexId` or `EdgeId`).
#[derive(Debug, Clone)]
pub struct PropertyIndex<I> {
    /// Value -> Set of element ids
    index: BTreeMap<PropertyValue, FxHashSet<I>>,
}

impl<I: Copy + Eq + Hash> PropertyIndex<I> {
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, value: PropertyValue, id: I) {
        self.index.entry(value).or_default().insert(id);
    }

    pub fn remove(&mut self, value: &PropertyValue, id: I) {
        if let Some(ids) = self.index.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                self.index.remove(value);
            }
        }
    }

    pub fn get(&self, value: &PropertyValue) -> Vec<I> {
        self.index
            .get(value)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of distinct indexed values
    pub fn distinct_values(&self) -> usize {
        self.index.len()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }
}

impl<I: Copy + Eq + Hash> Default for PropertyIndex<I> {
    fn default() -> Self {
        Self::new()
    }
}
