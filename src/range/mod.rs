//! Compact index-range notation used by `arraySpec` and the status index fields.
//!
//! Grammar: comma-separated `N` or `N-M` tokens, whitespace allowed around
//! each bound. Example: `1,3,5,7-9` => {1, 3, 5, 7, 8, 9}

pub mod decode;
pub mod encode;

pub use decode::{DecodeError, decode};
pub use encode::{IndexRange, Ranges, encode, encode_matching};

use std::collections::BTreeSet;

/// Largest index expressible in a range expression.
pub const MAX_INDEX_VALUE: i64 = 9_999_999;

/// Largest number of distinct indices a single expression may describe.
pub const MAX_ARRAY_SIZE: usize = 1000;

/// Ordered set of work-item indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSet(BTreeSet<u32>);

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    /// Returns true if the index was not already present.
    pub fn insert(&mut self, index: u32) -> bool {
        self.0.insert(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Canonical comma-joined range string, e.g. `1,3-5`.
    pub fn to_range_string(&self) -> String {
        encode(self.iter())
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<u32> for IndexSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for IndexSet {
    type Item = u32;
    type IntoIter = std::collections::btree_set::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
