use std::collections::BTreeMap;
use std::fmt;

/// A run of consecutive indices, rendered as `start-end` or a bare `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Lazily merges sorted indices into consecutive runs.
///
/// Clone before consuming to replay the sequence.
#[derive(Debug, Clone)]
pub struct Ranges {
    indices: Vec<u32>,
    pos: usize,
}

impl Iterator for Ranges {
    type Item = IndexRange;

    fn next(&mut self) -> Option<IndexRange> {
        let start = *self.indices.get(self.pos)?;
        let mut end = start;
        self.pos += 1;

        while let Some(&next) = self.indices.get(self.pos) {
            if end.checked_add(1) != Some(next) {
                break;
            }
            end = next;
            self.pos += 1;
        }

        Some(IndexRange { start, end })
    }
}

/// Encode indices (any order, duplicates allowed) as ascending runs.
pub fn encode(indices: impl IntoIterator<Item = u32>) -> Ranges {
    let mut indices: Vec<u32> = indices.into_iter().collect();
    indices.sort_unstable();
    indices.dedup();
    Ranges { indices, pos: 0 }
}

/// Encode only the observed indices whose value satisfies `keep`.
pub fn encode_matching<T>(observations: &BTreeMap<u32, T>, keep: impl Fn(&T) -> bool) -> Ranges {
    encode(
        observations
            .iter()
            .filter(|(_, value)| keep(value))
            .map(|(index, _)| *index),
    )
}
