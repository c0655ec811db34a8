use crate::range::{IndexSet, MAX_ARRAY_SIZE, MAX_INDEX_VALUE};

use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("error parsing arraySpec range: '{segment}'. Expect 2, got {parts}")]
    Syntax { segment: String, parts: usize },

    #[error("error getting start index of range '{segment}': {source}")]
    Start {
        segment: String,
        source: ParseIntError,
    },

    #[error("error getting end index of range '{segment}': {source}")]
    End {
        segment: String,
        source: ParseIntError,
    },

    #[error("exceeded index range, must between 0 and {max}, got: {start} and {end}")]
    OutOfRange { max: i64, start: i64, end: i64 },

    #[error("exceeded maximum array size: {max}")]
    TooManyIndices { max: usize },
}

/// Decode a range expression such as `1-5, 7 - 8, 10` into its index set.
///
/// Segments are evaluated left to right and the first failing segment decides
/// the error. The size cap counts distinct indices, so overlapping ranges are
/// not double-counted.
pub fn decode(expression: &str) -> Result<IndexSet, DecodeError> {
    let mut out = IndexSet::new();

    for segment in expression.split(',') {
        let (start, end) = parse_segment(segment)?;

        // Bounds are already inside [0, MAX_INDEX_VALUE], so they fit in u32.
        for index in start..=end {
            if out.insert(index as u32) && out.len() > MAX_ARRAY_SIZE {
                return Err(DecodeError::TooManyIndices {
                    max: MAX_ARRAY_SIZE,
                });
            }
        }
    }

    Ok(out)
}

/// Parse one `N` or `N-M` segment into an ordered, in-range pair.
fn parse_segment(segment: &str) -> Result<(i64, i64), DecodeError> {
    let bounds: Vec<&str> = segment.split('-').collect();
    if bounds.len() > 2 {
        return Err(DecodeError::Syntax {
            segment: segment.to_string(),
            parts: bounds.len(),
        });
    }

    let start = bounds[0]
        .trim()
        .parse::<i64>()
        .map_err(|source| DecodeError::Start {
            segment: segment.to_string(),
            source,
        })?;

    let end = match bounds.get(1) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|source| DecodeError::End {
                segment: segment.to_string(),
                source,
            })?,
        None => start,
    };

    let (start, end) = if start > end { (end, start) } else { (start, end) };

    if start < 0 || end > MAX_INDEX_VALUE {
        return Err(DecodeError::OutOfRange {
            max: MAX_INDEX_VALUE,
            start,
            end,
        });
    }

    Ok((start, end))
}
