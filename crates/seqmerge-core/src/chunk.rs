//! Edit scripts as ordered lists of typed chunks.
//!
//! A [`Diff`] describes how to turn a *previous* sequence into a *next* one.
//! Its chunks walk the previous sequence from start to end: every index of the
//! previous sequence is consumed by exactly one chunk, and insertions sit at
//! empty anchors between indices. The merge engine relies on that coverage to
//! walk two diffs side by side.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The four kinds of chunk an edit script is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Unchanged,
    Inserted,
    Deleted,
    Changed,
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkKind::Unchanged => write!(f, "unchanged"),
            ChunkKind::Inserted => write!(f, "inserted"),
            ChunkKind::Deleted => write!(f, "deleted"),
            ChunkKind::Changed => write!(f, "changed"),
        }
    }
}

/// One contiguous operation of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chunk<E> {
    /// Elements carried over from the previous sequence. `elements` is a copy
    /// of `previous[range]`.
    Unchanged {
        previous: Range<usize>,
        elements: Vec<E>,
    },
    /// New elements placed before previous index `at`.
    Inserted { at: usize, elements: Vec<E> },
    /// Elements of the previous sequence that are dropped.
    Deleted { previous: Range<usize> },
    /// A deleted range replaced in place by new elements. Produced as one unit
    /// by the diff computer and merged as one unit.
    Changed {
        previous: Range<usize>,
        elements: Vec<E>,
    },
}

impl<E> Chunk<E> {
    pub fn kind(&self) -> ChunkKind {
        match self {
            Chunk::Unchanged { .. } => ChunkKind::Unchanged,
            Chunk::Inserted { .. } => ChunkKind::Inserted,
            Chunk::Deleted { .. } => ChunkKind::Deleted,
            Chunk::Changed { .. } => ChunkKind::Changed,
        }
    }

    /// The half-open range of the previous sequence this chunk consumes.
    /// Empty for insertions.
    pub fn previous_range(&self) -> Range<usize> {
        match self {
            Chunk::Unchanged { previous, .. }
            | Chunk::Deleted { previous }
            | Chunk::Changed { previous, .. } => previous.clone(),
            Chunk::Inserted { at, .. } => *at..*at,
        }
    }

    /// The elements this chunk contributes to the next sequence.
    pub fn elements(&self) -> &[E] {
        match self {
            Chunk::Unchanged { elements, .. }
            | Chunk::Inserted { elements, .. }
            | Chunk::Changed { elements, .. } => elements,
            Chunk::Deleted { .. } => &[],
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Chunk::Unchanged { .. })
    }

    /// Start of the consumed range, which is also the anchor of an insertion.
    pub fn start(&self) -> usize {
        self.previous_range().start
    }

    pub fn end(&self) -> usize {
        self.previous_range().end
    }
}

/// Element counts for a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Previous elements kept as-is.
    pub unchanged: usize,
    /// Elements added by inserted and changed chunks.
    pub inserted: usize,
    /// Previous elements removed by deleted and changed chunks.
    pub deleted: usize,
}

impl DiffStats {
    pub fn is_identity(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}

/// An ordered edit script from a previous sequence to a next one.
///
/// Diffs built by [`crate::diff()`] always satisfy the coverage invariant.
/// Diffs built by hand through [`Diff::from_chunks`] are checked when they are
/// applied or merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff<E> {
    chunks: Vec<Chunk<E>>,
}

impl<E> Default for Diff<E> {
    fn default() -> Self {
        Self { chunks: Vec::new() }
    }
}

impl<E> Diff<E> {
    /// Wrap hand-built chunks. No validation happens here.
    pub fn from_chunks(chunks: Vec<Chunk<E>>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[Chunk<E>] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Chunk<E>> {
        self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk<E>> {
        self.chunks.iter()
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// True when the diff only carries elements over.
    pub fn is_identity(&self) -> bool {
        self.chunks.iter().all(Chunk::is_unchanged)
    }

    /// Chunks that insert, delete or change something.
    pub fn changes(&self) -> impl Iterator<Item = &Chunk<E>> + '_ {
        self.chunks.iter().filter(|c| !c.is_unchanged())
    }

    /// Length of the previous sequence this diff covers.
    pub fn previous_len(&self) -> usize {
        self.chunks.last().map_or(0, Chunk::end)
    }

    /// Length of the sequence this diff produces.
    pub fn next_len(&self) -> usize {
        self.chunks.iter().map(|c| c.elements().len()).sum()
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for chunk in &self.chunks {
            let consumed = chunk.previous_range().len();
            match chunk {
                Chunk::Unchanged { .. } => stats.unchanged += consumed,
                Chunk::Inserted { elements, .. } => stats.inserted += elements.len(),
                Chunk::Deleted { .. } => stats.deleted += consumed,
                Chunk::Changed { elements, .. } => {
                    stats.deleted += consumed;
                    stats.inserted += elements.len();
                }
            }
        }
        stats
    }
}

impl<'a, E> IntoIterator for &'a Diff<E> {
    type Item = &'a Chunk<E>;
    type IntoIter = std::slice::Iter<'a, Chunk<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

impl<E> IntoIterator for Diff<E> {
    type Item = Chunk<E>;
    type IntoIter = std::vec::IntoIter<Chunk<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diff<char> {
        // "abcd" -> "xabYd"
        Diff::from_chunks(vec![
            Chunk::Inserted {
                at: 0,
                elements: vec!['x'],
            },
            Chunk::Unchanged {
                previous: 0..2,
                elements: vec!['a', 'b'],
            },
            Chunk::Changed {
                previous: 2..3,
                elements: vec!['Y'],
            },
            Chunk::Unchanged {
                previous: 3..4,
                elements: vec!['d'],
            },
        ])
    }

    #[test]
    fn test_chunk_accessors() {
        let ins: Chunk<char> = Chunk::Inserted {
            at: 3,
            elements: vec!['q'],
        };
        assert_eq!(ins.kind(), ChunkKind::Inserted);
        assert_eq!(ins.previous_range(), 3..3);
        assert_eq!(ins.elements(), &['q']);

        let del: Chunk<char> = Chunk::Deleted { previous: 1..4 };
        assert_eq!(del.kind(), ChunkKind::Deleted);
        assert!(del.elements().is_empty());
        assert_eq!(del.end(), 4);
    }

    #[test]
    fn test_lengths_and_stats() {
        let diff = sample();
        assert_eq!(diff.previous_len(), 4);
        assert_eq!(diff.next_len(), 5);
        assert_eq!(diff.changes().count(), 2);
        assert!(!diff.is_identity());
        assert_eq!(
            diff.stats(),
            DiffStats {
                unchanged: 3,
                inserted: 2,
                deleted: 1,
            }
        );
    }

    #[test]
    fn test_empty_diff_is_identity() {
        let diff: Diff<u8> = Diff::default();
        assert!(diff.is_identity());
        assert_eq!(diff.previous_len(), 0);
        assert!(diff.stats().is_identity());
    }

    #[test]
    fn test_serde_shape() {
        let diff = Diff::from_chunks(vec![
            Chunk::Deleted { previous: 0..1 },
            Chunk::Inserted {
                at: 1,
                elements: vec!["x".to_string()],
            },
        ]);
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json[0]["kind"], "deleted");
        assert_eq!(json[0]["previous"]["start"], 0);
        assert_eq!(json[1]["kind"], "inserted");
        assert_eq!(json[1]["elements"][0], "x");

        let back: Diff<String> = serde_json::from_value(json).unwrap();
        assert_eq!(back, diff);
    }
}
