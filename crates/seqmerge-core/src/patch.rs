//! Replaying a diff against its previous sequence.

use thiserror::Error;

use crate::chunk::{Chunk, Diff};

/// Why a diff cannot be applied to a given previous sequence.
///
/// Diffs produced by [`crate::diff()`] never trigger these. They show up for
/// hand-built or corrupted diffs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("chunk {index} covers previous[{start}..{end}] but previous has {len} elements")]
    OutOfRange {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("chunk ranges are discontinuous at chunk {index}: expected previous index {expected}, found {found}")]
    Discontinuous {
        index: usize,
        expected: usize,
        found: usize,
    },
}

impl<E> Diff<E> {
    /// Check that the chunk ranges partition `0..previous_len` in order.
    ///
    /// Only range bounds are checked; elements are never compared.
    pub fn validate(&self, previous_len: usize) -> Result<(), PatchError> {
        let mut cursor = 0;
        for (index, chunk) in self.iter().enumerate() {
            let range = chunk.previous_range();
            if range.start > range.end || range.end > previous_len {
                return Err(PatchError::OutOfRange {
                    index,
                    start: range.start,
                    end: range.end,
                    len: previous_len,
                });
            }
            if range.start != cursor {
                return Err(PatchError::Discontinuous {
                    index,
                    expected: cursor,
                    found: range.start,
                });
            }
            cursor = range.end;
        }
        if cursor != previous_len {
            return Err(PatchError::Discontinuous {
                index: self.len(),
                expected: cursor,
                found: previous_len,
            });
        }
        Ok(())
    }
}

impl<E: Clone> Diff<E> {
    /// Apply this diff to `previous`. See [`patch`].
    pub fn apply(&self, previous: &[E]) -> Result<Vec<E>, PatchError> {
        patch(previous, self)
    }
}

/// Rebuild the next sequence from `previous` and a diff against it.
///
/// Unchanged chunks copy their slice of `previous`; every other chunk
/// contributes its own elements.
pub fn patch<E: Clone>(previous: &[E], diff: &Diff<E>) -> Result<Vec<E>, PatchError> {
    diff.validate(previous.len())?;

    let mut out = Vec::with_capacity(diff.next_len());
    for chunk in diff {
        match chunk {
            Chunk::Unchanged { previous: range, .. } => {
                out.extend_from_slice(&previous[range.clone()]);
            }
            Chunk::Inserted { elements, .. } | Chunk::Changed { elements, .. } => {
                out.extend_from_slice(elements);
            }
            Chunk::Deleted { .. } => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_empty_patch() {
        let out = patch::<char>(&[], &Diff::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let previous = chars("kitten sitting");
        let next = chars("sitting kitten");
        let d = diff(&previous, &next);
        assert_eq!(d.apply(&previous).unwrap(), next);
    }

    #[test]
    fn test_hand_built_diff() {
        let previous = chars("abc");
        let d = Diff::from_chunks(vec![
            Chunk::Unchanged {
                previous: 0..1,
                elements: vec!['a'],
            },
            Chunk::Changed {
                previous: 1..2,
                elements: vec!['X', 'Y'],
            },
            Chunk::Deleted { previous: 2..3 },
            Chunk::Inserted {
                at: 3,
                elements: vec!['!'],
            },
        ]);
        assert_eq!(patch(&previous, &d).unwrap(), chars("aXY!"));
    }

    #[test]
    fn test_out_of_range() {
        let previous = chars("ab");
        let d = Diff::from_chunks(vec![Chunk::Deleted { previous: 0..3 }]);
        assert_eq!(
            patch(&previous, &d),
            Err(PatchError::OutOfRange {
                index: 0,
                start: 0,
                end: 3,
                len: 2,
            })
        );
    }

    #[test]
    fn test_insert_anchor_past_end() {
        let previous = chars("ab");
        let d = Diff::from_chunks(vec![
            Chunk::Unchanged {
                previous: 0..2,
                elements: vec!['a', 'b'],
            },
            Chunk::Inserted {
                at: 5,
                elements: vec!['z'],
            },
        ]);
        assert!(matches!(
            patch(&previous, &d),
            Err(PatchError::OutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_gap_is_discontinuous() {
        let previous = chars("abc");
        let d = Diff::from_chunks(vec![
            Chunk::Unchanged {
                previous: 0..1,
                elements: vec!['a'],
            },
            Chunk::Deleted { previous: 2..3 },
        ]);
        assert_eq!(
            patch(&previous, &d),
            Err(PatchError::Discontinuous {
                index: 1,
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn test_short_coverage_is_discontinuous() {
        let previous = chars("abc");
        let d = Diff::from_chunks(vec![Chunk::Deleted { previous: 0..2 }]);
        assert_eq!(
            patch(&previous, &d),
            Err(PatchError::Discontinuous {
                index: 1,
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn test_unchanged_copies_previous_slice() {
        // The check is on bounds only; unchanged output always comes from previous.
        let previous = chars("ab");
        let d = Diff::from_chunks(vec![Chunk::Unchanged {
            previous: 0..2,
            elements: vec!['?', '?'],
        }]);
        assert_eq!(patch(&previous, &d).unwrap(), previous);
    }

    #[test]
    fn test_error_messages() {
        let err = PatchError::Discontinuous {
            index: 2,
            expected: 4,
            found: 6,
        };
        assert_eq!(
            err.to_string(),
            "chunk ranges are discontinuous at chunk 2: expected previous index 4, found 6"
        );
    }
}
