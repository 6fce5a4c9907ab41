//! Minimal edit scripts between two sequences.
//!
//! The search itself is Myers' O(ND) middle-snake algorithm from the `similar`
//! crate, run directly over slices so elements only need `PartialEq`. We drive
//! it through our own [`DiffHook`] which folds the stream of equal / delete /
//! insert callbacks into [`Chunk`]s:
//!
//! - adjacent equal runs become one `Unchanged` chunk;
//! - every run of deletes and inserts between two equal runs becomes a single
//!   `Inserted`, `Deleted` or `Changed` chunk.
//!
//! Folding a whole change run into one chunk keeps the number of non-unchanged
//! chunks minimal, which is what the merge engine's conflict detection counts.

use std::convert::Infallible;
use std::ops::Range;
use std::time::Instant;

use similar::algorithms::{myers, DiffHook};

use crate::chunk::{Chunk, Diff};

/// Compute a minimal diff turning `previous` into `next`.
///
/// The result is deterministic for a given pair of inputs, and applying it to
/// `previous` with [`crate::patch()`] reproduces `next`.
pub fn diff<E: PartialEq + Clone>(previous: &[E], next: &[E]) -> Diff<E> {
    diff_with_deadline(previous, next, None)
}

/// Like [`diff`], but gives up on minimality once `deadline` has passed.
///
/// The returned script is always valid for `previous`; past the deadline the
/// search settles for a longer script instead of finding the shortest one.
pub fn diff_with_deadline<E: PartialEq + Clone>(
    previous: &[E],
    next: &[E],
    deadline: Option<Instant>,
) -> Diff<E> {
    let mut builder = ChunkBuilder::new(previous, next);
    let outcome = myers::diff_deadline(
        &mut builder,
        previous,
        0..previous.len(),
        next,
        0..next.len(),
        deadline,
    );
    match outcome {
        Ok(()) => {}
        Err(never) => match never {},
    }
    builder.finish_diff()
}

/// A run of deletes/inserts that has not been turned into a chunk yet.
#[derive(Debug, Clone)]
struct PendingChange {
    previous: Range<usize>,
    next: Range<usize>,
}

/// Collects `similar`'s callbacks into chunks.
struct ChunkBuilder<'a, E> {
    previous: &'a [E],
    next: &'a [E],
    chunks: Vec<Chunk<E>>,
    pending: Option<PendingChange>,
}

impl<'a, E: Clone> ChunkBuilder<'a, E> {
    fn new(previous: &'a [E], next: &'a [E]) -> Self {
        Self {
            previous,
            next,
            chunks: Vec::new(),
            pending: None,
        }
    }

    fn pending_at(&mut self, old_index: usize, new_index: usize) -> &mut PendingChange {
        self.pending.get_or_insert(PendingChange {
            previous: old_index..old_index,
            next: new_index..new_index,
        })
    }

    fn flush(&mut self) {
        let Some(change) = self.pending.take() else {
            return;
        };
        let elements = self.next[change.next.clone()].to_vec();
        let chunk = match (change.previous.is_empty(), elements.is_empty()) {
            (true, true) => return,
            (true, false) => Chunk::Inserted {
                at: change.previous.start,
                elements,
            },
            (false, true) => Chunk::Deleted {
                previous: change.previous,
            },
            (false, false) => Chunk::Changed {
                previous: change.previous,
                elements,
            },
        };
        self.chunks.push(chunk);
    }

    fn finish_diff(mut self) -> Diff<E> {
        self.flush();
        Diff::from_chunks(self.chunks)
    }
}

impl<E: Clone> DiffHook for ChunkBuilder<'_, E> {
    type Error = Infallible;

    fn equal(&mut self, old_index: usize, _new_index: usize, len: usize) -> Result<(), Infallible> {
        if len == 0 {
            return Ok(());
        }
        self.flush();
        let end = old_index + len;
        if let Some(Chunk::Unchanged { previous, elements }) = self.chunks.last_mut() {
            if previous.end == old_index {
                previous.end = end;
                elements.extend_from_slice(&self.previous[old_index..end]);
                return Ok(());
            }
        }
        self.chunks.push(Chunk::Unchanged {
            previous: old_index..end,
            elements: self.previous[old_index..end].to_vec(),
        });
        Ok(())
    }

    fn delete(&mut self, old_index: usize, old_len: usize, new_index: usize) -> Result<(), Infallible> {
        let change = self.pending_at(old_index, new_index);
        change.previous.end = old_index + old_len;
        Ok(())
    }

    fn insert(&mut self, old_index: usize, new_index: usize, new_len: usize) -> Result<(), Infallible> {
        let change = self.pending_at(old_index, new_index);
        change.next.end = new_index + new_len;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Infallible> {
        self.flush();
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::patch::patch;
    use proptest::prelude::*;

    fn arb_seq() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..5, 0..24)
    }

    proptest! {
        #[test]
        fn prop_round_trip(previous in arb_seq(), next in arb_seq()) {
            let d = diff(&previous, &next);
            prop_assert_eq!(patch(&previous, &d).unwrap(), next);
        }

        #[test]
        fn prop_identity_diff(x in arb_seq()) {
            let d = diff(&x, &x);
            prop_assert!(d.is_identity());
            prop_assert_eq!(d.stats().unchanged, x.len());
        }

        #[test]
        fn prop_changes_never_touch(previous in arb_seq(), next in arb_seq()) {
            let d = diff(&previous, &next);
            for pair in d.chunks().windows(2) {
                prop_assert!(pair[0].is_unchanged() || pair[1].is_unchanged());
            }
            prop_assert!(d.validate(previous.len()).is_ok());
        }
    }
}
