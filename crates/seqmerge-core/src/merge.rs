//! Three-way merge of two diffs against a common ancestor.
//!
//! Both diffs cover the ancestor (`previous`) completely, so their changes
//! can be walked in ancestor order. Stretches of the ancestor that neither
//! side touched are copied through. Everything else is grouped into
//! *regions*: a region opens at the earliest pending change and keeps
//! absorbing changes from either side that start at its first index or
//! strictly inside it. Changes sharing an anchor always land in the same
//! region; an insertion exactly at a region's end is adjacent and is not
//! absorbed.
//!
//! Per region, each side's output is its changed elements plus the ancestor
//! elements it left alone in between. Then:
//!
//! | situation                              | emitted                      | conflict |
//! |----------------------------------------|------------------------------|----------|
//! | only one side changed                  | that side                    | no       |
//! | both outputs equal                     | once                         | no       |
//! | both sides only delete                 | ancestor minus both deletes  | no       |
//! | empty ancestor                         | both, in insert order        | no       |
//! | both inserted at one anchor            | both, in insert order        | insert/insert |
//! | one side only deletes                  | the other side               | delete/change |
//! | one side only inserts, other rewrote   | insertions and the rewrite   | change/change |
//! | both rewrote the region                | both, in insert order        | change/change |
//!
//! `MergeConfig::fallback_on_conflict` replaces the policy for conflicts,
//! except where the chosen side has nothing for the region.

use std::ops::Range;

use crate::chunk::{Chunk, Diff};
use crate::config::{InsertOrder, MergeConfig, Side};
use crate::conflict::{Conflict, ConflictKind, MergeResult};
use crate::diff::diff;
use crate::patch::PatchError;

/// Merge `current` and `next`, two descendants of `previous`.
///
/// Never fails: conflicts are resolved by policy and reported in the result.
pub fn merge<E: PartialEq + Clone>(
    previous: &[E],
    current: &[E],
    next: &[E],
    config: Option<&MergeConfig>,
) -> MergeResult<E> {
    let current_diff = diff(previous, current);
    let next_diff = diff(previous, next);
    let defaults = MergeConfig::default();
    merge_walk(previous, current_diff, next_diff, config.unwrap_or(&defaults))
}

/// Merge two precomputed diffs of `previous`.
///
/// Both diffs are checked against `previous` first; a diff that does not
/// cover it is reported as a [`PatchError`] rather than merged.
pub fn merge_diffs<E: PartialEq + Clone>(
    previous: &[E],
    current_diff: Diff<E>,
    next_diff: Diff<E>,
    config: Option<&MergeConfig>,
) -> Result<MergeResult<E>, PatchError> {
    current_diff.validate(previous.len())?;
    next_diff.validate(previous.len())?;
    let defaults = MergeConfig::default();
    Ok(merge_walk(
        previous,
        current_diff,
        next_diff,
        config.unwrap_or(&defaults),
    ))
}

/// A non-unchanged chunk and its position in its diff.
#[derive(Debug, Clone)]
struct Change {
    index: usize,
    range: Range<usize>,
}

fn collect_changes<E>(diff: &Diff<E>) -> Vec<Change> {
    diff.iter()
        .enumerate()
        .filter(|(_, chunk)| !chunk.is_unchanged())
        .map(|(index, chunk)| Change {
            index,
            range: chunk.previous_range(),
        })
        .collect()
}

/// One side's view of the walk.
struct SideWalk<'a, E> {
    diff: &'a Diff<E>,
    changes: Vec<Change>,
    /// First change not yet consumed by a region.
    cursor: usize,
}

impl<'a, E: Clone> SideWalk<'a, E> {
    fn new(diff: &'a Diff<E>) -> Self {
        Self {
            diff,
            changes: collect_changes(diff),
            cursor: 0,
        }
    }

    fn peek_start(&self) -> Option<usize> {
        self.changes.get(self.cursor).map(|c| c.range.start)
    }

    /// Pull in every pending change that overlaps `region`, widening it.
    fn absorb(&self, members: &mut Range<usize>, region: &mut Range<usize>) -> bool {
        let mut grew = false;
        while let Some(change) = self.changes.get(members.end) {
            if change.range.start != region.start && change.range.start >= region.end {
                break;
            }
            region.end = region.end.max(change.range.end);
            members.end += 1;
            grew = true;
        }
        grew
    }

    fn chunk(&self, change: &Change) -> &'a Chunk<E> {
        &self.diff.chunks()[change.index]
    }

    /// This side's content for `region`, given the changes it made there.
    fn output(&self, previous: &[E], members: &Range<usize>, region: &Range<usize>) -> Vec<E> {
        let mut out = Vec::new();
        let mut at = region.start;
        for change in &self.changes[members.clone()] {
            out.extend_from_slice(&previous[at..change.range.start]);
            out.extend_from_slice(self.chunk(change).elements());
            at = change.range.end;
        }
        out.extend_from_slice(&previous[at..region.end]);
        out
    }

    fn only_inserts(&self, members: &Range<usize>) -> bool {
        self.changes[members.clone()]
            .iter()
            .all(|c| matches!(self.chunk(c), Chunk::Inserted { .. }))
    }

    /// The elements of this side's changes alone, without the ancestor between them.
    fn inserted(&self, members: &Range<usize>) -> Vec<E> {
        self.changes[members.clone()]
            .iter()
            .flat_map(|c| self.chunk(c).elements().iter().cloned())
            .collect()
    }

    fn only_deletes(&self, members: &Range<usize>) -> bool {
        self.changes[members.clone()]
            .iter()
            .all(|c| matches!(self.chunk(c), Chunk::Deleted { .. }))
    }

    /// Chunk indices spanned by `members`, unchanged chunks in between included.
    fn chunk_span(&self, members: &Range<usize>) -> Range<usize> {
        match (
            self.changes.get(members.start),
            members.end.checked_sub(1).and_then(|i| self.changes.get(i)),
        ) {
            (Some(first), Some(last)) if !members.is_empty() => first.index..last.index + 1,
            _ => 0..0,
        }
    }
}

fn merge_walk<E: PartialEq + Clone>(
    previous: &[E],
    current_diff: Diff<E>,
    next_diff: Diff<E>,
    config: &MergeConfig,
) -> MergeResult<E> {
    let mut merged = Vec::with_capacity(previous.len());
    let mut conflicts = Vec::new();

    {
        let mut current = SideWalk::new(&current_diff);
        let mut next = SideWalk::new(&next_diff);
        let mut pos = 0;

        loop {
            let start = match (current.peek_start(), next.peek_start()) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => break,
            };
            merged.extend_from_slice(&previous[pos..start]);

            let mut region = start..start;
            let mut current_members = current.cursor..current.cursor;
            let mut next_members = next.cursor..next.cursor;
            loop {
                let grew_current = current.absorb(&mut current_members, &mut region);
                let grew_next = next.absorb(&mut next_members, &mut region);
                if !grew_current && !grew_next {
                    break;
                }
            }

            resolve_region(
                previous,
                &current,
                &next,
                &current_members,
                &next_members,
                &region,
                config,
                &mut merged,
                &mut conflicts,
            );

            pos = region.end;
            current.cursor = current_members.end;
            next.cursor = next_members.end;
        }
        merged.extend_from_slice(&previous[pos..]);
    }

    MergeResult::new(merged, conflicts, current_diff, next_diff)
}

#[allow(clippy::too_many_arguments)]
fn resolve_region<E: PartialEq + Clone>(
    previous: &[E],
    current: &SideWalk<'_, E>,
    next: &SideWalk<'_, E>,
    current_members: &Range<usize>,
    next_members: &Range<usize>,
    region: &Range<usize>,
    config: &MergeConfig,
    merged: &mut Vec<E>,
    conflicts: &mut Vec<Conflict<E>>,
) {
    if next_members.is_empty() {
        merged.extend(current.output(previous, current_members, region));
        return;
    }
    if current_members.is_empty() {
        merged.extend(next.output(previous, next_members, region));
        return;
    }

    let current_out = current.output(previous, current_members, region);
    let next_out = next.output(previous, next_members, region);
    if current_out == next_out {
        merged.extend(current_out);
        return;
    }

    let current_deletes = current.only_deletes(current_members);
    let next_deletes = next.only_deletes(next_members);
    if current_deletes && next_deletes {
        merged.extend(surviving_elements(
            previous,
            region,
            current.changes[current_members.clone()]
                .iter()
                .chain(&next.changes[next_members.clone()]),
        ));
        return;
    }
    if previous.is_empty() {
        merged.extend(ordered(&current_out, &next_out, config.insert_order));
        return;
    }

    let kind = if region.is_empty() {
        ConflictKind::InsertInsert
    } else if current_deletes || next_deletes {
        ConflictKind::DeleteChange
    } else {
        ConflictKind::ChangeChange
    };

    let fallback = config
        .fallback_on_conflict
        .map(|side| match side {
            Side::Previous => previous[region.clone()].to_vec(),
            Side::Current => current_out.clone(),
            Side::Next => next_out.clone(),
        })
        .filter(|content| !content.is_empty());

    let resolution = match (fallback, kind) {
        (Some(content), _) => content,
        (None, ConflictKind::InsertInsert) => {
            ordered(&current_out, &next_out, config.insert_order)
        }
        (None, ConflictKind::DeleteChange) if current_deletes => next_out.clone(),
        (None, ConflictKind::DeleteChange) => current_out.clone(),
        // An insertion-only side keeps its new elements but gives up the
        // ancestor the other side rewrote.
        (None, ConflictKind::ChangeChange) if current.only_inserts(current_members) => ordered(
            &current.inserted(current_members),
            &next_out,
            config.insert_order,
        ),
        (None, ConflictKind::ChangeChange) if next.only_inserts(next_members) => ordered(
            &current_out,
            &next.inserted(next_members),
            config.insert_order,
        ),
        (None, ConflictKind::ChangeChange) => {
            ordered(&current_out, &next_out, config.insert_order)
        }
    };

    let merged_start = merged.len();
    merged.extend_from_slice(&resolution);
    conflicts.push(Conflict {
        kind,
        previous_range: region.clone(),
        current_chunks: current.chunk_span(current_members),
        next_chunks: next.chunk_span(next_members),
        previous: previous[region.clone()].to_vec(),
        current: current_out,
        next: next_out,
        resolution,
        merged_range: merged_start..merged.len(),
    });
}

/// Ancestor elements of `region` that none of `deletions` removed.
fn surviving_elements<'c, E: Clone>(
    previous: &[E],
    region: &Range<usize>,
    deletions: impl Iterator<Item = &'c Change>,
) -> Vec<E> {
    let mut keep = vec![true; region.len()];
    for change in deletions {
        for slot in &mut keep[change.range.start - region.start..change.range.end - region.start] {
            *slot = false;
        }
    }
    previous[region.clone()]
        .iter()
        .zip(keep)
        .filter_map(|(element, kept)| kept.then(|| element.clone()))
        .collect()
}

fn ordered<E: Clone>(current: &[E], next: &[E], order: InsertOrder) -> Vec<E> {
    let (first, second) = match order {
        InsertOrder::CurrentFirst => (current, next),
        InsertOrder::NextFirst => (next, current),
    };
    let mut out = Vec::with_capacity(first.len() + second.len());
    out.extend_from_slice(first);
    out.extend_from_slice(second);
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_seq() -> impl Strategy<Value = Vec<u8>> {
        // A small alphabet makes overlapping edits likely.
        prop::collection::vec(0u8..4, 0..12)
    }

    proptest! {
        #[test]
        fn prop_identity_merge(x in arb_seq()) {
            let result = merge(&x, &x, &x, None);
            prop_assert!(result.conflicts().is_empty());
            prop_assert_eq!(result.merged(), x.as_slice());
        }

        #[test]
        fn prop_one_sided_current(previous in arb_seq(), current in arb_seq()) {
            let result = merge(&previous, &current, &previous, None);
            prop_assert!(result.conflicts().is_empty());
            prop_assert_eq!(result.merged(), current.as_slice());
        }

        #[test]
        fn prop_one_sided_next(previous in arb_seq(), next in arb_seq()) {
            let result = merge(&previous, &previous, &next, None);
            prop_assert!(result.conflicts().is_empty());
            prop_assert_eq!(result.merged(), next.as_slice());
        }

        #[test]
        fn prop_same_edit_both_sides(previous in arb_seq(), edited in arb_seq()) {
            let result = merge(&previous, &edited, &edited, None);
            prop_assert!(result.conflicts().is_empty());
            prop_assert_eq!(result.merged(), edited.as_slice());
        }

        #[test]
        fn prop_resolution_never_empty(
            previous in arb_seq(),
            current in arb_seq(),
            next in arb_seq(),
            side in prop_oneof![
                Just(None),
                Just(Some(Side::Previous)),
                Just(Some(Side::Current)),
                Just(Some(Side::Next)),
            ]
        ) {
            let config = MergeConfig {
                fallback_on_conflict: side,
                ..Default::default()
            };
            let result = merge(&previous, &current, &next, Some(&config));
            for conflict in result.conflicts() {
                prop_assert!(!conflict.resolution.is_empty());
            }
        }

        #[test]
        fn prop_one_error_per_conflict(
            previous in arb_seq(),
            current in arb_seq(),
            next in arb_seq()
        ) {
            let result = merge(&previous, &current, &next, None);
            prop_assert_eq!(result.error_count(), result.conflicts().len());
            for conflict in result.conflicts() {
                prop_assert_eq!(
                    &result.merged()[conflict.merged_range.clone()],
                    conflict.resolution.as_slice()
                );
            }
        }
    }
}
