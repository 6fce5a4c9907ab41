//! What a merge hands back: the merged sequence, its conflicts and its log.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, Diff};
use crate::log::{MergeLog, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both sides inserted different content at the same ancestor position.
    InsertInsert,
    /// One side only deleted ancestor elements the other side rewrote.
    DeleteChange,
    /// Both sides rewrote overlapping ancestor ranges differently.
    ChangeChange,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::InsertInsert => write!(f, "insert/insert"),
            ConflictKind::DeleteChange => write!(f, "delete/change"),
            ConflictKind::ChangeChange => write!(f, "change/change"),
        }
    }
}

/// One region where the current and next diffs disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict<E> {
    pub kind: ConflictKind,
    /// Ancestor range in dispute. Empty for insert/insert conflicts.
    pub previous_range: Range<usize>,
    /// Indices into [`MergeResult::current_diff`] of the chunks involved.
    pub current_chunks: Range<usize>,
    /// Indices into [`MergeResult::next_diff`] of the chunks involved.
    pub next_chunks: Range<usize>,
    /// Ancestor content of the region.
    pub previous: Vec<E>,
    /// What the current side turned the region into.
    pub current: Vec<E>,
    /// What the next side turned the region into.
    pub next: Vec<E>,
    /// What was emitted into the merged sequence for this region.
    pub resolution: Vec<E>,
    /// Where `resolution` sits in [`MergeResult::merged`].
    pub merged_range: Range<usize>,
}

impl<E> Conflict<E> {
    pub(crate) fn describe(&self) -> String {
        format!(
            "{} conflict at previous[{}..{}]: current and next both modified this region",
            self.kind, self.previous_range.start, self.previous_range.end
        )
    }
}

/// The outcome of a three-way merge.
///
/// Conflicts are ordinary data here: a result with conflicts is still a
/// complete merge, with every conflict resolved by the configured policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult<E> {
    merged: Vec<E>,
    conflicts: Vec<Conflict<E>>,
    log: MergeLog,
    current_diff: Diff<E>,
    next_diff: Diff<E>,
}

impl<E> MergeResult<E> {
    pub(crate) fn new(
        merged: Vec<E>,
        conflicts: Vec<Conflict<E>>,
        current_diff: Diff<E>,
        next_diff: Diff<E>,
    ) -> Self {
        let mut log = MergeLog::default();
        for conflict in &conflicts {
            log.error(conflict.describe());
        }
        Self {
            merged,
            conflicts,
            log,
            current_diff,
            next_diff,
        }
    }

    pub fn merged(&self) -> &[E] {
        &self.merged
    }

    pub fn into_merged(self) -> Vec<E> {
        self.merged
    }

    pub fn conflicts(&self) -> &[Conflict<E>] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn log(&self) -> &MergeLog {
        &self.log
    }

    /// Shorthand for the number of error-level log entries.
    pub fn error_count(&self) -> usize {
        self.log.count(Severity::Error)
    }

    /// Diff from the previous sequence to the current one.
    pub fn current_diff(&self) -> &Diff<E> {
        &self.current_diff
    }

    /// Diff from the previous sequence to the next one.
    pub fn next_diff(&self) -> &Diff<E> {
        &self.next_diff
    }

    /// The current-side chunks a conflict refers to.
    pub fn current_chunks(&self, conflict: &Conflict<E>) -> &[Chunk<E>] {
        self.current_diff
            .chunks()
            .get(conflict.current_chunks.clone())
            .unwrap_or(&[])
    }

    /// The next-side chunks a conflict refers to.
    pub fn next_chunks(&self, conflict: &Conflict<E>) -> &[Chunk<E>] {
        self.next_diff
            .chunks()
            .get(conflict.next_chunks.clone())
            .unwrap_or(&[])
    }
}
