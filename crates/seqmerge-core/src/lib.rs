//! # seqmerge-core
//!
//! Diff, patch and three-way merge over any sequence of elements that can be
//! compared with `==`.
//!
//! ## Pieces
//!
//! 1. **Diff computer** ([`diff()`]): Myers' O(ND) search producing a minimal,
//!    deterministic edit script.
//! 2. **Chunk model** ([`Chunk`], [`Diff`]): an edit script is an ordered list
//!    of unchanged / inserted / deleted / changed chunks whose ranges cover the
//!    previous sequence exactly.
//! 3. **Patch applier** ([`patch()`]): replays a diff, rejecting diffs that do
//!    not fit the sequence they are applied to.
//! 4. **Merge engine** ([`merge()`], [`merge_diffs`]): walks two diffs of a common
//!    ancestor side by side, applies what does not overlap and resolves what
//!    does by a fixed policy.
//! 5. **Reporter** ([`MergeResult`], [`Conflict`], [`MergeLog`]): the merged
//!    sequence, one conflict descriptor and one error log entry per conflict.
//!
//! Everything here is a pure function of its inputs. No I/O, no shared state,
//! and no global logger: log entries come back as data and can be replayed
//! into a [`LogSink`] such as [`TracingSink`].
//!
//! ## Example
//!
//! ```rust
//! use seqmerge_core::{merge, Severity};
//!
//! let previous: Vec<char> = "abc".chars().collect();
//! let current: Vec<char> = "ajbc".chars().collect();
//! let next: Vec<char> = "aibc".chars().collect();
//!
//! let result = merge(&previous, &current, &next, None);
//! assert_eq!(result.log().count(Severity::Error), 1);
//! assert_eq!(result.merged().iter().collect::<String>(), "ajibc");
//! ```

pub mod chunk;
pub mod config;
pub mod conflict;
pub mod diff;
pub mod log;
pub mod merge;
pub mod patch;

pub use chunk::{Chunk, ChunkKind, Diff, DiffStats};
pub use config::{InsertOrder, MergeConfig, Side};
pub use conflict::{Conflict, ConflictKind, MergeResult};
pub use diff::{diff, diff_with_deadline};
pub use log::{LogEntry, LogSink, MergeLog, Severity, TracingSink};
pub use merge::{merge, merge_diffs};
pub use patch::{patch, PatchError};
