#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `ledger` holds the named traversal counters every component of the
//! workspace may increment and the final traversal report reads. Counters are
//! monotonically increasing: the only mutations are [`Ledger::tick`] (`+1`)
//! and [`Ledger::times`] (`+n`).
//!
//! # Invariants
//!
//! - A counter never decreases; its value equals the sum of all increments
//!   applied since construction (or deserialization).
//! - The ledger is mutated only by the traversal driver thread. Worker
//!   results are folded back on the driver side, so no locking is required.
//!
//! # Examples
//!
//! ```
//! use ledger::{Ledger, MetricKind};
//!
//! let mut ledger = Ledger::default();
//! ledger.tick(MetricKind::FilesInvoked);
//! ledger.times(MetricKind::ChildFilesFound, 3);
//! assert_eq!(ledger.count(MetricKind::FilesInvoked), 1);
//! assert_eq!(ledger.count(MetricKind::ChildFilesFound), 3);
//! ```

use serde::{Deserialize, Serialize};

/// Identifies one traversal counter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MetricKind {
    /// File nodes whose callback was invoked.
    FilesInvoked,
    /// File nodes suppressed by the client filter.
    FilesFilteredOut,
    /// Folder nodes whose callback was invoked.
    DirectoriesInvoked,
    /// Folder nodes suppressed by the client filter.
    DirectoriesFilteredOut,
    /// Child file entries retained by a child-list filter pass.
    ChildFilesFound,
    /// Child file entries discarded by a child-list filter pass.
    ChildFilesFilteredOut,
}

/// Monotonic counter store, persisted inside the resume snapshot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ledger {
    #[serde(rename = "files-invoked")]
    files_invoked: u64,
    #[serde(rename = "files-filtered-out")]
    files_filtered_out: u64,
    #[serde(rename = "directories-invoked")]
    directories_invoked: u64,
    #[serde(rename = "directories-filtered-out")]
    directories_filtered_out: u64,
    #[serde(rename = "child-files-found")]
    child_files_found: u64,
    #[serde(rename = "child-files-filtered-out")]
    child_files_filtered_out: u64,
}

impl Ledger {
    /// Increments `kind` by one.
    pub fn tick(&mut self, kind: MetricKind) {
        self.times(kind, 1);
    }

    /// Increments `kind` by `n`.
    pub fn times(&mut self, kind: MetricKind, n: u64) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(n);
    }

    /// Returns the current value of `kind`.
    #[must_use]
    pub const fn count(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::FilesInvoked => self.files_invoked,
            MetricKind::FilesFilteredOut => self.files_filtered_out,
            MetricKind::DirectoriesInvoked => self.directories_invoked,
            MetricKind::DirectoriesFilteredOut => self.directories_filtered_out,
            MetricKind::ChildFilesFound => self.child_files_found,
            MetricKind::ChildFilesFilteredOut => self.child_files_filtered_out,
        }
    }

    /// Folds another ledger into this one, summing every counter.
    pub fn absorb(&mut self, other: &Self) {
        self.files_invoked = self.files_invoked.saturating_add(other.files_invoked);
        self.files_filtered_out = self
            .files_filtered_out
            .saturating_add(other.files_filtered_out);
        self.directories_invoked = self
            .directories_invoked
            .saturating_add(other.directories_invoked);
        self.directories_filtered_out = self
            .directories_filtered_out
            .saturating_add(other.directories_filtered_out);
        self.child_files_found = self.child_files_found.saturating_add(other.child_files_found);
        self.child_files_filtered_out = self
            .child_files_filtered_out
            .saturating_add(other.child_files_filtered_out);
    }

    fn slot_mut(&mut self, kind: MetricKind) -> &mut u64 {
        match kind {
            MetricKind::FilesInvoked => &mut self.files_invoked,
            MetricKind::FilesFilteredOut => &mut self.files_filtered_out,
            MetricKind::DirectoriesInvoked => &mut self.directories_invoked,
            MetricKind::DirectoriesFilteredOut => &mut self.directories_filtered_out,
            MetricKind::ChildFilesFound => &mut self.child_files_found,
            MetricKind::ChildFilesFilteredOut => &mut self.child_files_filtered_out,
        }
    }
}
