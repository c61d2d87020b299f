#![forbid(unsafe_code)]

use gs_core::Ownership;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdlistRow {
    pub id: i64,
    pub address: String,
    pub enabled: bool,
    pub comment: Option<String>,
}

impl AdlistRow {
    pub fn ownership(&self) -> Ownership {
        Ownership::of(self.comment.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRow {
    pub id: i64,
    pub enabled: bool,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    Commit,
    /// Run every step, report, then roll back.
    DryRun,
}

/// Counters for one reconcile run.
///
/// `memberships` is the number of (record, group) rows written by the remap step;
/// `membership_edits` is how many managed membership rows differ from the state the
/// run started with (added plus removed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub staged: usize,
    pub inserted: usize,
    pub disabled: usize,
    pub memberships: usize,
    pub membership_edits: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.disabled == 0 && self.membership_edits == 0
    }
}
