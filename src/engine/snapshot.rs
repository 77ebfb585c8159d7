// src/engine/snapshot.rs

use std::time::Duration;

use crate::repo::Status;

/// Overall phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Processing,
    Completed,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Scanning => "scanning",
            Phase::Processing => "processing",
            Phase::Completed => "completed",
            Phase::Error => "error",
        };
        f.write_str(s)
    }
}

/// Read-only, point-in-time view of one record, for presentation.
#[derive(Debug, Clone)]
pub struct RecordView {
    pub rel_path: String,
    pub status: Status,
    pub detail: String,
    pub finished: bool,
    /// Retained failure cause, if the run for this record errored with one.
    pub error: Option<String>,
    pub elapsed: Duration,
}

/// Read-only, point-in-time view of a whole run.
///
/// Aggregates are derived from the record states at snapshot time, never
/// kept as separately-updated counters, so they cannot drift. Snapshots are
/// eventually consistent; a record may move on the moment after it is read.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub records: Vec<RecordView>,
}

impl ProgressSnapshot {
    /// Views of records that finished with an error, in path order.
    pub fn errored(&self) -> impl Iterator<Item = &RecordView> {
        self.records
            .iter()
            .filter(|r| r.status == Status::Error)
    }
}
