// src/repo/record.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::exec::{GitOp, ProcessResult};

/// Classification of one repository.
///
/// Mutually exclusive; `Found` and `Check` are transient, everything else is
/// terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Discovered, not yet processed.
    Found,
    /// Currently being processed.
    Check,
    /// Excluded at discovery, or freshness could not be asserted (no fetch).
    Ignore,
    /// Clean and level with its freshly-queried upstream.
    UpToDate,
    /// Local changes present.
    Dirty,
    /// Behind its upstream.
    Behind,
    /// Ahead of its upstream.
    Ahead,
    /// Was behind and a pull was performed.
    Pull,
    /// The run for this repository failed.
    Error,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Found => "found",
            Status::Check => "check",
            Status::Ignore => "ignore",
            Status::UpToDate => "up-to-date",
            Status::Dirty => "dirty",
            Status::Behind => "behind",
            Status::Ahead => "ahead",
            Status::Pull => "pull",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of one repository's processing run.
///
/// Transitions monotonically `Pending -> Running -> {Complete, Error}` and
/// never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Complete,
    Error,
}

/// Captured result of each git invocation made for a repository, kept for
/// detail lines and post-hoc investigation regardless of outcome.
#[derive(Debug, Clone, Default)]
pub struct CommandOutputs {
    pub remote: Option<ProcessResult>,
    pub fetch: Option<ProcessResult>,
    pub status: Option<ProcessResult>,
    pub log: Option<ProcessResult>,
    pub pull: Option<ProcessResult>,
}

impl CommandOutputs {
    pub fn record(&mut self, op: GitOp, result: ProcessResult) {
        match op {
            GitOp::Remote => self.remote = Some(result),
            GitOp::Fetch => self.fetch = Some(result),
            GitOp::Status => self.status = Some(result),
            GitOp::Log => self.log = Some(result),
            GitOp::Pull => self.pull = Some(result),
        }
    }

    pub fn get(&self, op: GitOp) -> Option<&ProcessResult> {
        match op {
            GitOp::Remote => self.remote.as_ref(),
            GitOp::Fetch => self.fetch.as_ref(),
            GitOp::Status => self.status.as_ref(),
            GitOp::Log => self.log.as_ref(),
            GitOp::Pull => self.pull.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remote.is_none()
            && self.fetch.is_none()
            && self.status.is_none()
            && self.log.is_none()
            && self.pull.is_none()
    }

    /// First captured stderr line across all invocations, in execution order.
    pub fn first_stderr_line(&self) -> Option<&str> {
        [&self.remote, &self.fetch, &self.status, &self.log, &self.pull]
            .into_iter()
            .flatten()
            .find_map(|result| result.stderr.first())
            .map(String::as_str)
    }
}

/// One discovered repository and everything the run learned about it.
#[derive(Debug)]
pub struct RepoRecord {
    /// Absolute path of the repository root.
    pub path: PathBuf,
    /// Path relative to the scan root, forward slashes.
    pub rel_path: String,
    pub status: Status,
    pub run_state: RunState,
    pub outputs: CommandOutputs,
    /// Retained failure cause, rendered; `None` for opaque failures.
    pub error: Option<String>,
    pub started_at: Option<Instant>,
    pub elapsed: Duration,
}

impl RepoRecord {
    /// A repository discovered for processing.
    pub fn found(path: PathBuf, rel_path: String) -> Self {
        Self::with_status(path, rel_path, Status::Found)
    }

    /// A repository matched by the exclude policy at discovery time; it is
    /// reported but never processed.
    pub fn ignored(path: PathBuf, rel_path: String) -> Self {
        Self::with_status(path, rel_path, Status::Ignore)
    }

    fn with_status(path: PathBuf, rel_path: String, status: Status) -> Self {
        Self {
            path,
            rel_path,
            status,
            run_state: RunState::Pending,
            outputs: CommandOutputs::default(),
            error: None,
            started_at: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.run_state, RunState::Complete | RunState::Error)
    }
}

/// Shared handle to one record.
///
/// Exactly one bucket task mutates a record while it is being processed; the
/// presenter takes brief locks for point-in-time snapshots, so mid-update
/// reads are allowed but torn ones are not.
pub type RecordSlot = Arc<Mutex<RepoRecord>>;

/// Wrap a freshly-discovered record into its shared slot.
pub fn into_slot(record: RepoRecord) -> RecordSlot {
    Arc::new(Mutex::new(record))
}

/// Lock a record slot; poisoning is unrecoverable here since a panicked
/// writer leaves the record in an unknown state.
pub fn lock_record(slot: &RecordSlot) -> MutexGuard<'_, RepoRecord> {
    slot.lock().expect("repo record lock poisoned")
}
