// src/repo/mod.rs

//! Per-repository data model and status workflow.
//!
//! - [`record`] holds the shared data model: the record itself, its status
//!   and run-state enumerations, and the captured command outputs.
//! - [`machine`] contains the sequential workflow that drives one record
//!   through its git operations and classifies it.
//! - [`detail`] derives the one-line detail text shown next to each record.

pub mod detail;
pub mod machine;
pub mod record;

pub use detail::{parse_divergence, status_line, Divergence};
pub use machine::{MachineSettings, StatusMachine, AHEAD_MARKER, BEHIND_MARKER};
pub use record::{
    into_slot, lock_record, CommandOutputs, RecordSlot, RepoRecord, RunState, Status,
};
