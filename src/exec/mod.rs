// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running external commands, using
//! `tokio::process::Command`, and reporting the raw facts back to the status
//! workflow.
//!
//! - [`process`] owns the executor: spawn, incremental line capture, poll for
//!   completion, kill-and-reap on timeout.
//! - [`git`] pins down the exact git invocations the workflow is allowed to
//!   make.

pub mod git;
pub mod process;

pub use git::{git_request, GitOp};
pub use process::{run_process, OsProcessRunner, ProcessRequest, ProcessResult, ProcessRunner};
