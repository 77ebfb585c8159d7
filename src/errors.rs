// src/errors.rs

//! Crate-wide error types.
//!
//! Most modules use `anyhow` directly; [`StepError`] is the explicit failure
//! type of the per-repository workflow, so callers can tell a command failure
//! apart from a timeout or a classification dead end without downcasting.

use std::time::Duration;

use thiserror::Error;

/// Failure of one step of the per-repository status workflow.
#[derive(Debug, Error)]
pub enum StepError {
    /// A git command exited with a nonzero code.
    #[error("git {op} exited with code {code}: {detail}")]
    CommandFailed {
        op: &'static str,
        code: i32,
        detail: String,
    },

    /// A git command did not finish before its deadline.
    #[error("git {op} gave up after {waited:?}")]
    TimedOut { op: &'static str, waited: Duration },

    /// Classification dead end with nothing useful to show the operator.
    ///
    /// The cause is dropped on purpose; only the status flips to error.
    #[error("could not classify repository state")]
    Unclassified,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StepError {
    /// True when the failure deliberately carries no cause worth surfacing.
    pub fn is_opaque(&self) -> bool {
        matches!(self, StepError::Unclassified)
    }
}

pub use anyhow::{Error, Result};
