// src/repo/detail.rs

//! Presentation detail derived from a finished record.
//!
//! `status_line` is a pure function of the record's final status and captured
//! outputs; it owns no state and is safe to call on a mid-run snapshot.

use std::sync::LazyLock;

use regex::Regex;

use crate::exec::ProcessResult;
use crate::repo::record::{RepoRecord, RunState, Status};

/// One line of detail text for a record, chosen by its status:
///
/// - retained failure cause when the run errored with one
/// - first captured stderr line for `Error` without a cause
/// - best-available first line (log, else status) for `Ignore`
/// - status / log / pull first lines for `Behind`+`Ahead` / `UpToDate` /
///   `Pull` respectively
/// - a `"[N files] <line>"` summary for `Dirty`
/// - empty for the transient states
pub fn status_line(record: &RepoRecord) -> String {
    if record.run_state == RunState::Error {
        if let Some(cause) = &record.error {
            return cause.clone();
        }
    }

    match record.status {
        Status::Error => record
            .outputs
            .first_stderr_line()
            .map(str::to_string)
            .unwrap_or_default(),
        Status::Found | Status::Check => String::new(),
        Status::Ignore => first_line(record.outputs.log.as_ref())
            .or_else(|| first_line(record.outputs.status.as_ref()))
            .unwrap_or_default(),
        Status::Behind | Status::Ahead => {
            first_line(record.outputs.status.as_ref()).unwrap_or_default()
        }
        Status::UpToDate => first_line(record.outputs.log.as_ref()).unwrap_or_default(),
        Status::Pull => first_line(record.outputs.pull.as_ref()).unwrap_or_default(),
        Status::Dirty => dirty_summary(record.outputs.status.as_ref()),
    }
}

fn first_line(result: Option<&ProcessResult>) -> Option<String> {
    result.and_then(|r| r.stdout.first().cloned())
}

fn dirty_summary(result: Option<&ProcessResult>) -> String {
    let Some(result) = result else {
        return String::new();
    };
    let changed = result.stdout.len().saturating_sub(1);
    let sample = result.stdout.get(1).cloned().unwrap_or_default();
    format!("[{changed} files] {sample}")
}

/// Ahead/behind commit counts parsed out of a status branch header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Divergence {
    pub ahead: u64,
    pub behind: u64,
}

static DIVERGENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:ahead (\d+))?(?:, )?(?:behind (\d+))?\]").expect("divergence pattern")
});

/// Extract divergence counts from a line like
/// `## main...origin/main [ahead 1, behind 2]`; `None` when the line carries
/// no divergence marker.
pub fn parse_divergence(line: &str) -> Option<Divergence> {
    let caps = DIVERGENCE.captures(line)?;
    let ahead = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let behind = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    if ahead == 0 && behind == 0 {
        return None;
    }
    Some(Divergence { ahead, behind })
}
