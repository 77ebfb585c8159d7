// src/repo/machine.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::StepError;
use crate::exec::{git_request, GitOp, ProcessResult, ProcessRunner};
use crate::repo::record::{lock_record, RecordSlot, RunState, Status};

/// Literal marker git prints in the branch header when the local branch is
/// behind its upstream, e.g. `## main...origin/main [behind 2]`.
pub const BEHIND_MARKER: &str = "[behind ";
/// Counterpart marker for a branch ahead of its upstream.
pub const AHEAD_MARKER: &str = "[ahead ";

/// Per-run options for the status workflow.
#[derive(Debug, Clone)]
pub struct MachineSettings {
    /// Run `git remote -v` before anything else.
    pub query_remotes: bool,
    /// Pull repositories that turn out to be behind.
    pub pull: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            query_remotes: false,
            pull: false,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Drives one repository through its git operations and classifies it.
///
/// The machine owns no records; it is handed a [`RecordSlot`] per call and is
/// the only writer for that record while the call is in flight. Failures are
/// absorbed into the record (status + run state) and never escape to the
/// caller, so one broken repository cannot take its bucket down.
pub struct StatusMachine<R> {
    runner: Arc<R>,
    settings: MachineSettings,
}

impl<R: ProcessRunner> StatusMachine<R> {
    pub fn new(runner: Arc<R>, settings: MachineSettings) -> Self {
        Self { runner, settings }
    }

    /// Process one repository to a terminal state.
    ///
    /// `fetch_allowed` is the no-fetch policy decision for this repository,
    /// made by the orchestrator so the machine stays path-policy agnostic.
    pub async fn process(&self, slot: &RecordSlot, fetch_allowed: bool) {
        let started = Instant::now();
        let initial = {
            let mut rec = lock_record(slot);
            rec.run_state = RunState::Running;
            rec.started_at = Some(started);
            rec.status
        };

        if initial == Status::Ignore {
            let mut rec = lock_record(slot);
            rec.elapsed = started.elapsed();
            rec.run_state = RunState::Complete;
            debug!(repo = %rec.rel_path, "excluded at discovery; nothing to do");
            return;
        }

        {
            lock_record(slot).status = Status::Check;
        }

        let outcome = self.classify(slot, fetch_allowed).await;

        let mut rec = lock_record(slot);
        rec.elapsed = started.elapsed();
        match outcome {
            Ok(()) => {
                rec.run_state = RunState::Complete;
                debug!(repo = %rec.rel_path, status = %rec.status, "repository classified");
            }
            Err(err) if err.is_opaque() => {
                rec.status = Status::Error;
                rec.error = None;
                rec.run_state = RunState::Error;
                warn!(repo = %rec.rel_path, "could not classify repository; detail dropped");
            }
            Err(err) => {
                rec.status = Status::Error;
                rec.error = Some(format!("{err:#}"));
                rec.run_state = RunState::Error;
                warn!(repo = %rec.rel_path, error = %err, "repository run failed");
            }
        }
    }

    /// The classification sequence proper: check, fetch, status, and one of
    /// pull/log depending on what the status output says.
    async fn classify(&self, slot: &RecordSlot, fetch_allowed: bool) -> Result<(), StepError> {
        if self.settings.query_remotes {
            self.run_git(slot, GitOp::Remote).await?;
        }

        let fetch_ran = if fetch_allowed {
            self.run_git(slot, GitOp::Fetch).await?;
            true
        } else {
            false
        };

        let status = self.run_git(slot, GitOp::Status).await?;

        if status.stdout.len() > 1 {
            set_status(slot, Status::Dirty);
            return Ok(());
        }

        // `status -bs` always prints a branch header; with nothing to look
        // at there is nothing worth telling the operator either.
        let Some(line) = status.stdout.first() else {
            return Err(StepError::Unclassified);
        };

        if line.contains(BEHIND_MARKER) {
            set_status(slot, Status::Behind);
            if self.settings.pull {
                set_status(slot, Status::Pull);
                self.run_git(slot, GitOp::Pull).await?;
            }
            return Ok(());
        }

        if line.contains(AHEAD_MARKER) {
            // Known gap: ahead repositories terminate with no further
            // handling (no push support).
            set_status(slot, Status::Ahead);
            return Ok(());
        }

        self.run_git(slot, GitOp::Log).await?;
        // Without a fetch this run, freshness cannot be asserted.
        set_status(
            slot,
            if fetch_ran {
                Status::UpToDate
            } else {
                Status::Ignore
            },
        );
        Ok(())
    }

    /// Run one git invocation, record its result on the record regardless of
    /// outcome, then turn timeouts and nonzero exits into step failures.
    async fn run_git(&self, slot: &RecordSlot, op: GitOp) -> Result<ProcessResult, StepError> {
        let (path, rel) = {
            let rec = lock_record(slot);
            (rec.path.clone(), rec.rel_path.clone())
        };
        debug!(repo = %rel, op = %op, "running git command");

        let request = git_request(op, &path, self.settings.timeout, self.settings.poll_interval);
        let result = self.runner.run(request).await.map_err(StepError::from)?;

        {
            let mut rec = lock_record(slot);
            rec.outputs.record(op, result.clone());
        }

        ensure_success(op, &result)?;
        Ok(result)
    }
}

fn set_status(slot: &RecordSlot, status: Status) {
    lock_record(slot).status = status;
}

/// A timeout escalates to a failure here, through the same check that turns
/// nonzero exits into failures; the executor itself never judges.
fn ensure_success(op: GitOp, result: &ProcessResult) -> Result<(), StepError> {
    if result.timed_out {
        return Err(StepError::TimedOut {
            op: op.name(),
            waited: result.duration,
        });
    }
    let code = result.exit_code.unwrap_or(-1);
    if code != 0 {
        let detail = result.stderr.first().cloned().unwrap_or_default();
        return Err(StepError::CommandFailed {
            op: op.name(),
            code,
            detail,
        });
    }
    Ok(())
}
