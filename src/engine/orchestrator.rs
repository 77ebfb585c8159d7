// src/engine/orchestrator.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::engine::snapshot::{Phase, ProgressSnapshot, RecordView};
use crate::exec::ProcessRunner;
use crate::policy::{ExcludePolicy, FetchPolicy};
use crate::repo::{into_slot, lock_record, status_line, MachineSettings, RecordSlot, StatusMachine};
use crate::scan::scan_root;

/// Knobs for one orchestrated run.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Bounded subprocess concurrency: the number of bucket workers, and so
    /// the maximum number of git processes in flight at once.
    pub workers: usize,
    /// Depth bound handed to the discovery walk.
    pub max_depth: usize,
    /// Pull repositories that turn out to be behind.
    pub pull: bool,
    /// Run `git remote -v` for every repository.
    pub query_remotes: bool,
    /// Deadline for a single git invocation.
    pub timeout: Duration,
    /// Poll cadence for running git invocations.
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            max_depth: crate::scan::DEFAULT_MAX_DEPTH,
            pull: false,
            query_remotes: false,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(50),
        }
    }
}

struct Shared {
    phase: Mutex<Phase>,
    records: Mutex<Vec<RecordSlot>>,
    started: Instant,
}

/// Drives a whole run: discovery across roots, then bucketed processing of
/// every discovered repository.
///
/// The orchestrator owns the record slots for the lifetime of the run. While
/// `run` is outstanding, any other task may call [`Orchestrator::snapshot`]
/// to observe progress; readers tolerate mid-update snapshots by design.
pub struct Orchestrator<R> {
    runner: Arc<R>,
    settings: EngineSettings,
    exclude: ExcludePolicy,
    fetch: FetchPolicy,
    shared: Arc<Shared>,
}

impl<R: ProcessRunner + Send + Sync + 'static> Orchestrator<R> {
    pub fn new(
        runner: Arc<R>,
        settings: EngineSettings,
        exclude: ExcludePolicy,
        fetch: FetchPolicy,
    ) -> Self {
        Self {
            runner,
            settings,
            exclude,
            fetch,
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Scanning),
                records: Mutex::new(Vec::new()),
                started: Instant::now(),
            }),
        }
    }

    /// Run discovery and processing to completion.
    ///
    /// A discovery failure for any root aborts the entire run; per-repository
    /// failures are absorbed into their records and never surface here.
    pub async fn run(&self, roots: &[PathBuf]) -> Result<()> {
        self.set_phase(Phase::Scanning);
        info!(roots = roots.len(), "discovery started");

        let discovered = match self.discover(roots).await {
            Ok(records) => records,
            Err(err) => {
                self.set_phase(Phase::Error);
                return Err(err);
            }
        };
        info!(repositories = discovered.len(), "discovery finished");

        {
            let mut slots = self.shared.records.lock().expect("records lock poisoned");
            *slots = discovered.into_iter().map(into_slot).collect();
        }

        self.set_phase(Phase::Processing);
        if let Err(err) = self.process_all().await {
            self.set_phase(Phase::Error);
            return Err(err);
        }

        self.set_phase(Phase::Completed);
        info!(elapsed = ?self.shared.started.elapsed(), "run finished");
        Ok(())
    }

    /// Scan every root concurrently and merge the results, sorted by path.
    async fn discover(&self, roots: &[PathBuf]) -> Result<Vec<crate::repo::RepoRecord>> {
        let mut set = JoinSet::new();
        for root in roots {
            let root = root.clone();
            let exclude = self.exclude.clone();
            let max_depth = self.settings.max_depth;
            set.spawn_blocking(move || scan_root(&root, max_depth, &exclude));
        }

        let mut merged = Vec::new();
        while let Some(joined) = set.join_next().await {
            let records = joined.context("discovery task panicked")??;
            merged.extend(records);
        }
        merged.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(merged)
    }

    /// Partition the records into contiguous buckets and process the buckets
    /// concurrently; records within a bucket run strictly sequentially, so
    /// at most `workers` git invocations are in flight at once.
    async fn process_all(&self) -> Result<()> {
        let slots: Vec<RecordSlot> = self
            .shared
            .records
            .lock()
            .expect("records lock poisoned")
            .clone();
        if slots.is_empty() {
            info!("no repositories discovered; nothing to process");
            return Ok(());
        }

        let workers = self.settings.workers.max(1);
        let bucket_size = slots.len().div_ceil(workers);
        debug!(
            total = slots.len(),
            workers, bucket_size, "partitioning repositories into buckets"
        );

        let mut set = JoinSet::new();
        for bucket in slots.chunks(bucket_size) {
            let bucket: Vec<RecordSlot> = bucket.to_vec();
            let machine = StatusMachine::new(Arc::clone(&self.runner), self.machine_settings());
            let fetch = self.fetch.clone();
            set.spawn(async move {
                for slot in &bucket {
                    let fetch_allowed = {
                        let rec = lock_record(slot);
                        fetch.fetch_allowed(&rec.rel_path)
                    };
                    machine.process(slot, fetch_allowed).await;
                }
            });
        }

        while let Some(joined) = set.join_next().await {
            joined.context("repository bucket task panicked")?;
        }
        Ok(())
    }

    fn machine_settings(&self) -> MachineSettings {
        MachineSettings {
            query_remotes: self.settings.query_remotes,
            pull: self.settings.pull,
            timeout: self.settings.timeout,
            poll_interval: self.settings.poll_interval,
        }
    }

    fn set_phase(&self, phase: Phase) {
        *self.shared.phase.lock().expect("phase lock poisoned") = phase;
    }

    /// Point-in-time view of the run for progress reporting.
    ///
    /// Counts are derived from the record states at the moment of the call;
    /// a presenter polling this sees eventually-consistent progress.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let phase = *self.shared.phase.lock().expect("phase lock poisoned");
        let slots: Vec<RecordSlot> = self
            .shared
            .records
            .lock()
            .expect("records lock poisoned")
            .clone();

        let mut records = Vec::with_capacity(slots.len());
        let mut completed = 0;
        for slot in &slots {
            let rec = lock_record(slot);
            let finished = rec.is_finished();
            if finished {
                completed += 1;
            }
            records.push(RecordView {
                rel_path: rec.rel_path.clone(),
                status: rec.status,
                detail: status_line(&rec),
                finished,
                error: rec.error.clone(),
                elapsed: rec.elapsed,
            });
        }

        ProgressSnapshot {
            phase,
            completed,
            total: records.len(),
            elapsed: self.shared.started.elapsed(),
            records,
        }
    }
}
