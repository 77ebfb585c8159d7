// src/report.rs

//! Line-based presentation of a run.
//!
//! This is the driver-side consumer of the engine's snapshot contract: a
//! progress line while the run is outstanding, and a final table once it is
//! done. There is deliberately no TUI here; the snapshot is the interface a
//! fancier presenter would build on.

use std::collections::BTreeMap;

use tracing::info;

use crate::engine::{Phase, ProgressSnapshot};
use crate::repo::{parse_divergence, Status};

/// Emits a progress line whenever the observable state changed since the
/// last tick. Driven by a periodic tick in the driver, so redraw cadence is
/// decoupled from the engine.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    last: Option<(Phase, usize)>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, snapshot: &ProgressSnapshot) {
        let key = (snapshot.phase, snapshot.completed);
        if self.last == Some(key) {
            return;
        }
        self.last = Some(key);

        match snapshot.phase {
            Phase::Scanning => info!("scanning roots for repositories"),
            Phase::Processing => info!(
                completed = snapshot.completed,
                total = snapshot.total,
                "processing repositories"
            ),
            Phase::Completed | Phase::Error => {}
        }
    }
}

/// Print the final per-repository table and a summary footer to stdout.
pub fn print_final(snapshot: &ProgressSnapshot) {
    let path_width = snapshot
        .records
        .iter()
        .map(|r| r.rel_path.len())
        .max()
        .unwrap_or(0);

    for record in &snapshot.records {
        println!(
            "{:<10} {:<path_width$}  {}",
            record.status.label(),
            record.rel_path,
            record.detail
        );
    }

    if !snapshot.records.is_empty() {
        println!();
    }
    println!("{}", summary_line(snapshot));
}

/// One line like
/// `12 repositories in 3.4s: 8 up-to-date, 2 dirty, 1 behind, 1 error (2 commits behind, 0 ahead)`.
pub fn summary_line(snapshot: &ProgressSnapshot) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for record in &snapshot.records {
        *counts.entry(record.status.label()).or_default() += 1;
    }
    let breakdown: Vec<String> = counts
        .iter()
        .map(|(label, count)| format!("{count} {label}"))
        .collect();

    let mut line = format!(
        "{} repositories in {:.1}s",
        snapshot.total,
        snapshot.elapsed.as_secs_f64()
    );
    if !breakdown.is_empty() {
        line.push_str(": ");
        line.push_str(&breakdown.join(", "));
    }

    let (ahead, behind) = divergence_totals(snapshot);
    if ahead > 0 || behind > 0 {
        line.push_str(&format!(" ({behind} commits behind, {ahead} ahead)"));
    }
    line
}

/// Total ahead/behind commit counts across records whose detail line is a
/// status branch header.
fn divergence_totals(snapshot: &ProgressSnapshot) -> (u64, u64) {
    snapshot
        .records
        .iter()
        .filter(|r| matches!(r.status, Status::Behind | Status::Ahead))
        .filter_map(|r| parse_divergence(&r.detail))
        .fold((0, 0), |(ahead, behind), d| {
            (ahead + d.ahead, behind + d.behind)
        })
}

/// Message for the first repository that finished with an error, if any;
/// the driver prints it to stderr and exits nonzero.
pub fn first_error(snapshot: &ProgressSnapshot) -> Option<String> {
    snapshot.errored().next().map(|record| {
        let message = record
            .error
            .clone()
            .unwrap_or_else(|| record.detail.clone());
        if message.is_empty() {
            format!("{}: repository run failed", record.rel_path)
        } else {
            format!("{}: {}", record.rel_path, message)
        }
    })
}
