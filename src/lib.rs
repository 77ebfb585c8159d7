// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod policy;
pub mod repo;
pub mod report;
pub mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::engine::{EngineSettings, Orchestrator};
use crate::exec::OsProcessRunner;
use crate::policy::{ExcludePolicy, FetchPolicy};
use crate::report::ProgressReporter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (CLI flags override the optional `Githerd.toml`)
/// - policies and engine settings
/// - the orchestrator, driven with a periodic progress tick
/// - the final report and exit-code decision
///
/// Returns the process exit code: `0` on success, `1` when any repository
/// finished with a recorded error. Run-level faults (a root that cannot be
/// scanned) propagate as errors and the caller exits nonzero.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = config::load_or_default(Path::new(&args.config))?;

    let roots = resolve_roots(&args, &cfg);
    let exclude = ExcludePolicy::new(pick(args.exclude, cfg.scan.exclude.clone()));
    let fetch = FetchPolicy::new(pick(args.no_fetch, cfg.git.no_fetch.clone()));
    let settings = EngineSettings {
        workers: cfg.process.workers,
        max_depth: cfg.scan.max_depth,
        pull: args.pull,
        query_remotes: args.remotes || cfg.git.query_remotes,
        timeout: Duration::from_secs(cfg.process.timeout_secs),
        poll_interval: Duration::from_millis(cfg.process.poll_interval_ms),
    };
    debug!(?roots, ?settings, "starting run");

    let runner = Arc::new(OsProcessRunner);
    let orchestrator = Orchestrator::new(runner, settings, exclude, fetch);

    // Periodic progress tick, decoupled from engine correctness: the engine
    // never waits on the presenter, the presenter just samples snapshots.
    let run_fut = orchestrator.run(&roots);
    tokio::pin!(run_fut);
    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    let mut progress = ProgressReporter::new();
    let outcome = loop {
        tokio::select! {
            result = &mut run_fut => break result,
            _ = ticker.tick() => progress.tick(&orchestrator.snapshot()),
        }
    };
    outcome?;

    let snapshot = orchestrator.snapshot();
    report::print_final(&snapshot);

    if let Some(message) = report::first_error(&snapshot) {
        eprintln!("{message}");
        return Ok(1);
    }
    Ok(0)
}

/// CLI roots win; otherwise the config's roots (default: `.`).
fn resolve_roots(args: &CliArgs, cfg: &ConfigFile) -> Vec<PathBuf> {
    if args.roots.is_empty() {
        cfg.scan.roots.iter().map(PathBuf::from).collect()
    } else {
        args.roots.clone()
    }
}

/// A non-empty CLI list replaces the config list entirely.
fn pick(cli: Vec<String>, cfg: Vec<String>) -> Vec<String> {
    if cli.is_empty() { cfg } else { cli }
}
