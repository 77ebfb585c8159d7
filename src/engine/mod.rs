// src/engine/mod.rs

//! Orchestration engine for githerd.
//!
//! This module ties together:
//! - concurrent discovery across root paths
//! - the bucketed processing phase that bounds subprocess concurrency
//! - the read-only snapshot contract the presenter consumes

pub mod orchestrator;
pub mod snapshot;

pub use orchestrator::{EngineSettings, Orchestrator};
pub use snapshot::{Phase, ProgressSnapshot, RecordView};
