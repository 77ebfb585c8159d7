// src/scan/mod.rs

//! Repository discovery.
//!
//! This module only turns root paths into [`crate::repo::RepoRecord`]s; it
//! knows nothing about buckets, git commands, or classification.

pub mod walker;

pub use walker::{scan_root, DEFAULT_MAX_DEPTH};
