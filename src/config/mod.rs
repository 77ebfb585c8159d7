// src/config/mod.rs

//! Configuration loading and validation for githerd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like a nonzero worker count (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, load_or_default};
pub use model::{ConfigFile, GitSection, ProcessSection, ScanSection};
pub use validate::validate_config;
