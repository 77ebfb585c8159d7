// src/config/validate.rs

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `workers >= 1` (a zero-wide worker pool can process nothing)
/// - `timeout_secs >= 1` and `poll_interval_ms >= 1`
/// - `max_depth >= 1`
///
/// A poll interval longer than the timeout is legal but almost certainly a
/// mistake, so it is only warned about.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.process.workers == 0 {
        return Err(anyhow!("[process].workers must be >= 1 (got 0)"));
    }
    if cfg.process.timeout_secs == 0 {
        return Err(anyhow!("[process].timeout_secs must be >= 1 (got 0)"));
    }
    if cfg.process.poll_interval_ms == 0 {
        return Err(anyhow!("[process].poll_interval_ms must be >= 1 (got 0)"));
    }
    if cfg.scan.max_depth == 0 {
        return Err(anyhow!("[scan].max_depth must be >= 1 (got 0)"));
    }

    if cfg.process.poll_interval_ms > cfg.process.timeout_secs * 1000 {
        warn!(
            poll_interval_ms = cfg.process.poll_interval_ms,
            timeout_secs = cfg.process.timeout_secs,
            "poll interval exceeds the process timeout; every command will be polled exactly once"
        );
    }

    Ok(())
}
