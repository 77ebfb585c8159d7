// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file (`Githerd.toml`).
///
/// ```toml
/// [scan]
/// roots = ["/srv/repos", "/srv/mirrors"]
/// exclude = ["vendor/libfoo"]
/// max_depth = 8
///
/// [process]
/// workers = 4
/// timeout_secs = 120
/// poll_interval_ms = 50
///
/// [git]
/// no_fetch = ["archive"]
/// query_remotes = false
/// ```
///
/// All sections are optional and have reasonable defaults; CLI flags override
/// the corresponding fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Discovery settings from `[scan]`.
    #[serde(default)]
    pub scan: ScanSection,

    /// Subprocess settings from `[process]`.
    #[serde(default)]
    pub process: ProcessSection,

    /// Git behaviour from `[git]`.
    #[serde(default)]
    pub git: GitSection,
}

/// `[scan]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSection {
    /// Root paths to scan when none are given on the command line.
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// Relative-path suffix fragments; matched repositories are reported but
    /// never processed.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum directory depth the scanner descends below each root.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_roots() -> Vec<String> {
    vec![".".to_string()]
}

fn default_max_depth() -> usize {
    8
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            exclude: Vec::new(),
            max_depth: default_max_depth(),
        }
    }
}

/// `[process]` section.
///
/// `workers` is the named concurrency bound: at most this many git processes
/// are in flight at once, independent of how many repositories are found.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessSection {
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Deadline for a single git invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How often a running git process is polled for completion.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_workers() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for ProcessSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// `[git]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitSection {
    /// Relative-path suffix fragments for which `git fetch` is skipped.
    /// A single `"*"` entry skips fetch for every repository.
    #[serde(default)]
    pub no_fetch: Vec<String>,

    /// Run `git remote -v` for every repository before anything else.
    #[serde(default)]
    pub query_remotes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: ConfigFile = toml::from_str("").expect("parse");
        assert_eq!(cfg.scan.roots, vec![".".to_string()]);
        assert_eq!(cfg.scan.max_depth, 8);
        assert_eq!(cfg.process.workers, 4);
        assert_eq!(cfg.process.timeout_secs, 120);
        assert_eq!(cfg.process.poll_interval_ms, 50);
        assert!(cfg.git.no_fetch.is_empty());
        assert!(!cfg.git.query_remotes);
    }

    #[test]
    fn sections_override_defaults() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            [scan]
            roots = ["/srv/repos"]
            exclude = ["vendor"]
            max_depth = 3

            [process]
            workers = 2

            [git]
            no_fetch = ["*"]
            query_remotes = true
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.scan.roots, vec!["/srv/repos".to_string()]);
        assert_eq!(cfg.scan.exclude, vec!["vendor".to_string()]);
        assert_eq!(cfg.scan.max_depth, 3);
        assert_eq!(cfg.process.workers, 2);
        assert_eq!(cfg.git.no_fetch, vec!["*".to_string()]);
        assert!(cfg.git.query_remotes);
    }
}
