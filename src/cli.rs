// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `githerd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "githerd",
    version,
    about = "Discover git repositories and refresh their remote-tracking state.",
    long_about = None
)]
pub struct CliArgs {
    /// Root paths to scan for repositories.
    ///
    /// Default: the current working directory.
    #[arg(value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Skip repositories whose relative path ends with any of these fragments.
    ///
    /// Matched repositories still show up in the report, marked as ignored.
    #[arg(long, value_name = "FRAGMENT", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Skip `git fetch` for matching repositories; `*` disables fetch everywhere.
    #[arg(long, value_name = "FRAGMENT", value_delimiter = ',')]
    pub no_fetch: Vec<String>,

    /// Pull repositories that are behind their upstream.
    #[arg(short = 'p', long)]
    pub pull: bool,

    /// Also run `git remote -v` for every repository.
    #[arg(long)]
    pub remotes: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Githerd.toml` in the current working directory; a missing
    /// file falls back to built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Githerd.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GITHERD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
