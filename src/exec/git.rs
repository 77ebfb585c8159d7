// src/exec/git.rs

//! The fixed set of git invocations the status workflow uses.
//!
//! Every command runs with the working directory set to the repository path;
//! the argument strings here are the whole contract with git, so they live in
//! one place.

use std::path::Path;
use std::time::Duration;

use crate::exec::process::ProcessRequest;

/// One kind of git invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitOp {
    Remote,
    Fetch,
    Status,
    Log,
    Pull,
}

impl GitOp {
    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            GitOp::Remote => "remote",
            GitOp::Fetch => "fetch",
            GitOp::Status => "status",
            GitOp::Log => "log",
            GitOp::Pull => "pull",
        }
    }

    /// Argument vector passed to `git`.
    pub fn args(self) -> Vec<String> {
        let args: &[&str] = match self {
            GitOp::Remote => &["remote", "-v"],
            GitOp::Fetch => &["fetch"],
            GitOp::Status => &["status", "-bs"],
            GitOp::Log => &["log", "--pretty=(%cd) %s", "--date=relative", "-10"],
            GitOp::Pull => &["pull"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }
}

impl std::fmt::Display for GitOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the process request for one git invocation in `repo_path`.
pub fn git_request(
    op: GitOp,
    repo_path: &Path,
    timeout: Duration,
    poll_interval: Duration,
) -> ProcessRequest {
    ProcessRequest {
        program: "git".to_string(),
        args: op.args(),
        cwd: repo_path.to_path_buf(),
        poll_interval,
        timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_short_branch_format() {
        assert_eq!(GitOp::Status.args(), vec!["status", "-bs"]);
    }

    #[test]
    fn log_asks_for_ten_relative_dated_entries() {
        assert_eq!(
            GitOp::Log.args(),
            vec!["log", "--pretty=(%cd) %s", "--date=relative", "-10"]
        );
    }

    #[test]
    fn request_targets_the_repository_directory() {
        let req = git_request(
            GitOp::Fetch,
            Path::new("/tmp/repo"),
            Duration::from_secs(5),
            Duration::from_millis(10),
        );
        assert_eq!(req.program, "git");
        assert_eq!(req.cwd, Path::new("/tmp/repo"));
        assert_eq!(req.args, vec!["fetch"]);
    }
}
