#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use githerd::exec::{ProcessRequest, ProcessResult, ProcessRunner};

/// A runner that returns scripted results instead of spawning processes.
///
/// Results are keyed by `<repo dir name>:<git subcommand>`; anything not
/// scripted succeeds with empty output. Every invocation is recorded so
/// tests can assert on which commands ran, and in what order.
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, ProcessResult>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(&self, repo: &str, op: &str, result: ProcessResult) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{repo}:{op}"), result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn lookup(&self, request: &ProcessRequest) -> ProcessResult {
        let repo = request
            .cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let op = request.args.first().cloned().unwrap_or_default();
        let key = format!("{repo}:{op}");
        self.calls.lock().unwrap().push(key.clone());
        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| exit(0, &[], &[]))
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, request: ProcessRequest) -> impl Future<Output = Result<ProcessResult>> + Send {
        let result = self.lookup(&request);
        async move { Ok(result) }
    }
}

pub fn exit(code: i32, stdout: &[&str], stderr: &[&str]) -> ProcessResult {
    ProcessResult {
        exit_code: Some(code),
        stdout: stdout.iter().map(|s| s.to_string()).collect(),
        stderr: stderr.iter().map(|s| s.to_string()).collect(),
        duration: Duration::from_millis(5),
        timed_out: false,
    }
}

pub fn ok(stdout: &[&str]) -> ProcessResult {
    exit(0, stdout, &[])
}

pub fn timed_out(stdout: &[&str]) -> ProcessResult {
    ProcessResult {
        exit_code: None,
        stdout: stdout.iter().map(|s| s.to_string()).collect(),
        stderr: Vec::new(),
        duration: Duration::from_secs(30),
        timed_out: true,
    }
}

pub fn clean_status() -> ProcessResult {
    ok(&["## main...origin/main"])
}

pub fn recent_log() -> ProcessResult {
    ok(&["(2 days ago) latest change", "(3 days ago) older change"])
}
