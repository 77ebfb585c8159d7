// src/exec/process.rs

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// One external command invocation: what to run, where, and for how long.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory the process is spawned in.
    pub cwd: PathBuf,
    /// How often the child is polled for completion.
    pub poll_interval: Duration,
    /// Deadline after which the child is killed and reaped.
    pub timeout: Duration,
}

/// Outcome of one subprocess invocation. Immutable once returned.
///
/// A nonzero exit code is *not* an error at this layer; the executor only
/// reports facts and callers decide what is fatal.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    /// Exit code, or `None` when the process did not exit naturally (killed
    /// on timeout, or terminated by a signal).
    pub exit_code: Option<i32>,
    /// Captured stdout lines, in arrival order.
    pub stdout: Vec<String>,
    /// Captured stderr lines, in arrival order.
    pub stderr: Vec<String>,
    /// Total wall-clock time spent on the invocation.
    pub duration: Duration,
    /// True when the deadline passed before the process exited.
    pub timed_out: bool,
}

impl ProcessResult {
    /// Convenience for the common success check.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Seam between the status workflow and the operating system.
///
/// Production code uses [`OsProcessRunner`]; tests substitute scripted
/// runners that return predetermined results without spawning processes.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, request: ProcessRequest) -> impl Future<Output = Result<ProcessResult>> + Send;
}

/// Runner that spawns real OS processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessRunner;

impl ProcessRunner for OsProcessRunner {
    fn run(&self, request: ProcessRequest) -> impl Future<Output = Result<ProcessResult>> + Send {
        run_process(request)
    }
}

/// Run one external command to completion or timeout, capturing output
/// incrementally.
///
/// Stdout and stderr are drained line by line on background tasks while the
/// child runs, so a timeout still yields whatever output arrived before the
/// deadline. Completion is detected by polling `try_wait` at the request's
/// poll interval; a child that outlives its deadline is killed and reaped
/// rather than left running detached.
pub async fn run_process(request: ProcessRequest) -> Result<ProcessResult> {
    let started = Instant::now();

    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args)
        .current_dir(&request.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().with_context(|| {
        format!(
            "spawning {} {} in {:?}",
            request.program,
            request.args.join(" "),
            request.cwd
        )
    })?;

    let (stdout_buf, stdout_task) = spawn_line_reader(child.stdout.take());
    let (stderr_buf, stderr_task) = spawn_line_reader(child.stderr.take());

    let deadline = started + request.timeout;
    let (exit_code, timed_out) = loop {
        match child.try_wait().context("polling child process")? {
            Some(status) => break (status.code(), false),
            None if Instant::now() >= deadline => {
                // Kill and reap so the OS process does not outlive the run.
                let _ = child.start_kill();
                let _ = child.wait().await;
                break (None, true);
            }
            None => sleep(request.poll_interval).await,
        }
    };

    if timed_out {
        // A killed child may leave grandchildren holding the pipes open, so
        // give the readers one grace period and then abandon them.
        let grace = request.poll_interval.max(Duration::from_millis(50));
        settle_reader(stdout_task, grace).await;
        settle_reader(stderr_task, grace).await;
    } else {
        drain_reader(stdout_task).await;
        drain_reader(stderr_task).await;
    }

    Ok(ProcessResult {
        exit_code,
        stdout: take_lines(&stdout_buf),
        stderr: take_lines(&stderr_buf),
        duration: started.elapsed(),
        timed_out,
    })
}

type LineBuffer = Arc<Mutex<Vec<String>>>;

/// Spawn a task that appends complete lines to a shared buffer as they
/// arrive. The buffer is shared so partial output survives an abandoned
/// reader.
fn spawn_line_reader<P>(pipe: Option<P>) -> (LineBuffer, Option<JoinHandle<()>>)
where
    P: AsyncRead + Unpin + Send + 'static,
{
    let buffer: LineBuffer = Arc::new(Mutex::new(Vec::new()));
    let task = pipe.map(|pipe| {
        let buffer = Arc::clone(&buffer);
        tokio::spawn(async move {
            let mut lines = BufReader::new(pipe).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                buffer.lock().expect("line buffer poisoned").push(line);
            }
        })
    });
    (buffer, task)
}

async fn drain_reader(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        let _ = task.await;
    }
}

async fn settle_reader(task: Option<JoinHandle<()>>, grace: Duration) {
    let Some(mut task) = task else { return };
    if tokio::time::timeout(grace, &mut task).await.is_err() {
        task.abort();
    }
}

fn take_lines(buffer: &LineBuffer) -> Vec<String> {
    std::mem::take(&mut *buffer.lock().expect("line buffer poisoned"))
}
