mod common;

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use common::{clean_status, exit, ok, recent_log, timed_out, ScriptedRunner};
use githerd::engine::{EngineSettings, Orchestrator, Phase};
use githerd::exec::{ProcessRequest, ProcessResult, ProcessRunner};
use githerd::policy::{ExcludePolicy, FetchPolicy};
use githerd::repo::Status;

fn mkrepo(base: &Path, rel: &str) {
    fs::create_dir_all(base.join(rel).join(".git")).expect("create repo dir");
}

fn orchestrator(
    runner: Arc<ScriptedRunner>,
    exclude: &[&str],
    no_fetch: &[&str],
) -> Orchestrator<ScriptedRunner> {
    Orchestrator::new(
        runner,
        EngineSettings::default(),
        ExcludePolicy::new(exclude.iter().map(|s| s.to_string())),
        FetchPolicy::new(no_fetch.iter().map(|s| s.to_string())),
    )
}

#[tokio::test]
async fn full_run_classifies_every_repository() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    mkrepo(tmp.path(), "beta");
    mkrepo(tmp.path(), "vendor/libfoo");

    let runner = Arc::new(ScriptedRunner::new());
    runner.script("alpha", "status", clean_status());
    runner.script("alpha", "log", recent_log());
    runner.script(
        "beta",
        "status",
        ok(&["## main...origin/main", " M a.rs", " M b.rs"]),
    );

    let orch = orchestrator(Arc::clone(&runner), &["vendor/libfoo"], &[]);
    orch.run(&[tmp.path().to_path_buf()]).await.expect("run");

    let snap = orch.snapshot();
    assert_eq!(snap.phase, Phase::Completed);
    assert_eq!(snap.total, 3);
    assert_eq!(snap.completed, 3);
    assert!(snap.records.iter().all(|r| r.finished));

    let rels: Vec<&str> = snap.records.iter().map(|r| r.rel_path.as_str()).collect();
    assert_eq!(rels, vec!["alpha", "beta", "vendor/libfoo"]);

    let by_rel = |rel: &str| {
        snap.records
            .iter()
            .find(|r| r.rel_path == rel)
            .expect("record")
    };
    assert_eq!(by_rel("alpha").status, Status::UpToDate);
    assert_eq!(by_rel("beta").status, Status::Dirty);
    assert_eq!(by_rel("beta").detail, "[2 files]  M a.rs");
    assert_eq!(by_rel("vendor/libfoo").status, Status::Ignore);

    // The excluded repository never reached the runner.
    assert!(!runner.calls().iter().any(|c| c.starts_with("libfoo:")));
}

#[tokio::test]
async fn one_failing_repository_does_not_disturb_the_others() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    mkrepo(tmp.path(), "beta");
    mkrepo(tmp.path(), "gamma");

    let runner = Arc::new(ScriptedRunner::new());
    for repo in ["alpha", "gamma"] {
        runner.script(repo, "status", clean_status());
        runner.script(repo, "log", recent_log());
    }
    runner.script("beta", "status", exit(1, &[], &["fatal: bad object"]));

    let orch = orchestrator(Arc::clone(&runner), &[], &[]);
    orch.run(&[tmp.path().to_path_buf()]).await.expect("run");

    let snap = orch.snapshot();
    assert_eq!(snap.phase, Phase::Completed);
    let statuses: Vec<Status> = snap.records.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::UpToDate, Status::Error, Status::UpToDate]);
}

#[tokio::test]
async fn one_hanging_fetch_does_not_disturb_the_others() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    mkrepo(tmp.path(), "slow");

    let runner = Arc::new(ScriptedRunner::new());
    runner.script("alpha", "status", clean_status());
    runner.script("alpha", "log", recent_log());
    runner.script("slow", "fetch", timed_out(&[]));

    let orch = orchestrator(Arc::clone(&runner), &[], &[]);
    orch.run(&[tmp.path().to_path_buf()]).await.expect("run");

    let snap = orch.snapshot();
    let by_rel = |rel: &str| {
        snap.records
            .iter()
            .find(|r| r.rel_path == rel)
            .expect("record")
    };
    assert_eq!(by_rel("alpha").status, Status::UpToDate);
    assert_eq!(by_rel("slow").status, Status::Error);
}

#[tokio::test]
async fn wildcard_no_fetch_skips_fetch_everywhere() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    mkrepo(tmp.path(), "beta");

    let runner = Arc::new(ScriptedRunner::new());
    for repo in ["alpha", "beta"] {
        runner.script(repo, "status", clean_status());
        runner.script(repo, "log", recent_log());
    }

    let orch = orchestrator(Arc::clone(&runner), &[], &["*"]);
    orch.run(&[tmp.path().to_path_buf()]).await.expect("run");

    assert!(!runner.calls().iter().any(|c| c.ends_with(":fetch")));
    let snap = orch.snapshot();
    // Clean but unfetched: freshness cannot be asserted.
    assert!(snap.records.iter().all(|r| r.status == Status::Ignore));
}

#[tokio::test]
async fn fragment_no_fetch_skips_only_matching_repositories() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    mkrepo(tmp.path(), "archive");

    let runner = Arc::new(ScriptedRunner::new());
    for repo in ["alpha", "archive"] {
        runner.script(repo, "status", clean_status());
        runner.script(repo, "log", recent_log());
    }

    let orch = orchestrator(Arc::clone(&runner), &[], &["archive"]);
    orch.run(&[tmp.path().to_path_buf()]).await.expect("run");

    let calls = runner.calls();
    assert!(calls.contains(&"alpha:fetch".to_string()));
    assert!(!calls.contains(&"archive:fetch".to_string()));
}

#[tokio::test]
async fn discovery_failure_aborts_the_whole_run() {
    let tmp = tempfile::tempdir().expect("tempdir");
    mkrepo(tmp.path(), "alpha");
    let missing = tmp.path().join("no-such-root");

    let runner = Arc::new(ScriptedRunner::new());
    let orch = orchestrator(Arc::clone(&runner), &[], &[]);
    let result = orch
        .run(&[tmp.path().to_path_buf(), missing])
        .await;

    assert!(result.is_err());
    assert_eq!(orch.snapshot().phase, Phase::Error);
    // Processing never started.
    assert!(runner.calls().is_empty());
}

/// Runner that tracks how many invocations are in flight at once.
struct GaugeRunner {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl GaugeRunner {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            max: AtomicUsize::new(0),
        }
    }

    fn respond(request: &ProcessRequest) -> ProcessResult {
        match request.args.first().map(String::as_str) {
            Some("status") => clean_status(),
            Some("log") => recent_log(),
            _ => ok(&[]),
        }
    }
}

impl ProcessRunner for GaugeRunner {
    fn run(&self, request: ProcessRequest) -> impl Future<Output = Result<ProcessResult>> + Send {
        async move {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Self::respond(&request))
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_subprocesses_never_exceed_the_worker_bound() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for i in 0..12 {
        mkrepo(tmp.path(), &format!("repo{i:02}"));
    }

    let runner = Arc::new(GaugeRunner::new());
    let settings = EngineSettings {
        workers: 4,
        ..EngineSettings::default()
    };
    let orch = Orchestrator::new(
        Arc::clone(&runner),
        settings,
        ExcludePolicy::default(),
        FetchPolicy::default(),
    );
    orch.run(&[PathBuf::from(tmp.path())]).await.expect("run");

    let snap = orch.snapshot();
    assert_eq!(snap.total, 12);
    assert_eq!(snap.completed, 12);
    assert!(
        runner.max.load(Ordering::SeqCst) <= 4,
        "observed {} concurrent invocations",
        runner.max.load(Ordering::SeqCst)
    );
}
