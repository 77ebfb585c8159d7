// src/scan/walker.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::policy::ExcludePolicy;
use crate::repo::RepoRecord;

/// Default bound on how deep the walk descends below a scan root.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Walk one root path and return a record for every git repository found.
///
/// - A directory containing `.git` (directory or gitdir file) is a
///   repository root; the walk never descends beneath one.
/// - Repositories matched by the exclude policy still appear in the result,
///   pre-marked [`crate::repo::Status::Ignore`].
/// - Hidden directories are skipped.
/// - Any I/O failure aborts the scan of this root; the orchestrator treats
///   that as fatal to the whole run.
pub fn scan_root(root: &Path, max_depth: usize, exclude: &ExcludePolicy) -> Result<Vec<RepoRecord>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("resolving scan root {:?}", root))?;

    let mut found = Vec::new();
    visit(&root, &root, 0, max_depth, exclude, &mut found)?;
    debug!(root = %root.display(), repositories = found.len(), "scan finished");
    Ok(found)
}

fn visit(
    root: &Path,
    dir: &Path,
    depth: usize,
    max_depth: usize,
    exclude: &ExcludePolicy,
    out: &mut Vec<RepoRecord>,
) -> Result<()> {
    if is_repo_root(dir) {
        let rel = relative_str(root, dir);
        let record = if exclude.matches(&rel) {
            debug!(repo = %rel, "repository matches exclude fragment; pre-marked ignored");
            RepoRecord::ignored(dir.to_path_buf(), rel)
        } else {
            RepoRecord::found(dir.to_path_buf(), rel)
        };
        out.push(record);
        return Ok(());
    }

    if depth >= max_depth {
        return Ok(());
    }

    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))? {
        let entry = entry.with_context(|| format!("reading an entry under {:?}", dir))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {:?}", entry.path()))?;
        // Plain directories only; following symlinks could loop forever.
        if !file_type.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        visit(root, &entry.path(), depth + 1, max_depth, exclude, out)?;
    }

    Ok(())
}

fn is_repo_root(dir: &Path) -> bool {
    // `.git` is a file, not a directory, for worktrees and submodules.
    dir.join(".git").exists()
}

/// Relative path with forward slashes; the root itself becomes `"."`.
fn relative_str(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
