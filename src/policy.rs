// src/policy.rs

//! Path-based policies derived from `--exclude` and `--no-fetch`.
//!
//! Both policies match the *relative* path of a repository (relative to its
//! scan root, forward slashes) against a list of suffix fragments. This is a
//! deliberate, simple contract: `--exclude vendor/libfoo` matches
//! `third_party/vendor/libfoo` but not `vendor/libfoo-extras`.

/// Decides which discovered repositories are reported but never processed.
#[derive(Debug, Clone, Default)]
pub struct ExcludePolicy {
    fragments: Vec<String>,
}

impl ExcludePolicy {
    /// Build a policy from raw fragments; empty entries are dropped.
    pub fn new(fragments: impl IntoIterator<Item = String>) -> Self {
        Self {
            fragments: clean(fragments),
        }
    }

    /// True if the relative path ends with any configured fragment.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.fragments.iter().any(|f| rel_path.ends_with(f))
    }
}

/// Decides whether the fetch step runs for a given repository.
#[derive(Debug, Clone, Default)]
pub struct FetchPolicy {
    disable_all: bool,
    fragments: Vec<String>,
}

impl FetchPolicy {
    /// Build a policy from raw fragments.
    ///
    /// A single `"*"` entry disables fetch for every repository; otherwise
    /// fetch is disabled for repositories whose relative path ends with a
    /// listed fragment.
    pub fn new(fragments: impl IntoIterator<Item = String>) -> Self {
        let fragments = clean(fragments);
        let disable_all = fragments.iter().any(|f| f == "*");
        Self {
            disable_all,
            fragments,
        }
    }

    /// True if `git fetch` should run for the repository at `rel_path`.
    pub fn fetch_allowed(&self, rel_path: &str) -> bool {
        if self.disable_all {
            return false;
        }
        !self.fragments.iter().any(|f| rel_path.ends_with(f))
    }
}

fn clean(fragments: impl IntoIterator<Item = String>) -> Vec<String> {
    fragments
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}
