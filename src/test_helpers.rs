//! Common test helper functions shared across test modules.
//!
//! Provides fixtures for releases and throwaway git repositories so the
//! fetcher, synchronizer and orchestrator suites do not rebuild them.
use chrono::{DateTime, Utc};
use std::{path::Path, process::Command};
use tempfile::TempDir;

use crate::forge::types::{PullRequest, Release, RepoSlug};

/// Creates a published, non-draft release.
///
/// # Example
/// ```ignore
/// let release = create_test_release(
///     "acme/app",
///     "v1.2.0",
///     "2026-01-15T10:00:00Z",
///     "Fixed bug #42",
/// );
/// ```
pub fn create_test_release(
    repo: &str,
    tag: &str,
    published_at: &str,
    body: &str,
) -> Release {
    let repo = RepoSlug::parse(repo).unwrap();
    let html_url = format!(
        "https://github.com/{}/{}/releases/tag/{tag}",
        repo.owner, repo.name
    );

    Release {
        repo,
        tag: tag.to_string(),
        name: Some(tag.to_string()),
        published_at: published_at.parse::<DateTime<Utc>>().unwrap(),
        body: body.to_string(),
        html_url,
        draft: false,
        prerelease: false,
    }
}

/// Creates an open pull request fixture.
pub fn create_test_pull_request(number: u64, body: &str) -> PullRequest {
    PullRequest {
        number,
        body: body.to_string(),
        html_url: Some(format!("https://github.com/acme/notes/pull/{number}")),
    }
}

/// Runs git in `dir`, panicking with stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare remote plus a clone of it with one commit on `main`.
pub struct TestRepos {
    /// Keeps both repositories alive for the duration of a test.
    pub root: TempDir,
}

impl TestRepos {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let remote = root.path().join("remote.git");
        let work = root.path().join("work");

        git(
            root.path(),
            &["init", "--bare", "-b", "main", remote.to_str().unwrap()],
        );
        git(
            root.path(),
            &["clone", remote.to_str().unwrap(), work.to_str().unwrap()],
        );
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        std::fs::write(work.join("README.md"), "# notes\n").unwrap();
        git(&work, &["add", "README.md"]);
        git(&work, &["commit", "-m", "initial commit"]);
        git(&work, &["push", "-u", "origin", "main"]);

        Self { root }
    }

    pub fn work(&self) -> std::path::PathBuf {
        self.root.path().join("work")
    }

    pub fn remote(&self) -> std::path::PathBuf {
        self.root.path().join("remote.git")
    }

    /// Number of commits on `branch` in the bare remote.
    pub fn remote_commit_count(&self, branch: &str) -> usize {
        git(&self.remote(), &["rev-list", "--count", branch])
            .parse()
            .unwrap()
    }
}
