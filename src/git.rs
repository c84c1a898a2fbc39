//! Git subprocess plumbing for the working copy.
use async_trait::async_trait;
use log::*;
use std::{fmt, path::PathBuf, process::Stdio, time::Duration};
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::{NotesaurusError, Result, deadline::within};

/// Arguments of a single git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
}

impl GitCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn fetch(remote: &str) -> Self {
        Self::new(["fetch", remote])
    }

    pub fn checkout(branch: &str) -> Self {
        Self::new(["checkout", branch])
    }

    pub fn checkout_new(branch: &str, start: &str) -> Self {
        Self::new(["checkout", "-b", branch, start])
    }

    pub fn checkout_tracking(branch: &str, remote: &str) -> Self {
        let upstream = format!("{remote}/{branch}");
        Self::new(["checkout", "-b", branch, "--track", upstream.as_str()])
    }

    /// Discards local changes to tracked files.
    pub fn force_checkout(branch: &str) -> Self {
        Self::new(["checkout", "-f", branch])
    }

    pub fn pull_rebase(remote: &str, branch: &str) -> Self {
        Self::new(["pull", "--rebase", remote, branch])
    }

    /// Succeeds only while a rebase is stopped on a conflict.
    pub fn rebase_in_progress() -> Self {
        Self::new(["rev-parse", "--quiet", "--verify", "REBASE_HEAD"])
    }

    pub fn rebase_abort() -> Self {
        Self::new(["rebase", "--abort"])
    }

    pub fn unstage(path: &str) -> Self {
        Self::new(["reset", "--quiet", "--", path])
    }

    /// Removes `path` if it is untracked.
    pub fn clean(path: &str) -> Self {
        Self::new(["clean", "--force", "--quiet", "--", path])
    }

    pub fn add(path: &str) -> Self {
        Self::new(["add", "--", path])
    }

    pub fn status_porcelain(path: &str) -> Self {
        Self::new(["status", "--porcelain", "--", path])
    }

    pub fn commit(message: &str, path: &str) -> Self {
        Self::new(["commit", "-m", message, "--", path])
    }

    pub fn push(remote: &str, branch: &str) -> Self {
        Self::new(["push", "-u", remote, branch])
    }

    pub fn local_branch_exists(branch: &str) -> Self {
        let reference = format!("refs/heads/{branch}");
        Self::new(["rev-parse", "--verify", "--quiet", reference.as_str()])
    }

    /// Exits 2 when the remote has no such branch.
    pub fn remote_branch_exists(remote: &str, branch: &str) -> Self {
        Self::new(["ls-remote", "--exit-code", "--heads", remote, branch])
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// Captured result of a finished git process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs git commands against a working copy.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GitRunner {
    /// Runs the command to completion. A non-zero exit is not an error here.
    async fn run(&self, cmd: &GitCommand) -> Result<GitOutput>;
}

/// Runs the `git` binary in `workdir`.
pub struct SubprocessGit {
    workdir: PathBuf,
    timeout: Duration,
}

impl SubprocessGit {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GitRunner for SubprocessGit {
    async fn run(&self, cmd: &GitCommand) -> Result<GitOutput> {
        debug!("running: git {cmd}");

        let operation = format!("git {cmd}");
        let output = within(&operation, self.timeout, async {
            let output = Command::new("git")
                .args(cmd.args())
                .current_dir(&self.workdir)
                .env("GIT_TERMINAL_PROMPT", "0")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await?;
            Ok::<_, NotesaurusError>(output)
        })
        .await?;

        Ok(GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
