//! Keeps one branch and one open pull request per source repository.
use log::*;
use std::{
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use crate::{
    NotesaurusError, Result,
    forge::{
        manager::ForgeManager,
        request::{CreatePrRequest, GetPrRequest, UpdatePrRequest},
        types::{Release, RepoSlug},
    },
    git::{GitCommand, GitOutput, GitRunner, SubprocessGit},
};

pub mod state;

use state::{SyncState, branch_name};

/// Local clone of the target repository.
pub struct WorkingCopy {
    path: PathBuf,
    remote: String,
    base_branch: String,
    git: Box<dyn GitRunner>,
}

impl WorkingCopy {
    pub fn new(
        path: impl Into<PathBuf>,
        remote: impl Into<String>,
        base_branch: impl Into<String>,
        git: Box<dyn GitRunner>,
    ) -> Self {
        Self {
            path: path.into(),
            remote: remote.into(),
            base_branch: base_branch.into(),
            git,
        }
    }

    /// Working copy driven by the `git` binary.
    pub fn open(
        path: impl Into<PathBuf>,
        remote: impl Into<String>,
        base_branch: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let path = path.into();
        let git = SubprocessGit::new(path.clone(), timeout);
        Self::new(path, remote, base_branch, Box::new(git))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// Runs `cmd`, turning a non-zero exit into [`NotesaurusError::Git`].
    async fn exec(&self, cmd: &GitCommand) -> Result<GitOutput> {
        let output = self.git.run(cmd).await?;

        if !output.success() {
            return Err(NotesaurusError::git(cmd.to_string(), output.stderr));
        }

        Ok(output)
    }

    async fn probe(&self, branch: &str) -> Result<SyncState> {
        let local = self
            .git
            .run(&GitCommand::local_branch_exists(branch))
            .await?
            .success();

        let ls_remote = GitCommand::remote_branch_exists(&self.remote, branch);
        let output = self.git.run(&ls_remote).await?;

        let remote = match output.code {
            Some(0) => true,
            Some(2) => false,
            _ => {
                return Err(NotesaurusError::git(
                    ls_remote.to_string(),
                    output.stderr,
                ));
            }
        };

        Ok(SyncState::from_probe(local, remote))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub branch_prefix: String,
    /// Rebase an existing branch onto its remote after checkout.
    pub rebase: bool,
    /// Mention newly drafted releases in an already open pull request.
    pub update_pr_body: bool,
}

/// Branch checked out for a repository, ready for a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub branch: String,
    pub state: SyncState,
}

/// What publishing a draft changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub committed: bool,
    pub pushed: bool,
    pub pull_request: Option<u64>,
}

pub struct Synchronizer {
    working_copy: WorkingCopy,
    forge: Rc<ForgeManager>,
    target_repo: RepoSlug,
    options: SyncOptions,
}

impl Synchronizer {
    pub fn new(
        working_copy: WorkingCopy,
        forge: Rc<ForgeManager>,
        target_repo: RepoSlug,
        options: SyncOptions,
    ) -> Self {
        Self {
            working_copy,
            forge,
            target_repo,
            options,
        }
    }

    pub fn working_copy(&self) -> &WorkingCopy {
        &self.working_copy
    }

    pub fn branch_for(&self, repo: &RepoSlug) -> String {
        branch_name(&self.options.branch_prefix, repo)
    }

    /// Fetches, probes and checks out the branch for `repo`.
    pub async fn prepare(&self, repo: &RepoSlug) -> Result<Prepared> {
        let wc = &self.working_copy;
        let branch = self.branch_for(repo);

        wc.exec(&GitCommand::fetch(&wc.remote)).await?;

        let state = wc.probe(&branch).await?;
        debug!("branch {branch} is in state {state:?}");

        let transition = state.checkout(
            &branch,
            &wc.base_branch,
            &wc.remote,
            self.options.rebase,
        );

        for cmd in transition.commands.iter() {
            wc.exec(cmd).await?;
        }

        info!("checked out {branch} for {repo}");

        Ok(Prepared {
            branch,
            state: transition.next,
        })
    }

    /// Commits and pushes the draft when it changed, then reconciles the
    /// pull request.
    pub async fn publish(
        &self,
        prepared: Prepared,
        release: &Release,
        draft: &Path,
    ) -> Result<SyncReport> {
        let wc = &self.working_copy;
        let draft = draft.to_string_lossy();
        let mut state = prepared.state;
        let mut report = SyncReport::default();

        wc.exec(&GitCommand::add(&draft)).await?;
        let status = wc.exec(&GitCommand::status_porcelain(&draft)).await?;

        if !status.stdout.is_empty() {
            let message = format!(
                "Update release notes for {} {}",
                release.repo, release.tag
            );
            wc.exec(&GitCommand::commit(&message, &draft)).await?;
            report.committed = true;
            info!("committed {draft} on {}", prepared.branch);
        } else {
            info!("{draft} is unchanged on {}", prepared.branch);
        }

        // a local-only branch may hold commits from an earlier failed push
        if report.committed || state == SyncState::LocalOnly {
            self.push(&prepared.branch).await?;
            report.pushed = true;
            state = state.after_push();
        }

        if state.has_remote() {
            report.pull_request =
                Some(self.reconcile_pr(&prepared.branch, release).await?);
        }

        Ok(report)
    }

    /// Returns the working copy to a clean integration branch, discarding
    /// anything a failed run left behind for `draft`.
    pub async fn finish(&self, draft: &Path) -> Result<()> {
        let wc = &self.working_copy;
        let draft = draft.to_string_lossy();

        if wc.git.run(&GitCommand::rebase_in_progress()).await?.success() {
            warn!("aborting unfinished rebase in {}", wc.path.display());
            wc.exec(&GitCommand::rebase_abort()).await?;
        }

        wc.exec(&GitCommand::unstage(&draft)).await?;
        wc.exec(&GitCommand::force_checkout(&wc.base_branch)).await?;
        wc.exec(&GitCommand::clean(&draft)).await?;

        Ok(())
    }

    async fn push(&self, branch: &str) -> Result<()> {
        let wc = &self.working_copy;
        let push = GitCommand::push(&wc.remote, branch);

        let first = wc.git.run(&push).await?;

        if first.success() {
            info!("pushed {branch} to {}", wc.remote);
            return Ok(());
        }

        warn!(
            "push of {branch} rejected, rebasing onto {}/{branch}: {}",
            wc.remote, first.stderr
        );

        wc.exec(&GitCommand::pull_rebase(&wc.remote, branch)).await?;
        wc.exec(&push).await?;

        info!("pushed {branch} to {} after rebase", wc.remote);
        Ok(())
    }

    async fn reconcile_pr(
        &self,
        branch: &str,
        release: &Release,
    ) -> Result<u64> {
        let existing = self
            .forge
            .find_open_pr(GetPrRequest {
                repo: self.target_repo.clone(),
                head: format!("{}:{branch}", self.target_repo.owner),
                base_branch: self.working_copy.base_branch.clone(),
            })
            .await?;

        let Some(pr) = existing else {
            let pr = self
                .forge
                .create_pr(CreatePrRequest {
                    repo: self.target_repo.clone(),
                    head_branch: branch.to_string(),
                    base_branch: self.working_copy.base_branch.clone(),
                    title: format!(
                        "Release notes updates for {}",
                        release.repo
                    ),
                    body: format!(
                        "Automated release notes updates.\n\n\
                         Source release: {}",
                        release.html_url
                    ),
                })
                .await?;
            info!("opened pull request #{} for {branch}", pr.number);
            return Ok(pr.number);
        };

        info!("pull request #{} already open for {branch}", pr.number);

        if self.options.update_pr_body && !pr.body.contains(&release.html_url) {
            let body = format!(
                "{}\n- {}: {}",
                pr.body.trim_end(),
                release.tag,
                release.html_url
            );

            self.forge
                .update_pr(UpdatePrRequest {
                    repo: self.target_repo.clone(),
                    pr_number: pr.number,
                    body,
                })
                .await?;

            info!("added {} to pull request #{}", release.tag, pr.number);
        }

        Ok(pr.number)
    }
}
