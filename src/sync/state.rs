//! Branch presence states and the checkout transitions between them.
use crate::{forge::types::RepoSlug, git::GitCommand};

/// Where the per-repository branch currently exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    NoBranch,
    LocalOnly,
    RemoteOnly,
    Both,
}

/// Next state plus the git commands that reach it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SyncState,
    pub commands: Vec<GitCommand>,
}

impl SyncState {
    pub fn from_probe(local: bool, remote: bool) -> Self {
        match (local, remote) {
            (false, false) => Self::NoBranch,
            (true, false) => Self::LocalOnly,
            (false, true) => Self::RemoteOnly,
            (true, true) => Self::Both,
        }
    }

    pub fn has_remote(&self) -> bool {
        matches!(self, Self::RemoteOnly | Self::Both)
    }

    /// Commands that leave `branch` checked out.
    pub fn checkout(
        self,
        branch: &str,
        base_branch: &str,
        remote: &str,
        rebase: bool,
    ) -> Transition {
        match self {
            Self::NoBranch => Transition {
                next: Self::LocalOnly,
                commands: vec![GitCommand::checkout_new(branch, base_branch)],
            },
            Self::RemoteOnly => Transition {
                next: Self::Both,
                commands: vec![GitCommand::checkout_tracking(branch, remote)],
            },
            Self::LocalOnly => Transition {
                next: Self::LocalOnly,
                commands: vec![GitCommand::checkout(branch)],
            },
            Self::Both => {
                let mut commands = vec![GitCommand::checkout(branch)];
                if rebase {
                    commands.push(GitCommand::pull_rebase(remote, branch));
                }
                Transition {
                    next: Self::Both,
                    commands,
                }
            }
        }
    }

    /// A successful push always leaves the branch on both sides.
    pub fn after_push(self) -> Self {
        Self::Both
    }
}

/// `<prefix>/<repo-name>`
pub fn branch_name(prefix: &str, repo: &RepoSlug) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), repo.name)
}
