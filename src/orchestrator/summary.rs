//! Per-repository outcomes of a run.
use log::*;
use std::{fmt, path::PathBuf};

use crate::forge::types::RepoSlug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    Drafted {
        path: PathBuf,
        /// Backend that wrote the text; `None` when fallback text was used.
        generated_by: Option<String>,
        committed: bool,
        pull_request: Option<u64>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drafted {
                path,
                generated_by,
                committed,
                pull_request,
            } => {
                write!(f, "drafted {}", path.display())?;
                match generated_by {
                    Some(backend) => write!(f, " with {backend}")?,
                    None => write!(f, " from release text")?,
                }
                if *committed {
                    write!(f, ", committed")?;
                }
                if let Some(number) = pull_request {
                    write!(f, ", pull request #{number}")?;
                }
                Ok(())
            }
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    pub repo: RepoSlug,
    pub status: RepoStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<RepoOutcome>,
}

impl RunSummary {
    pub fn push(&mut self, repo: &RepoSlug, status: RepoStatus) {
        self.outcomes.push(RepoOutcome {
            repo: repo.clone(),
            status,
        });
    }

    pub fn status_of(&self, repo: &RepoSlug) -> Option<&RepoStatus> {
        self.outcomes
            .iter()
            .find(|o| &o.repo == repo)
            .map(|o| &o.status)
    }

    pub fn drafted(&self) -> usize {
        self.count(|s| matches!(s, RepoStatus::Drafted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RepoStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RepoStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RepoStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn log(&self) {
        for outcome in self.outcomes.iter() {
            match outcome.status {
                RepoStatus::Drafted { .. } => {
                    info!("{}: {}", outcome.repo, outcome.status)
                }
                RepoStatus::Skipped { .. } => {
                    warn!("{}: {}", outcome.repo, outcome.status)
                }
                RepoStatus::Failed { .. } => {
                    error!("{}: {}", outcome.repo, outcome.status)
                }
            }
        }

        info!(
            "run complete: {} drafted, {} skipped, {} failed",
            self.drafted(),
            self.skipped(),
            self.failed()
        );
    }
}
