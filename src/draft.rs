//! Markdown drafts persisted at deterministic paths.
use log::*;
use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    NotesaurusError, Result, forge::types::RepoSlug, month::TargetMonth,
};

/// Identifies the file a draft is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftKey {
    /// `<drafts>/<owner>/<repo>/<tag>.md`
    Release { repo: RepoSlug, tag: String },
    /// `<drafts>/<YYYY-MM>.md`
    Month(TargetMonth),
}

impl DraftKey {
    pub fn release(repo: &RepoSlug, tag: &str) -> Self {
        Self::Release {
            repo: repo.clone(),
            tag: tag.to_string(),
        }
    }

    /// Path relative to the drafts directory.
    fn relative(&self) -> Result<PathBuf> {
        match self {
            Self::Release { repo, tag } => {
                let file = sanitize_tag(tag)?;
                Ok(PathBuf::from(&repo.owner)
                    .join(&repo.name)
                    .join(format!("{file}.md")))
            }
            Self::Month(month) => Ok(PathBuf::from(format!("{month}.md"))),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { repo, tag } => write!(f, "{repo}@{tag}"),
            Self::Month(month) => write!(f, "{month}"),
        }
    }
}

fn sanitize_tag(tag: &str) -> Result<String> {
    let cleaned = tag.trim().replace(['/', '\\', ':'], "-");

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(NotesaurusError::invalid_config(format!(
            "tag \"{tag}\" cannot be used as a draft file name"
        )));
    }

    Ok(cleaned)
}

/// What happens when a draft already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    #[default]
    Overwrite,
    SkipExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Skipped(path) => path,
        }
    }
}

/// Writes drafts below `<workdir>/<drafts_dir>`.
#[derive(Debug, Clone)]
pub struct DraftWriter {
    workdir: PathBuf,
    drafts_dir: PathBuf,
    policy: WritePolicy,
}

impl DraftWriter {
    pub fn new(
        workdir: impl Into<PathBuf>,
        drafts_dir: impl Into<PathBuf>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            workdir: workdir.into(),
            drafts_dir: drafts_dir.into(),
            policy,
        }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Path relative to the working copy, as passed to git.
    pub fn relative_path(&self, key: &DraftKey) -> Result<PathBuf> {
        Ok(self.drafts_dir.join(key.relative()?))
    }

    pub fn path_for(&self, key: &DraftKey) -> Result<PathBuf> {
        Ok(self.workdir.join(self.relative_path(key)?))
    }

    pub async fn exists(&self, key: &DraftKey) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)?).await?)
    }

    /// Writes the full content, replacing any previous draft.
    pub async fn write(
        &self,
        key: &DraftKey,
        content: &str,
    ) -> Result<WriteOutcome> {
        let path = self.path_for(key)?;

        if self.policy == WritePolicy::SkipExisting
            && tokio::fs::try_exists(&path).await?
        {
            info!("draft for {key} already exists: {}", path.display());
            return Ok(WriteOutcome::Skipped(path));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, content).await?;
        info!("wrote draft for {key} to {}", path.display());

        Ok(WriteOutcome::Written(path))
    }
}
