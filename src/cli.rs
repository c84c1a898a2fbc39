//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::{config::file::DEFAULT_CONFIG_FILE, render::RenderStrategy};

/// Global CLI arguments. Unset values fall back to environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Comma-separated owner/repo list. Falls back to SOURCE_REPOS.
    pub source_repos: Option<String>,

    #[arg(long, global = true)]
    /// Release tag to draft. Falls back to RELEASE_TAG, then the latest
    /// release of each repository.
    pub release_tag: Option<String>,

    #[arg(long, global = true)]
    /// Month to aggregate as YYYY-MM. Falls back to TARGET_MONTH, then the
    /// month before today.
    pub target_month: Option<String>,

    #[arg(long, global = true)]
    /// owner/repo that receives release-note pull requests. Falls back to
    /// TARGET_REPO. Without one no branches or pull requests are touched.
    pub target_repo: Option<String>,

    #[arg(long, global = true)]
    /// GitHub token. Falls back to GITHUB_TOKEN, then
    /// GITHUB_PERSONAL_ACCESS_TOKEN.
    pub github_token: Option<String>,

    #[arg(long, global = true)]
    /// Gemini API key. Falls back to GEMINI_API_KEY. Without one, drafts use
    /// the unmodified release text.
    pub gemini_api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the optional settings file, relative to --repo-path.
    pub config: PathBuf,

    #[arg(long, default_value = ".", global = true)]
    /// Working copy of the target repository. Drafts are written here.
    pub repo_path: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Write drafts but leave branches and pull requests alone.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Drafting subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Draft notes for one release per repository and sync them to a branch.
    Release,

    /// Draft one consolidated note for every release in a month.
    Monthly {
        #[arg(long, default_value_t = false)]
        /// List changes chronologically instead of by product.
        flat: bool,
    },
}

impl Command {
    pub fn strategy(&self) -> RenderStrategy {
        match self {
            Self::Release => RenderStrategy::PerRelease,
            Self::Monthly { flat: true } => RenderStrategy::MonthlyFlat,
            Self::Monthly { flat: false } => RenderStrategy::MonthlyByProduct,
        }
    }
}

/// Values supplied on the command line, before environment fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInputs {
    pub source_repos: Option<String>,
    pub release_tag: Option<String>,
    pub target_month: Option<String>,
    pub target_repo: Option<String>,
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub repo_path: PathBuf,
    pub dry_run: bool,
}

impl Args {
    pub fn inputs(&self) -> ConfigInputs {
        ConfigInputs {
            source_repos: self.source_repos.clone(),
            release_tag: self.release_tag.clone(),
            target_month: self.target_month.clone(),
            target_repo: self.target_repo.clone(),
            github_token: self.github_token.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            repo_path: self.repo_path.clone(),
            dry_run: self.dry_run,
        }
    }
}
