//! Resolves CLI flags, environment variables and the settings file into a
//! validated [`Config`].
use chrono::NaiveDate;
use derive_builder::Builder;
use log::*;
use secrecy::SecretString;
use std::env;

use crate::{
    NotesaurusError, Result,
    cli::ConfigInputs,
    config::{Config, file::FileConfig},
    forge::types::RepoSlug,
    month::TargetMonth,
};

const SOURCE_REPOS_VARS: &[&str] = &["SOURCE_REPOS"];
const RELEASE_TAG_VARS: &[&str] = &["RELEASE_TAG"];
const TARGET_MONTH_VARS: &[&str] = &["TARGET_MONTH"];
const TARGET_REPO_VARS: &[&str] = &["TARGET_REPO"];
const GITHUB_TOKEN_VARS: &[&str] =
    &["GITHUB_TOKEN", "GITHUB_PERSONAL_ACCESS_TOKEN"];
const GEMINI_KEY_VARS: &[&str] = &["GEMINI_API_KEY"];

#[derive(Builder)]
#[builder(setter(into))]
pub struct ConfigResolver {
    file: FileConfig,
    inputs: ConfigInputs,
    /// Invocation date the default target month is derived from.
    today: NaiveDate,
}

impl ConfigResolver {
    pub fn resolve(&self) -> Result<Config> {
        let inputs = &self.inputs;

        let source_repos = flag_or_env(&inputs.source_repos, SOURCE_REPOS_VARS)
            .ok_or_else(|| {
                NotesaurusError::missing_config(
                    "source repositories (--source-repos or SOURCE_REPOS)",
                )
            })?;
        let source_repos = RepoSlug::parse_list(&source_repos)?;

        let target_month =
            match flag_or_env(&inputs.target_month, TARGET_MONTH_VARS) {
                Some(month) => TargetMonth::parse(&month)?,
                None => TargetMonth::preceding(self.today),
            };

        let target_repo = flag_or_env(&inputs.target_repo, TARGET_REPO_VARS)
            .map(|repo| RepoSlug::parse(&repo))
            .transpose()?;

        let github_token = flag_or_env(&inputs.github_token, GITHUB_TOKEN_VARS)
            .map(SecretString::from)
            .ok_or_else(|| {
                NotesaurusError::missing_config(
                    "GitHub token (--github-token, GITHUB_TOKEN or \
                     GITHUB_PERSONAL_ACCESS_TOKEN)",
                )
            })?;

        let gemini_api_key =
            flag_or_env(&inputs.gemini_api_key, GEMINI_KEY_VARS)
                .map(SecretString::from);

        debug!(
            "resolved {} source repositories, target month {target_month}",
            source_repos.len()
        );

        Config::builder()
            .source_repos(source_repos)
            .release_tag(flag_or_env(&inputs.release_tag, RELEASE_TAG_VARS))
            .target_month(target_month)
            .target_repo(target_repo)
            .github_token(github_token)
            .gemini_api_key(gemini_api_key)
            .settings(self.file.clone())
            .repo_path(inputs.repo_path.clone())
            .dry_run(inputs.dry_run)
            .build()
    }
}

/// The flag when set, otherwise the first non-blank variable in `vars`.
fn flag_or_env(flag: &Option<String>, vars: &[&str]) -> Option<String> {
    flag.iter()
        .cloned()
        .chain(vars.iter().filter_map(|var| env::var(var).ok()))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
