//! Run configuration validated once at startup.
//!
//! Settings come from three places, highest precedence first:
//!
//! 1. CLI flags
//! 2. Environment variables
//! 3. `notesaurus.toml`, then built-in defaults
use derive_builder::Builder;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

use crate::{
    NotesaurusError, Result,
    bucket::ProductMap,
    draft::WritePolicy,
    forge::{config::RemoteConfig, types::RepoSlug},
    month::TargetMonth,
};

pub mod file;
pub mod resolver;

use file::FileConfig;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct Config {
    /// Repositories whose releases are drafted, in processing order.
    pub source_repos: Vec<RepoSlug>,
    /// Tag drafted by `release`; the latest release when unset.
    #[builder(default)]
    pub release_tag: Option<String>,
    /// Month aggregated by `monthly`.
    pub target_month: TargetMonth,
    /// Repository that receives branches and pull requests.
    #[builder(default)]
    pub target_repo: Option<RepoSlug>,
    pub github_token: SecretString,
    #[builder(default)]
    pub gemini_api_key: Option<SecretString>,
    #[builder(default)]
    pub settings: FileConfig,
    /// Working copy of the target repository.
    #[builder(default = "PathBuf::from(\".\")")]
    pub repo_path: PathBuf,
    #[builder(default)]
    pub dry_run: bool,
}

impl ConfigBuilder {
    pub fn build(&self) -> Result<Config> {
        let config = self._build().map_err(|e| {
            NotesaurusError::invalid_config(format!(
                "Failed to build configuration: {e}"
            ))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        if self.source_repos.is_empty() {
            return Err(NotesaurusError::missing_config(
                "at least one source repository (SOURCE_REPOS)",
            ));
        }

        if self.release_tag.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(NotesaurusError::invalid_config(
                "release tag cannot be blank",
            ));
        }

        let settings = &self.settings;

        for (name, value) in [
            ("drafts_dir", &settings.drafts_dir),
            ("base_branch", &settings.base_branch),
            ("branch_prefix", &settings.branch_prefix),
            ("remote", &settings.remote),
            ("default_product", &settings.default_product),
        ] {
            if value.trim().is_empty() {
                return Err(NotesaurusError::invalid_config(format!(
                    "{name} cannot be empty"
                )));
            }
        }

        if settings.timeout_secs == 0 {
            return Err(NotesaurusError::invalid_config(
                "timeout_secs must be greater than zero",
            ));
        }

        for (name, value) in
            [("web_base", &settings.web_base), ("api_base", &settings.api_base)]
        {
            url::Url::parse(value).map_err(|e| {
                NotesaurusError::invalid_config(format!(
                    "{name} \"{value}\" is not a valid url: {e}"
                ))
            })?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            token: self.github_token.clone(),
            timeout: self.timeout(),
            ..RemoteConfig::default()
        }
    }

    pub fn product_map(&self) -> ProductMap {
        ProductMap::new(
            self.settings.products.clone(),
            self.settings.default_product.clone(),
        )
    }

    pub fn write_policy(&self) -> WritePolicy {
        if self.settings.skip_existing {
            WritePolicy::SkipExisting
        } else {
            WritePolicy::Overwrite
        }
    }
}
