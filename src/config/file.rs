//! Optional `notesaurus.toml` settings file.
use log::*;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

use crate::{
    Result,
    bucket::DEFAULT_PRODUCT,
    forge::config::{
        DEFAULT_BRANCH_PREFIX, DEFAULT_TIMEOUT_SECS, DEFAULT_WEB_BASE,
    },
    generator::gemini::{DEFAULT_GEMINI_API_BASE, DEFAULT_MODELS},
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "notesaurus.toml";
/// Default drafts directory relative to the working copy.
pub const DEFAULT_DRAFTS_DIR: &str = "drafts";
/// Default style guide injected into every prompt when present.
pub const DEFAULT_STYLE_GUIDE: &str = "STYLE_GUIDE.md";

/// Tera template overrides. Unset entries use the built-in templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Prompt for a single release.
    pub release: Option<String>,
    /// Prompt for a monthly update grouped by product.
    pub monthly_by_product: Option<String>,
    /// Prompt for a monthly update without product sections.
    pub monthly_flat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct FileConfig {
    /// Directory drafts are written to, relative to the working copy.
    pub drafts_dir: String,
    /// Integration branch pull requests target (default: main).
    pub base_branch: String,
    /// Prefix of per-repository branches (default: release-notes).
    pub branch_prefix: String,
    /// Git remote used for fetch and push (default: origin).
    pub remote: String,
    /// Generation models tried in order.
    pub models: Vec<String>,
    /// Generation API base URL.
    pub api_base: String,
    /// Web base used to build pull request links.
    pub web_base: String,
    /// Style guide path relative to the working copy.
    pub style_guide: String,
    /// Rebase an existing branch onto its remote before writing.
    pub rebase: bool,
    /// Leave existing drafts untouched and skip generation for them.
    pub skip_existing: bool,
    /// Append newly drafted releases to an existing pull request body.
    pub update_pr_body: bool,
    /// Bound applied to every network call and git subprocess.
    pub timeout_secs: u64,
    /// Product label for repositories missing from `products`.
    pub default_product: String,
    /// `owner/repo` or `repo` to product label.
    pub products: BTreeMap<String, String>,
    pub templates: TemplateConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            drafts_dir: DEFAULT_DRAFTS_DIR.into(),
            base_branch: "main".into(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.into(),
            remote: "origin".into(),
            models: DEFAULT_MODELS.map(String::from).to_vec(),
            api_base: DEFAULT_GEMINI_API_BASE.into(),
            web_base: DEFAULT_WEB_BASE.into(),
            style_guide: DEFAULT_STYLE_GUIDE.into(),
            rebase: true,
            skip_existing: false,
            update_pr_body: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_product: DEFAULT_PRODUCT.into(),
            products: BTreeMap::new(),
            templates: TemplateConfig::default(),
        }
    }
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads settings from `path`, using defaults when the file is absent.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            info!(
                "no configuration file found at {}: using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        debug!("loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.drafts_dir, "drafts");
        assert_eq!(config.base_branch, "main");
        assert_eq!(config.branch_prefix, "release-notes");
        assert_eq!(config.models[0], "gemini-3-flash-preview");
        assert!(config.rebase);
        assert!(!config.skip_existing);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn parses_partial_file_over_defaults() {
        let config = FileConfig::parse(
            r#"
base_branch = "develop"
skip_existing = true
models = ["gemini-2.5-flash"]
default_product = "Other Apps"

[products]
"hotwax/bopis" = "BOPIS App"
fulfillment = "Fulfillment App"

[templates]
release = "Rewrite {{ release.body }}"
"#,
        )
        .unwrap();

        assert_eq!(config.base_branch, "develop");
        assert!(config.skip_existing);
        assert_eq!(config.models, vec!["gemini-2.5-flash"]);
        assert_eq!(config.remote, "origin");
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products["hotwax/bopis"], "BOPIS App");
        assert_eq!(
            config.templates.release.as_deref(),
            Some("Rewrite {{ release.body }}")
        );
        assert!(config.templates.monthly_flat.is_none());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(FileConfig::parse("base_branch = ").is_err());
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = FileConfig::load(&dir.path().join("notesaurus.toml"))
            .await
            .unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notesaurus.toml");
        tokio::fs::write(&path, "drafts_dir = \"notes\"\n").await.unwrap();

        let config = FileConfig::load(&path).await.unwrap();
        assert_eq!(config.drafts_dir, "notes");
    }
}
