//! Prompt and fallback rendering for each drafting strategy.
use chrono::SecondsFormat;
use log::*;
use serde::Serialize;
use std::path::Path;
use strum::{Display, EnumString};
use tera::{Context, Tera};

use crate::{
    Result,
    bucket::MonthBucket,
    config::file::TemplateConfig,
    forge::types::Release,
    references::{self, PrReference},
};

const RELEASE_TEMPLATE: &str = "release";
const MONTHLY_TEMPLATE: &str = "monthly";
const PAYLOAD_TEMPLATE: &str = "payload";

/// Default prompt for a single release.
pub const DEFAULT_RELEASE_PROMPT: &str = r#"You are a product manager writing customer-facing release notes.

Rewrite the release below using only this structure:

# {{ release.title }} - Release {{ release.tag }}

## What changed
- User-facing changes only
- Reference pull requests inline, for example {{ release.pr_links }}

## User impact
## Operational impact
## Business impact

Rules:
- Do not include raw GitHub sections
- Do not list contributors
- Do not invent features
- Keep the language confident and non-technical
{% if style_guide %}
Follow this style guide:
{{ style_guide }}
{% endif %}
Raw release:
{{ release.body }}
"#;

/// Default prompt for a monthly update grouped by product.
pub const DEFAULT_MONTHLY_BY_PRODUCT_PROMPT: &str = r#"You are a product manager writing the monthly product update for {{ month }}.

Combine the releases below into one document titled "Product Update - {{ month }}".
Give every product its own section, in the order the products appear below.
Within a product, group changes under "New Features", "Improvements" and "Fixes",
and follow each change with a one line user benefit.

Rules:
- Reference pull requests inline using the links provided
- Do not list contributors
- Do not invent features
{% if style_guide %}
Follow this style guide:
{{ style_guide }}
{% endif %}
Releases:
{{ payload }}
"#;

/// Default prompt for a monthly update without product sections.
pub const DEFAULT_MONTHLY_FLAT_PROMPT: &str = r#"You are a product manager writing the monthly product update for {{ month }}.

Combine the releases below into one document titled "Product Update - {{ month }}".
Open with a short summary paragraph, then group every change across all
repositories under "New Features" and "Improvements". Follow each change with a
one line user benefit.

Rules:
- Reference pull requests inline using the links provided
- Do not list contributors
- Do not invent features
{% if style_guide %}
Follow this style guide:
{{ style_guide }}
{% endif %}
Releases:
{{ payload }}
"#;

const PAYLOAD: &str = r#"{% for group in groups %}{% if group.product %}
## Product: {{ group.product }}
{% endif %}{% for release in group.releases %}
Repository: {{ release.repo }}
Version: {{ release.tag }}
Published: {{ release.published_at }}
PR References: {{ release.pr_links }}

Release Notes:
{{ release.body }}

---
{% endfor %}{% endfor %}"#;

/// How drafts are keyed and what a prompt contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RenderStrategy {
    /// One draft per repository release.
    PerRelease,
    /// One draft per month with a section per product.
    MonthlyByProduct,
    /// One draft per month without product sections.
    MonthlyFlat,
}

impl RenderStrategy {
    pub fn is_monthly(&self) -> bool {
        !matches!(self, Self::PerRelease)
    }
}

#[derive(Debug, Serialize)]
struct ReleaseView<'a> {
    repo: String,
    title: String,
    tag: &'a str,
    name: Option<&'a str>,
    published_at: String,
    url: &'a str,
    body: &'a str,
    pr_links: String,
    refs: Vec<PrReference>,
}

#[derive(Debug, Serialize)]
struct GroupView<'a> {
    product: Option<&'a str>,
    releases: Vec<ReleaseView<'a>>,
}

/// Renders prompts and fallback text for one strategy.
#[derive(Debug)]
pub struct Renderer {
    strategy: RenderStrategy,
    tera: Tera,
    style_guide: Option<String>,
    web_base: String,
}

impl Renderer {
    /// Compiles the templates for `strategy` once, applying overrides.
    pub fn new(
        strategy: RenderStrategy,
        templates: &TemplateConfig,
        style_guide: Option<String>,
        web_base: impl Into<String>,
    ) -> Result<Self> {
        let mut tera = Tera::default();

        match strategy {
            RenderStrategy::PerRelease => {
                let prompt = templates
                    .release
                    .as_deref()
                    .unwrap_or(DEFAULT_RELEASE_PROMPT);
                tera.add_raw_template(RELEASE_TEMPLATE, prompt)?;
            }
            RenderStrategy::MonthlyByProduct => {
                let prompt = templates
                    .monthly_by_product
                    .as_deref()
                    .unwrap_or(DEFAULT_MONTHLY_BY_PRODUCT_PROMPT);
                tera.add_raw_template(MONTHLY_TEMPLATE, prompt)?;
            }
            RenderStrategy::MonthlyFlat => {
                let prompt = templates
                    .monthly_flat
                    .as_deref()
                    .unwrap_or(DEFAULT_MONTHLY_FLAT_PROMPT);
                tera.add_raw_template(MONTHLY_TEMPLATE, prompt)?;
            }
        }

        tera.add_raw_template(PAYLOAD_TEMPLATE, PAYLOAD)?;

        Ok(Self {
            strategy,
            tera,
            style_guide: style_guide.filter(|s| !s.trim().is_empty()),
            web_base: web_base.into(),
        })
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    pub fn web_base(&self) -> &str {
        &self.web_base
    }

    pub fn release_prompt(
        &self,
        release: &Release,
        refs: &[PrReference],
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("release", &release_view(release, refs.to_vec()));
        context.insert("style_guide", &self.style_guide);

        let rendered = self.tera.render(RELEASE_TEMPLATE, &context)?;
        Ok(rendered.trim().to_string())
    }

    /// Text written when no backend produced output: the body unchanged.
    pub fn release_fallback(&self, release: &Release) -> String {
        release.body.clone()
    }

    /// Consolidated per-release data for a month.
    ///
    /// Doubles as the fallback draft when generation fails.
    pub fn monthly_payload(&self, bucket: &MonthBucket) -> Result<String> {
        let groups = match self.strategy {
            RenderStrategy::MonthlyFlat => vec![GroupView {
                product: None,
                releases: bucket
                    .releases_by_date()
                    .into_iter()
                    .map(|r| self.view_with_refs(r))
                    .collect(),
            }],
            _ => bucket
                .groups
                .iter()
                .map(|g| GroupView {
                    product: Some(g.product.as_str()),
                    releases: g
                        .releases
                        .iter()
                        .map(|r| self.view_with_refs(r))
                        .collect(),
                })
                .collect(),
        };

        let mut context = Context::new();
        context.insert("groups", &groups);

        let rendered = self.tera.render(PAYLOAD_TEMPLATE, &context)?;
        Ok(rendered.trim().to_string())
    }

    pub fn monthly_prompt(
        &self,
        bucket: &MonthBucket,
        payload: &str,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("month", &bucket.month.to_string());
        context.insert("payload", payload);
        context.insert("style_guide", &self.style_guide);

        let rendered = self.tera.render(MONTHLY_TEMPLATE, &context)?;
        Ok(rendered.trim().to_string())
    }

    fn view_with_refs<'a>(&self, release: &'a Release) -> ReleaseView<'a> {
        let refs =
            references::extract(&release.body, &release.repo, &self.web_base);
        release_view(release, refs)
    }
}

/// Reads the style guide once per run. A missing file is not an error.
pub async fn load_style_guide(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            info!("using style guide {}", path.display());
            Some(content)
        }
        Err(err) => {
            debug!("no style guide at {}: {err}", path.display());
            None
        }
    }
}

fn release_view(release: &Release, refs: Vec<PrReference>) -> ReleaseView<'_> {
    ReleaseView {
        repo: release.repo.full_name(),
        title: release.repo.name.replace('-', " "),
        tag: &release.tag,
        name: release.name.as_deref(),
        published_at: release
            .published_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        url: &release.html_url,
        body: release.body.trim(),
        pr_links: references::format_links(&refs),
        refs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bucket::{ProductMap, bucket_releases},
        forge::config::DEFAULT_WEB_BASE,
        month::TargetMonth,
        test_helpers::create_test_release,
    };
    use std::{collections::BTreeMap, str::FromStr};

    fn renderer(strategy: RenderStrategy) -> Renderer {
        Renderer::new(
            strategy,
            &TemplateConfig::default(),
            None,
            DEFAULT_WEB_BASE,
        )
        .unwrap()
    }

    fn january_bucket() -> MonthBucket {
        let products = ProductMap::new(
            BTreeMap::from([("bopis".to_string(), "BOPIS App".to_string())]),
            "Other Apps",
        );
        bucket_releases(
            TargetMonth::parse("2026-01").unwrap(),
            vec![
                create_test_release(
                    "hotwax/bopis",
                    "v1.8.0",
                    "2026-01-25T09:15:00Z",
                    "* Ship to Store support in #180",
                ),
                create_test_release(
                    "hotwax/inventory-count",
                    "v2.1.0",
                    "2026-01-20T14:30:00Z",
                    "* Primary identifiers in #395",
                ),
            ],
            &products,
        )
    }

    #[tokio::test]
    async fn style_guide_is_optional() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("STYLE_GUIDE.md");

        assert!(load_style_guide(&path).await.is_none());

        std::fs::write(&path, "Use sentence case.").unwrap();
        assert_eq!(
            load_style_guide(&path).await.as_deref(),
            Some("Use sentence case.")
        );
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!(
            RenderStrategy::from_str("monthly-by-product").unwrap(),
            RenderStrategy::MonthlyByProduct
        );
        assert_eq!(RenderStrategy::PerRelease.to_string(), "per-release");
        assert!(RenderStrategy::MonthlyFlat.is_monthly());
        assert!(!RenderStrategy::PerRelease.is_monthly());
    }

    #[test]
    fn release_prompt_includes_body_links_and_heading() {
        let renderer = renderer(RenderStrategy::PerRelease);
        let release = create_test_release(
            "acme/order-routing",
            "v1.2.0",
            "2026-01-15T10:00:00Z",
            "Fixed bug #42",
        );
        let refs =
            references::extract(&release.body, &release.repo, DEFAULT_WEB_BASE);

        let prompt = renderer.release_prompt(&release, &refs).unwrap();

        assert!(prompt.contains("# order routing - Release v1.2.0"));
        assert!(
            prompt.contains("[#42](https://github.com/acme/order-routing/pull/42)")
        );
        assert!(prompt.ends_with("Fixed bug #42"));
        assert!(!prompt.contains("style guide"));
    }

    #[test]
    fn release_prompt_injects_style_guide() {
        let renderer = Renderer::new(
            RenderStrategy::PerRelease,
            &TemplateConfig::default(),
            Some("Use sentence case.".into()),
            DEFAULT_WEB_BASE,
        )
        .unwrap();
        let release =
            create_test_release("acme/app", "v1", "2026-01-15T10:00:00Z", "x");

        let prompt = renderer.release_prompt(&release, &[]).unwrap();

        assert!(prompt.contains("Follow this style guide:\nUse sentence case."));
        assert!(prompt.contains("for example None"));
    }

    #[test]
    fn uses_template_override() {
        let templates = TemplateConfig {
            release: Some("{{ release.repo }}@{{ release.tag }}".into()),
            ..Default::default()
        };
        let renderer = Renderer::new(
            RenderStrategy::PerRelease,
            &templates,
            None,
            DEFAULT_WEB_BASE,
        )
        .unwrap();
        let release =
            create_test_release("acme/app", "v3", "2026-01-15T10:00:00Z", "x");

        assert_eq!(renderer.release_prompt(&release, &[]).unwrap(), "acme/app@v3");
    }

    #[test]
    fn rejects_invalid_template_override() {
        let templates = TemplateConfig {
            monthly_flat: Some("{% for %}".into()),
            ..Default::default()
        };

        let result = Renderer::new(
            RenderStrategy::MonthlyFlat,
            &templates,
            None,
            DEFAULT_WEB_BASE,
        );

        assert!(result.is_err());
    }

    #[test]
    fn release_fallback_is_body_unchanged() {
        let renderer = renderer(RenderStrategy::PerRelease);
        let release = create_test_release(
            "acme/app",
            "v1.2.0",
            "2026-01-15T10:00:00Z",
            "Fixed bug #42",
        );
        assert_eq!(renderer.release_fallback(&release), "Fixed bug #42");
    }

    #[test]
    fn by_product_payload_has_product_sections() {
        let renderer = renderer(RenderStrategy::MonthlyByProduct);
        let payload = renderer.monthly_payload(&january_bucket()).unwrap();

        let bopis = payload.find("## Product: BOPIS App").unwrap();
        let other = payload.find("## Product: Other Apps").unwrap();
        assert!(bopis < other);
        assert!(payload.contains("Repository: hotwax/bopis\nVersion: v1.8.0"));
        assert!(payload.contains("Published: 2026-01-25T09:15:00Z"));
        assert!(payload.contains(
            "PR References: [#180](https://github.com/hotwax/bopis/pull/180)"
        ));
    }

    #[test]
    fn flat_payload_is_chronological_without_sections() {
        let renderer = renderer(RenderStrategy::MonthlyFlat);
        let payload = renderer.monthly_payload(&january_bucket()).unwrap();

        assert!(!payload.contains("## Product:"));
        let inventory = payload.find("hotwax/inventory-count").unwrap();
        let bopis = payload.find("hotwax/bopis").unwrap();
        assert!(inventory < bopis);
    }

    #[test]
    fn monthly_prompt_embeds_payload() {
        let renderer = renderer(RenderStrategy::MonthlyByProduct);
        let bucket = january_bucket();
        let payload = renderer.monthly_payload(&bucket).unwrap();

        let prompt = renderer.monthly_prompt(&bucket, &payload).unwrap();

        assert!(prompt.contains("Product Update - 2026-01"));
        assert!(prompt.ends_with(&payload));
    }
}
