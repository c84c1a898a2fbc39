//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, models::repos::Release as GithubRelease, params};
use reqwest::StatusCode;

use crate::{
    NotesaurusError, Result,
    forge::{
        config::RemoteConfig,
        request::{
            CreatePrRequest, GetPrRequest, GetReleaseRequest,
            ListReleasesRequest, UpdatePrRequest,
        },
        traits::Forge,
        types::{PullRequest, Release, RepoSlug},
    },
};

/// GitHub forge implementation using Octocrab for release lookups and pull
/// request management.
pub struct Github {
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(config.api_base.clone())?;
        let instance = builder.build()?;

        Ok(Self { instance })
    }
}

/// Drops releases that carry no timestamp at all; GitHub only omits both
/// timestamps on malformed drafts.
fn normalize_release(
    repo: &RepoSlug,
    release: GithubRelease,
) -> Option<Release> {
    let published_at = release.published_at.or(release.created_at)?;

    Some(Release {
        repo: repo.clone(),
        tag: release.tag_name,
        name: release.name,
        published_at,
        body: release.body.unwrap_or_default(),
        html_url: release.html_url.to_string(),
        draft: release.draft,
        prerelease: release.prerelease,
    })
}

#[async_trait]
impl Forge for Github {
    async fn get_release_by_tag(
        &self,
        req: GetReleaseRequest,
    ) -> Result<Option<Release>> {
        let result = self
            .instance
            .repos(&req.repo.owner, &req.repo.name)
            .releases()
            .get_by_tag(&req.tag)
            .await;

        match result {
            Ok(release) => Ok(normalize_release(&req.repo, release)),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                info!("no release found for {} tag {}", req.repo, req.tag);
                Ok(None)
            }
            Err(err) => {
                error!(
                    "error getting release {} for {}: {err}",
                    req.tag, req.repo
                );
                Err(err.into())
            }
        }
    }

    async fn list_releases(
        &self,
        req: ListReleasesRequest,
    ) -> Result<Vec<Release>> {
        let result = self
            .instance
            .repos(&req.repo.owner, &req.repo.name)
            .releases()
            .list()
            .per_page(req.per_page)
            .page(req.page)
            .send()
            .await;

        match result {
            Ok(page) => Ok(page
                .items
                .into_iter()
                .filter_map(|r| normalize_release(&req.repo, r))
                .collect()),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                Err(NotesaurusError::forge(format!(
                    "repository {} not found or not accessible",
                    req.repo
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        let prs = self
            .instance
            .pulls(&req.repo.owner, &req.repo.name)
            .list()
            .state(params::State::Open)
            .head(req.head)
            .base(req.base_branch)
            .send()
            .await?;

        Ok(prs.into_iter().next().map(|pr| PullRequest {
            number: pr.number,
            body: pr.body.unwrap_or_default(),
            html_url: pr.html_url.map(|u| u.to_string()),
        }))
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&req.repo.owner, &req.repo.name)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await?;

        Ok(PullRequest {
            number: pr.number,
            body: pr.body.unwrap_or_default(),
            html_url: pr.html_url.map(|u| u.to_string()),
        })
    }

    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        self.instance
            .pulls(&req.repo.owner, &req.repo.name)
            .update(req.pr_number)
            .body(req.body)
            .send()
            .await?;

        Ok(())
    }
}
