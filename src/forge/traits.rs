//! Traits related to remote hosting platforms
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::{
        request::{
            CreatePrRequest, GetPrRequest, GetReleaseRequest,
            ListReleasesRequest, UpdatePrRequest,
        },
        types::{PullRequest, Release},
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge {
    /// Returns `None` when the tag has no release.
    async fn get_release_by_tag(
        &self,
        req: GetReleaseRequest,
    ) -> Result<Option<Release>>;
    async fn list_releases(
        &self,
        req: ListReleasesRequest,
    ) -> Result<Vec<Release>>;
    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()>;
}
