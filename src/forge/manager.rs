//! Manager that wraps forge implementations
use log::*;
use std::time::Duration;

use crate::{
    Result,
    deadline::within,
    forge::{
        request::{
            CreatePrRequest, GetPrRequest, GetReleaseRequest,
            ListReleasesRequest, UpdatePrRequest,
        },
        traits::Forge,
        types::{PullRequest, Release},
    },
};

/// Bounds every call into the wrapped forge with the configured timeout.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    timeout: Duration,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, timeout: Duration) -> Self {
        Self { forge, timeout }
    }

    pub async fn get_release_by_tag(
        &self,
        req: GetReleaseRequest,
    ) -> Result<Option<Release>> {
        debug!("getting release {} for {}", req.tag, req.repo);
        within(
            "get release by tag",
            self.timeout,
            self.forge.get_release_by_tag(req),
        )
        .await
    }

    pub async fn list_releases(
        &self,
        req: ListReleasesRequest,
    ) -> Result<Vec<Release>> {
        debug!("listing releases for {} page {}", req.repo, req.page);
        within("list releases", self.timeout, self.forge.list_releases(req))
            .await
    }

    pub async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        debug!("searching for open pr with head {}", req.head);
        within("find open pr", self.timeout, self.forge.find_open_pr(req))
            .await
    }

    pub async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        within("create pr", self.timeout, self.forge.create_pr(req)).await
    }

    pub async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        within("update pr", self.timeout, self.forge.update_pr(req)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        NotesaurusError,
        forge::{traits::MockForge, types::RepoSlug},
    };

    #[tokio::test]
    async fn passes_requests_through_to_forge() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_find_open_pr()
            .withf(|req| req.head == "acme:release-notes/app")
            .times(1)
            .returning(|_| Ok(None));

        let manager =
            ForgeManager::new(Box::new(mock_forge), Duration::from_secs(5));

        let result = manager
            .find_open_pr(GetPrRequest {
                repo: RepoSlug::new("acme", "docs"),
                head: "acme:release-notes/app".into(),
                base_branch: "main".into(),
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn propagates_forge_errors() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_list_releases()
            .returning(|_| Err(NotesaurusError::forge("boom")));

        let manager =
            ForgeManager::new(Box::new(mock_forge), Duration::from_secs(5));

        let result = manager
            .list_releases(ListReleasesRequest {
                repo: RepoSlug::new("acme", "app"),
                page: 1,
                per_page: 100,
            })
            .await;

        assert!(matches!(result, Err(NotesaurusError::ForgeError(_))));
    }
}
