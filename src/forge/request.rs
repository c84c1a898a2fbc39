use crate::forge::types::RepoSlug;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to fetch a single release by tag.
pub struct GetReleaseRequest {
    pub repo: RepoSlug,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of a repository's releases, newest first.
pub struct ListReleasesRequest {
    pub repo: RepoSlug,
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to find an open pull request by head and base.
pub struct GetPrRequest {
    pub repo: RepoSlug,
    /// Head reference in `owner:branch` form.
    pub head: String,
    pub base_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub repo: RepoSlug,
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to replace the body of an existing pull request.
pub struct UpdatePrRequest {
    pub repo: RepoSlug,
    pub pr_number: u64,
    pub body: String,
}
