//! Release retrieval over the hosting API.
use log::*;

use crate::{
    NotesaurusError, Result,
    forge::{
        config::{MAX_RELEASE_PAGES, RELEASES_PAGE_SIZE},
        manager::ForgeManager,
        request::{GetReleaseRequest, ListReleasesRequest},
        types::{Release, RepoSlug},
    },
    month::TargetMonth,
};

/// Release for `tag`, or the newest published release when `tag` is `None`.
pub async fn fetch_release(
    forge: &ForgeManager,
    repo: &RepoSlug,
    tag: Option<&str>,
) -> Result<Release> {
    let release = match tag {
        Some(tag) => {
            forge
                .get_release_by_tag(GetReleaseRequest {
                    repo: repo.clone(),
                    tag: tag.to_string(),
                })
                .await?
        }
        None => forge
            .list_releases(ListReleasesRequest {
                repo: repo.clone(),
                page: 1,
                per_page: RELEASES_PAGE_SIZE,
            })
            .await?
            .into_iter()
            .filter(|r| !r.draft)
            .max_by_key(|r| r.published_at),
    };

    release.ok_or_else(|| {
        NotesaurusError::not_found(repo.full_name(), tag.map(String::from))
    })
}

/// Every non-draft release of `repo` published within `month`.
pub async fn fetch_releases_in_month(
    forge: &ForgeManager,
    repo: &RepoSlug,
    month: TargetMonth,
) -> Result<Vec<Release>> {
    let start = month.start();
    let mut matched = vec![];

    for page in 1..=MAX_RELEASE_PAGES {
        let releases = forge
            .list_releases(ListReleasesRequest {
                repo: repo.clone(),
                page,
                per_page: RELEASES_PAGE_SIZE,
            })
            .await?;

        let count = releases.len();
        let all_older = releases.iter().all(|r| r.published_at < start);

        matched.extend(
            releases
                .into_iter()
                .filter(|r| !r.draft && month.contains(&r.published_at)),
        );

        if count < RELEASES_PAGE_SIZE as usize || all_older {
            break;
        }

        if page == MAX_RELEASE_PAGES {
            warn!("stopped listing {repo} releases after {page} pages");
        }
    }

    debug!("found {} releases for {repo} in {month}", matched.len());

    Ok(matched)
}
