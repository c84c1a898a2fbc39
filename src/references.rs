//! Pull-request references found in release bodies.
use regex::{Captures, Regex};
use serde::Serialize;
use std::{collections::HashSet, sync::LazyLock};

use crate::forge::types::RepoSlug;

static PR_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(?<number>\d+)").unwrap());

/// A `#123` style reference resolved to a pull-request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrReference {
    /// Digits as written, without the `#`.
    pub number: String,
    /// The reference as it appears in the body, e.g. `#123`.
    pub text: String,
    pub url: String,
    /// Markdown link, e.g. `[#42](https://github.com/acme/app/pull/42)`.
    pub link: String,
}

impl PrReference {
    pub fn new(web_base: &str, repo: &RepoSlug, number: &str) -> Self {
        let url = pull_url(web_base, repo, number);
        let text = format!("#{number}");
        let link = format!("[{text}]({url})");
        Self {
            number: number.to_string(),
            text,
            url,
            link,
        }
    }
}

/// `{web_base}/{owner}/{repo}/pull/{number}`
pub fn pull_url(web_base: &str, repo: &RepoSlug, number: &str) -> String {
    format!(
        "{}/{}/{}/pull/{number}",
        web_base.trim_end_matches('/'),
        repo.owner,
        repo.name
    )
}

/// Distinct references in order of first appearance.
pub fn extract(
    body: &str,
    repo: &RepoSlug,
    web_base: &str,
) -> Vec<PrReference> {
    let mut seen = HashSet::new();

    PR_NUMBER_REGEX
        .captures_iter(body)
        .filter_map(|caps| caps.name("number").map(|m| m.as_str()))
        .filter(|number| seen.insert(*number))
        .map(|number| PrReference::new(web_base, repo, number))
        .collect()
}

/// Replaces bare `#N` occurrences with markdown links for known references.
///
/// Occurrences already written as `[#N]` are left alone, as are numbers that
/// were not extracted from the source body.
pub fn relink(text: &str, refs: &[PrReference]) -> String {
    if refs.is_empty() {
        return text.to_string();
    }

    PR_NUMBER_REGEX
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let start = caps.get(0).map(|m| m.start()).unwrap_or_default();

            if text[..start].ends_with('[') {
                return whole.to_string();
            }

            refs.iter()
                .find(|r| r.number == caps["number"])
                .map(|r| r.link.clone())
                .unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

/// Comma separated links, or `None` when there are no references.
pub fn format_links(refs: &[PrReference]) -> String {
    if refs.is_empty() {
        return "None".into();
    }

    refs.iter()
        .map(|r| r.link.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: &str = "https://github.com";

    fn repo() -> RepoSlug {
        RepoSlug::new("acme", "app")
    }

    #[test]
    fn extracts_distinct_numbers_in_order() {
        let refs = extract("Fixes #12 and #7, see also #12", &repo(), WEB);

        let numbers =
            refs.iter().map(|r| r.number.as_str()).collect::<Vec<_>>();
        assert_eq!(numbers, vec!["12", "7"]);
        assert_eq!(refs[0].text, "#12");
        assert_eq!(refs[0].url, "https://github.com/acme/app/pull/12");
        assert_eq!(refs[0].link, "[#12](https://github.com/acme/app/pull/12)");
    }

    #[test]
    fn counts_already_linked_references() {
        let body = "Merged [#9](https://github.com/acme/app/pull/9)";
        let refs = extract(body, &repo(), WEB);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].number, "9");

        let refs = extract("Fixed #123 ([#123])", &repo(), WEB);
        assert_eq!(refs.len(), 1);
        assert_eq!(relink("[#123]", &refs), "[#123]");
    }

    #[test]
    fn keeps_digits_exactly_as_written() {
        let body = "Refs #99999999999999999999, #042 and #42";
        let refs = extract(body, &repo(), WEB);

        let texts = refs.iter().map(|r| r.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["#99999999999999999999", "#042", "#42"]);
        assert_eq!(
            refs[0].url,
            "https://github.com/acme/app/pull/99999999999999999999"
        );
        assert_eq!(
            relink("see #042", &refs),
            "see [#042](https://github.com/acme/app/pull/042)"
        );
    }

    #[test]
    fn ignores_hash_without_digits() {
        assert!(extract("## Features\n- #abc", &repo(), WEB).is_empty());
    }

    #[test]
    fn trims_trailing_slash_from_web_base() {
        assert_eq!(
            pull_url("https://ghe.example.com/", &repo(), "3"),
            "https://ghe.example.com/acme/app/pull/3"
        );
    }

    #[test]
    fn relinks_only_known_bare_references() {
        let refs = extract("#42 #43", &repo(), WEB);
        let text = "Fixed crash (#42). Already [#43](x). Unrelated #99.";

        let result = relink(text, &refs);

        assert_eq!(
            result,
            "Fixed crash ([#42](https://github.com/acme/app/pull/42)). \
             Already [#43](x). Unrelated #99."
        );
    }

    #[test]
    fn relink_without_references_is_identity() {
        assert_eq!(relink("nothing #5 here", &[]), "nothing #5 here");
    }

    #[test]
    fn formats_links_or_none() {
        assert_eq!(format_links(&[]), "None");

        let refs = extract("#1 #2", &repo(), WEB);
        assert_eq!(
            format_links(&refs),
            "[#1](https://github.com/acme/app/pull/1), \
             [#2](https://github.com/acme/app/pull/2)"
        );
    }
}
