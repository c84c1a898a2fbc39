use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

use crate::{NotesaurusError, Result};

/// Repository identified by owner and name, e.g. `acme/app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/name`, rejecting empty parts and nested paths.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let mut parts = trimmed.split('/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None)
                if is_valid_part(owner) && is_valid_part(name) =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(NotesaurusError::invalid_config(format!(
                "expected repository in the form owner/name, got: \"{value}\""
            ))),
        }
    }

    /// Parses a comma-separated list, ignoring blank entries.
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = NotesaurusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A published release normalized from the hosting API.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub repo: RepoSlug,
    pub tag: String,
    pub name: Option<String>,
    /// Publish time, or creation time when the release was never published.
    pub published_at: DateTime<Utc>,
    /// Changelog body; empty when the release has none.
    pub body: String,
    pub html_url: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl Release {
    /// Whether the body contains anything worth rewriting.
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Open pull request information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub body: String,
    pub html_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let slug = RepoSlug::parse(" acme/app ").unwrap();
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "app");
        assert_eq!(slug.to_string(), "acme/app");
    }

    #[test]
    fn rejects_malformed_slugs() {
        for bad in ["", "acme", "acme/", "/app", "acme/app/extra", "ac me/app"]
        {
            assert!(RepoSlug::parse(bad).is_err(), "accepted: {bad:?}");
        }
    }

    #[test]
    fn parses_comma_separated_list_skipping_blanks() {
        let slugs =
            RepoSlug::parse_list("acme/app, acme/api,, hotwax/bopis ,")
                .unwrap();
        assert_eq!(
            slugs,
            vec![
                RepoSlug::new("acme", "app"),
                RepoSlug::new("acme", "api"),
                RepoSlug::new("hotwax", "bopis"),
            ]
        );
    }

    #[test]
    fn list_fails_on_any_bad_entry() {
        assert!(RepoSlug::parse_list("acme/app,broken").is_err());
    }
}
