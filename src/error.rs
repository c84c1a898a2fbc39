//! Error types for notesaurus.

use std::time::Duration;

use thiserror::Error;

use crate::generator::GenerationError;

/// Main error type for notesaurus operations.
#[derive(Error, Debug)]
pub enum NotesaurusError {
    // Configuration errors
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Hosting API errors
    #[error("No release found for {repo}{}", tag_suffix(.tag))]
    NotFound { repo: String, tag: Option<String> },

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("API authentication failed: {0}")]
    AuthenticationError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Generation backend errors
    #[error(transparent)]
    Generation(#[from] GenerationError),

    // Git subprocess errors
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    // Parsing / rendering errors - automatic conversions via #[from]
    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Datetime parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

fn tag_suffix(tag: &Option<String>) -> String {
    tag.as_ref()
        .map(|t| format!(" with tag {t}"))
        .unwrap_or_default()
}

/// Result type alias using NotesaurusError
pub type Result<T> = std::result::Result<T, NotesaurusError>;

impl NotesaurusError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a missing config error
    pub fn missing_config(msg: impl Into<String>) -> Self {
        Self::MissingConfig(msg.into())
    }

    /// Create a not-found error for a repository and optional tag
    pub fn not_found(repo: impl Into<String>, tag: Option<String>) -> Self {
        Self::NotFound {
            repo: repo.into(),
            tag,
        }
    }

    /// Create a git error from a failed command
    pub fn git(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Git {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a timeout error for the named operation
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Whether this error can only be fixed by changing configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingConfig(_) | Self::InvalidConfig(_))
    }
}

// Implement From for std::io::Error - wraps in Other variant
impl From<std::io::Error> for NotesaurusError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for reqwest errors (generation backend)
impl From<reqwest::Error> for NotesaurusError {
    fn from(err: reqwest::Error) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(401) | Some(403) => Self::AuthenticationError(err.to_string()),
            Some(429) => Self::RateLimitExceeded,
            _ => Self::NetworkError(err.to_string()),
        }
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for NotesaurusError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code.as_u16() == 401 =>
            {
                Self::AuthenticationError(source.message.clone())
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = NotesaurusError::forge("API call failed");
        assert_eq!(err.to_string(), "Forge operation failed: API call failed");

        let err = NotesaurusError::invalid_config("bad month");
        assert_eq!(err.to_string(), "Invalid configuration: bad month");

        let err = NotesaurusError::not_found("acme/app", None);
        assert_eq!(err.to_string(), "No release found for acme/app");

        let err = NotesaurusError::not_found("acme/app", Some("v1.0.0".into()));
        assert_eq!(
            err.to_string(),
            "No release found for acme/app with tag v1.0.0"
        );

        let err = NotesaurusError::git("push origin main", "rejected");
        assert_eq!(err.to_string(), "git push origin main failed: rejected");

        let err =
            NotesaurusError::timeout("git fetch", Duration::from_secs(30));
        assert_eq!(err.to_string(), "git fetch timed out after 30s");
    }

    #[test]
    fn test_error_helpers() {
        assert!(NotesaurusError::missing_config("SOURCE_REPOS").is_config());
        assert!(NotesaurusError::invalid_config("x").is_config());
        assert!(!NotesaurusError::forge("x").is_config());
        assert!(matches!(
            NotesaurusError::not_found("a/b", None),
            NotesaurusError::NotFound { .. }
        ));
    }

    #[test]
    fn test_from_conversions() {
        let parse_err = toml::from_str::<toml::Value>("= nope");
        assert!(parse_err.is_err());
        let err: NotesaurusError = parse_err.unwrap_err().into();
        assert!(matches!(err, NotesaurusError::TomlParseError(_)));

        let io_err = std::io::Error::other("disk full");
        let err: NotesaurusError = io_err.into();
        assert!(matches!(err, NotesaurusError::Other(_)));
    }
}
