//! Configuration for hosting platform connections.
use secrecy::SecretString;
use std::time::Duration;

/// Default REST API base for github.com.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Default web base used to build canonical release and pull request links.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";
/// Default branch name prefix for release-note branches.
pub const DEFAULT_BRANCH_PREFIX: &str = "release-notes";
/// Page size used when listing releases.
pub const RELEASES_PAGE_SIZE: u8 = 100;
/// Upper bound on release pages walked while collecting a month.
pub const MAX_RELEASE_PAGES: u32 = 20;
/// Default timeout applied to every network call and git subprocess.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Remote hosting connection configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// REST API base URL (e.g. "https://api.github.com").
    pub api_base: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Bound applied to each API call.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: SecretString::from("".to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
