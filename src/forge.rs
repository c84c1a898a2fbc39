//! Hosting platform access for releases and pull requests.
//!
//! Only GitHub is supported; the [`traits::Forge`] seam exists so the
//! pipeline can be exercised against mocks.

/// Connection settings and platform constants.
pub mod config;

/// GitHub API client implementation backed by Octocrab.
pub mod github;

/// Timeout-bounded wrapper used by the rest of the crate.
pub mod manager;

/// Request types passed to forge implementations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;

/// Normalized release, pull request and repository types.
pub mod types;
