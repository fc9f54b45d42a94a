//! Application-level error taxonomy
//!
//! Input errors abort the request early with a 4xx; soft external errors are
//! absorbed by the fallback chain or per-file skips and never reach here.

use thiserror::Error;

/// Errors raised while obtaining source files for analysis.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The URL does not match `github.com/{owner}/{repo}`. Raised before any
    /// network call is made.
    #[error("Invalid GitHub URL format")]
    InvalidRepositoryReference,

    /// The repository listing produced no eligible files. A user-facing
    /// condition, not a crash.
    #[error("No supported files found or repository access denied")]
    NoFilesFound,

    /// The repository listing itself could not be retrieved.
    #[error("GitHub API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Api(err.to_string())
    }
}
