//! Errors raised while talking to the upstream statistics API.
//!
//! These never leave the data access layer: [`crate::data_access`] logs them
//! and degrades to empty or unavailable values.

use thiserror::Error;

/// Failure of a single upstream fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body did not have the structure we expected.
    #[error("unexpected response shape from {url}: {reason}")]
    Shape { url: String, reason: String },
}

impl FetchError {
    /// Build a shape error from anything displayable.
    pub fn shape(url: &str, reason: impl std::fmt::Display) -> Self {
        FetchError::Shape {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Client(_) => "client",
            FetchError::Transport { .. } => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Shape { .. } => "shape",
        }
    }
}
