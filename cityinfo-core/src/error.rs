use thiserror::Error;

use crate::provider::Upstream;

/// Rejection reasons for user-submitted recipe content.
///
/// The display strings are part of the HTTP contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Content is required")]
    ContentRequired,
    #[error("Content too short (min 10 chars)")]
    ContentTooShort,
    #[error("Content too long (max 2000 chars)")]
    ContentTooLong,
}

#[derive(Debug, Error)]
pub enum CityError {
    /// The insights upstream did not recognise the city identifier.
    #[error("City not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request to {0} upstream failed: {1}")]
    Upstream(Upstream, #[source] reqwest::Error),

    #[error("{upstream} upstream returned status {status}: {body}")]
    UpstreamStatus {
        upstream: Upstream,
        status: u16,
        body: String,
    },

    #[error("Malformed {0} upstream data: {1}")]
    MalformedUpstreamData(Upstream, String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CityError::NotFound)
    }
}
