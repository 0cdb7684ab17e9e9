//! API client errors.

use thiserror::Error;

use crate::{foods::RatingError, prices::PriceError, session::StorageError};

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the credentials (401). The session has been cleared.
    #[error("authentication required: {0}")]
    Authentication(String),

    /// The user is signed in but not allowed to do this (403).
    #[error("not allowed: {0}")]
    Authorization(String),

    /// No response was received.
    #[error("network unavailable, please check your connection and try again")]
    Network(#[source] reqwest::Error),

    /// The requested resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other unsuccessful response.
    #[error("request failed with status {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message reported by the backend
        message: String,
    },

    /// The request could not be built.
    #[error("invalid request")]
    Client(#[source] reqwest::Error),

    /// The base URL or a request path is malformed.
    #[error("invalid url")]
    Url(#[from] url::ParseError),

    /// The response body could not be decoded.
    #[error("unexpected response body")]
    Decode(#[source] serde_json::Error),

    /// The backend sent a price the client cannot represent.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// The backend sent an out-of-range rating.
    #[error(transparent)]
    Rating(#[from] RatingError),

    /// The session could not be persisted.
    #[error("failed to persist session")]
    Session(#[from] StorageError),
}

impl ApiError {
    /// Whether the caller should treat this as a connectivity problem.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}
