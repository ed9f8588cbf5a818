//! Custom error types for the common library
//!
//! This module defines the errors raised while talking to the upstream
//! broadcast API. Services map them onto their own response errors.

use thiserror::Error;

/// Custom error type for upstream API operations
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request could not be sent or the connection failed
    #[error("Upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The upstream answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The upstream payload could not be decoded
    #[error("Upstream payload could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    /// The upstream reported an application level error
    #[error("Upstream API error: {message}")]
    Api { message: String },

    /// A configured upstream URL is unusable
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    /// Classify a reqwest error as a decode or a transport failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err)
        } else {
            UpstreamError::Request(err)
        }
    }
}

/// Type alias for Result with UpstreamError
pub type UpstreamResult<T> = Result<T, UpstreamError>;
