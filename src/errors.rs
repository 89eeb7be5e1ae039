//! # Upstream Error Types
//!
//! Errors returned by the outbound HTTP services the bot composes: the chat
//! completion model and the web search used for descriptions.

use thiserror::Error;

/// Failure of a remote API call
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned no content")]
    EmptyResponse { service: &'static str },

    /// The task running the call panicked
    #[error("{task} task crashed: {message}")]
    Crashed { task: &'static str, message: String },
}

impl UpstreamError {
    pub fn http(service: &'static str, source: reqwest::Error) -> Self {
        Self::Http { service, source }
    }

    /// Whether the request timed out on the client side
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }
}
