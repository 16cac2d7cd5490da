//! Networking utilities for the embedding layer
//!
//! This crate provides the one-shot HTTP client used to reach oEmbed
//! providers through the same-origin proxy, and the server side of that
//! proxy.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod proxy;

pub use client::{spawn_get, HttpClient, HttpClientConfig, HttpResponse, ReqwestHttpClient};
pub use proxy::{AjaxProxy, ProxyConfig, ProxyError, ProxyRequest, ProxyResponse};

#[cfg(any(test, feature = "mock"))]
pub use client::MockHttpClient;

/// Result type for networking operations
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Error types for networking operations
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The request never reached a terminal HTTP status
    #[error("Request failed: {0}")]
    Request(String),

    /// The request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Request(err.to_string())
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        NetworkError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = NetworkError::InvalidUrl("relative URL without a base".to_string());
        assert!(err.to_string().contains("Invalid URL"));

        let err: NetworkError = url::Url::parse("").unwrap_err().into();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }
}
