//! One-shot HTTP client
//!
//! Every call to [`HttpClient::get`] fires exactly one request and resolves
//! exactly once, when the request reaches a terminal state. Non-2xx
//! statuses are not errors at this layer: the caller inspects
//! [`HttpResponse::status`]. There is no retry, no de-duplication and no
//! cancellation; dropping the future is the only way to stop waiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tokio::task::JoinHandle;
use url::Url;

use crate::{NetworkError, Result};

/// Header marking requests as coming from page scripts
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Value sent with [`REQUESTED_WITH_HEADER`]
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

// =============================================================================
// Response
// =============================================================================

/// Terminal state of a request: final status and raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
}

impl HttpResponse {
    /// Create a response without a content type
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Check if the response is successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Client trait
// =============================================================================

/// Issues single asynchronous GET requests
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fire one GET request and wait for its terminal state
    ///
    /// Returns `Err` only when no HTTP status was obtained at all.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Start a request on the runtime and return immediately
///
/// The returned handle completes once, with the same value
/// [`HttpClient::get`] would have produced. Two spawned requests for the
/// same URL run independently and complete in network order.
pub fn spawn_get<C>(client: Arc<C>, url: impl Into<String>) -> JoinHandle<Result<HttpResponse>>
where
    C: HttpClient + ?Sized + 'static,
{
    let url = url.into();
    tokio::spawn(async move { client.get(&url).await })
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for [`ReqwestHttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative request paths are joined onto
    pub base_url: Option<String>,
    /// User agent string
    pub user_agent: String,
    /// Request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: format!("ideascube-embed/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            default_headers: HashMap::new(),
        }
    }
}

impl HttpClientConfig {
    /// Create a config whose relative paths resolve against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Reqwest implementation
// =============================================================================

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: ReqwestClient,
    base_url: Option<Url>,
    config: HttpClientConfig,
}

impl ReqwestHttpClient {
    /// Create a new client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config.base_url.as_deref().map(Url::parse).transpose()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Resolve `url` against the configured base when it is relative
    pub fn absolute_url(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => Ok(base.join(url)?),
                None => Err(NetworkError::InvalidUrl(format!(
                    "relative URL without a base: {}",
                    url
                ))),
            },
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let url = self.absolute_url(url)?;
        tracing::debug!("GET {}", url);

        let mut req = self
            .client
            .get(url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE);
        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        let response = req.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            NetworkError::from(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        tracing::debug!("GET {} completed with status {}", url, status);
        Ok(HttpResponse {
            status,
            body,
            content_type,
        })
    }
}
