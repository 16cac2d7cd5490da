//! Same-origin proxy for third-party oEmbed lookups
//!
//! Browsers cannot always reach provider APIs directly, so page scripts
//! call `GET /ajax-proxy/?url=<provider request>` on their own origin and
//! this handler forwards the request server side. Requests are validated
//! before anything leaves the host: only script-initiated GETs coming from
//! pages of this server, aimed at a public host, are forwarded.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::client::{HttpClient, HttpClientConfig, ReqwestHttpClient, REQUESTED_WITH_VALUE};

/// User agent sent upstream by the proxy
pub const PROXY_USER_AGENT: &str = "ideascube +http://ideas-box.org";

/// Why a proxied request was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// Only GET is proxied
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Request was not issued by a page script
    #[error("Not an XMLHttpRequest")]
    NotAjax,

    /// No `url` parameter
    #[error("Missing url parameter")]
    MissingUrl,

    /// `url` is not an absolute http(s) URL with a host
    #[error("Invalid target URL: {0}")]
    InvalidUrl(String),

    /// No `Referer` header
    #[error("Missing referer")]
    MissingReferer,

    /// Referer host differs from the server name
    #[error("Foreign referer: {0}")]
    ForeignReferer(String),

    /// Target is the proxy host itself or a private network address
    #[error("Forbidden target host: {0}")]
    ForbiddenHost(String),

    /// Target host does not resolve
    #[error("Unresolvable host: {0}")]
    UnresolvableHost(String),
}

// =============================================================================
// Request / Response
// =============================================================================

/// Incoming request as seen by the proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// HTTP method
    pub method: String,
    /// Value of the `url` query parameter
    pub url: Option<String>,
    /// Request headers, keys compared case-insensitively
    pub headers: HashMap<String, String>,
    /// Name this server answers to
    pub server_name: String,
}

impl ProxyRequest {
    /// Create a GET request for `server_name`
    pub fn get(server_name: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: None,
            headers: HashMap::new(),
            server_name: server_name.into(),
        }
    }

    /// Set the `url` query parameter
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Mark the request as script-initiated from `referer`
    pub fn ajax_from(self, referer: impl Into<String>) -> Self {
        self.header("X-Requested-With", REQUESTED_WITH_VALUE)
            .header("Referer", referer)
    }

    fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by the proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// `Content-Type` to answer with
    pub content_type: Option<String>,
}

impl ProxyResponse {
    fn bad_request() -> Self {
        Self {
            status: 400,
            body: String::new(),
            content_type: None,
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: Some("text/plain".to_string()),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Debug deployments skip referer and target host checks
    pub debug: bool,
    /// User agent sent upstream
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            debug: false,
            user_agent: PROXY_USER_AGENT.to_string(),
        }
    }
}

impl ProxyConfig {
    /// Toggle debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check a proxied request and return the URL to forward
pub async fn validate_url(
    request: &ProxyRequest,
    config: &ProxyConfig,
) -> Result<Url, ProxyError> {
    if !request.method.eq_ignore_ascii_case("GET") {
        return Err(ProxyError::MethodNotAllowed(request.method.clone()));
    }
    if request.header_value("X-Requested-With") != Some(REQUESTED_WITH_VALUE) {
        return Err(ProxyError::NotAjax);
    }

    let raw = request
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(ProxyError::MissingUrl)?;
    let target = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(ProxyError::InvalidUrl(raw.to_string()));
    }

    let referer = request
        .header_value("Referer")
        .ok_or(ProxyError::MissingReferer)?;
    let host = target
        .host_str()
        .ok_or_else(|| ProxyError::InvalidUrl(raw.to_string()))?
        .to_string();

    if config.debug {
        return Ok(target);
    }

    let referer_host = Url::parse(referer)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()));
    if referer_host.as_deref() != Some(request.server_name.as_str()) {
        return Err(ProxyError::ForeignReferer(referer.to_string()));
    }

    if host == "localhost" {
        return Err(ProxyError::ForbiddenHost(host));
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((bare_host, port))
        .await
        .map_err(|_| ProxyError::UnresolvableHost(host.clone()))?
        .map(|addr| addr.ip())
        .collect();
    let ip = addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .ok_or_else(|| ProxyError::UnresolvableHost(host.clone()))?;

    if is_forbidden_address(ip) {
        return Err(ProxyError::ForbiddenHost(host));
    }

    Ok(target)
}

fn is_forbidden_address(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            octets[0] == 127 || (octets[0] == 192 && octets[1] == 168)
        }
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

// =============================================================================
// Handler
// =============================================================================

/// The `/ajax-proxy/` endpoint
pub struct AjaxProxy {
    client: Arc<dyn HttpClient>,
    config: ProxyConfig,
}

impl AjaxProxy {
    /// Create a proxy that forwards with a reqwest client
    pub fn new(config: ProxyConfig) -> crate::Result<Self> {
        let client =
            ReqwestHttpClient::new(HttpClientConfig::default().with_user_agent(&config.user_agent))?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Create a proxy that forwards through `client`
    pub fn with_client(client: Arc<dyn HttpClient>, config: ProxyConfig) -> Self {
        Self { client, config }
    }

    /// Validate and forward one request
    pub async fn handle(&self, request: &ProxyRequest) -> ProxyResponse {
        let target = match validate_url(request, &self.config).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Refusing proxied request: {}", e);
                return ProxyResponse::bad_request();
            }
        };

        tracing::debug!("Proxying {}", target);
        let upstream = match self.client.get(target.as_str()).await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::warn!("Upstream request to {} failed: {}", target, e);
                return ProxyResponse::text(502, e.to_string());
            }
        };

        if !upstream.is_success() {
            let reason = reqwest::StatusCode::from_u16(upstream.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default();
            return ProxyResponse::text(upstream.status, reason);
        }

        let content_type = upstream.content_type.or_else(|| {
            mime_guess::from_path(target.path())
                .first()
                .map(|m| m.essence_str().to_string())
        });

        ProxyResponse {
            status: upstream.status,
            body: upstream.body,
            content_type,
        }
    }
}
