//! Proxied oEmbed request construction
//!
//! The provider request `endpoint?url=..&format=json&maxwidth=..` is itself
//! URL-encoded into the `url` parameter of the same-origin proxy path.

use serde::Serialize;

/// Default same-origin proxy path
pub const DEFAULT_PROXY_PATH: &str = "/ajax-proxy/";

/// Default `maxwidth` asked from providers
pub const DEFAULT_MAXWIDTH: u32 = 800;

/// Encode `params` as `key=value&key=value`, keeping their order
pub fn query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parameters sent to a provider endpoint
///
/// Built fresh for each lookup and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OembedRequest {
    /// URL of the media to embed
    pub url: String,
    /// Response format; always `json`
    pub format: &'static str,
    /// Maximum width of the embedded media
    pub maxwidth: u32,
}

impl OembedRequest {
    /// Create a JSON request for `url`
    pub fn new(url: impl Into<String>, maxwidth: u32) -> Self {
        Self {
            url: url.into(),
            format: "json",
            maxwidth,
        }
    }

    /// Encoded query, in the order `url`, `format`, `maxwidth`
    pub fn query(&self) -> String {
        let maxwidth = self.maxwidth.to_string();
        query_string(&[
            ("url", self.url.as_str()),
            ("format", self.format),
            ("maxwidth", maxwidth.as_str()),
        ])
    }

    /// Full provider request URL
    pub fn provider_url(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.query())
    }
}

/// Builds proxy URLs for a given proxy path and width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyUrlBuilder {
    proxy_path: String,
    maxwidth: u32,
}

impl Default for ProxyUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_PATH, DEFAULT_MAXWIDTH)
    }
}

impl ProxyUrlBuilder {
    /// Create a builder
    pub fn new(proxy_path: impl Into<String>, maxwidth: u32) -> Self {
        Self {
            proxy_path: proxy_path.into(),
            maxwidth,
        }
    }

    /// Proxy URL fetching `endpoint` for `source_url`
    ///
    /// Source URLs are passed through unchecked, whatever their length.
    pub fn build(&self, endpoint: &str, source_url: &str) -> String {
        let provider_url = OembedRequest::new(source_url, self.maxwidth).provider_url(endpoint);
        format!("{}?{}", self.proxy_path, query_string(&[("url", provider_url.as_str())]))
    }
}

/// Proxy URL with the default proxy path and width
///
/// # Example
///
/// ```
/// use oembed::build_proxy_url;
///
/// let url = build_proxy_url("http://vimeo.com/api/oembed.json", "vimeo.com/1");
/// assert_eq!(
///     url,
///     "/ajax-proxy/?url=http%3A%2F%2Fvimeo.com%2Fapi%2Foembed.json%3Furl%3Dvimeo.com%252F1%26format%3Djson%26maxwidth%3D800"
/// );
/// ```
pub fn build_proxy_url(endpoint: &str, source_url: &str) -> String {
    ProxyUrlBuilder::default().build(endpoint, source_url)
}
