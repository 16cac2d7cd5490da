//! Media URL resolution
//!
//! Ties the pieces together: provider lookup, proxy URL, one GET, and
//! interpretation of the answer. Each call issues at most one request and
//! never retries.

use std::sync::Arc;

use networking::{HttpClient, HttpResponse};

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use crate::providers::ProviderTable;
use crate::request::ProxyUrlBuilder;
use crate::response::{Interpreter, MediaResult};

/// Resolves user supplied media URLs into insertable content
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use networking::{HttpClientConfig, ReqwestHttpClient};
/// use oembed::{EmbedConfig, MediaUrlResolver};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let config = EmbedConfig::new("http://ideascube.lan/fr/blog/new/");
///     let client = ReqwestHttpClient::new(HttpClientConfig::new("http://ideascube.lan"))?;
///     let resolver = MediaUrlResolver::new(&config, Arc::new(client))?;
///
///     let html = resolver.resolve_html("https://vimeo.com/1234").await?;
///     println!("{}", html);
///     Ok(())
/// }
/// ```
pub struct MediaUrlResolver {
    providers: ProviderTable,
    builder: ProxyUrlBuilder,
    interpreter: Interpreter,
    client: Arc<dyn HttpClient>,
}

impl MediaUrlResolver {
    /// Create a resolver for `config`, fetching through `client`
    pub fn new(config: &EmbedConfig, client: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self {
            providers: ProviderTable::from_config(config)?,
            builder: ProxyUrlBuilder::new(config.proxy_path.as_str(), config.maxwidth),
            interpreter: Interpreter::new(config.allow_provider_markup),
            client,
        })
    }

    /// Provider table in use
    pub fn providers(&self) -> &ProviderTable {
        &self.providers
    }

    /// Interpreter in use
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Proxied request URL for `url`, or `UnsupportedProvider`
    pub fn proxy_url(&self, url: &str) -> Result<String> {
        let endpoint = self
            .providers
            .resolve(url)
            .ok_or_else(|| EmbedError::UnsupportedProvider(url.to_string()))?;
        Ok(self.builder.build(endpoint, url))
    }

    /// Send the proxied request for `url` and return its terminal state
    ///
    /// Any HTTP status is returned as is. Fails without sending anything
    /// when no provider matches.
    pub async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let proxy_url = self.proxy_url(url)?;
        tracing::debug!("Fetching embed for {} via {}", url, proxy_url);
        Ok(self.client.get(&proxy_url).await?)
    }

    /// Fetch and interpret, surfacing every failure
    pub async fn lookup(&self, url: &str) -> Result<MediaResult> {
        let response = self.fetch(url).await?;
        if !response.is_success() {
            tracing::debug!("Embed lookup for {} answered {}", url, response.status);
            return Err(EmbedError::Transport {
                status: Some(response.status),
                message: format!("provider answered {}", response.status),
            });
        }
        self.interpreter.interpret(&response.body)
    }

    /// Insertion flow: HTML to insert for `url`
    ///
    /// Failures carry a user displayable [`EmbedError::reason`].
    pub async fn resolve_html(&self, url: &str) -> Result<String> {
        let result = self.lookup(url).await.map_err(|e| {
            tracing::info!("Cannot embed {}: {}", url, e);
            e
        })?;
        Ok(result.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use networking::{MockHttpClient, NetworkError};

    const PAGE: &str = "http://ideascube.lan/fr/blog/new/";

    fn resolver(mock: MockHttpClient) -> MediaUrlResolver {
        MediaUrlResolver::new(&EmbedConfig::new(PAGE), Arc::new(mock)).unwrap()
    }

    #[test]
    fn test_proxy_url_for_supported_provider() {
        let resolver = resolver(MockHttpClient::new());
        let url = resolver.proxy_url("youtube.com/watch?v=abc").unwrap();
        assert!(url.starts_with("/ajax-proxy/?url=http%3A%2F%2Fwww.youtube.com%2Foembed%3F"));
    }

    #[tokio::test]
    async fn test_unsupported_provider_sends_nothing() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().times(0);
        let resolver = resolver(mock);

        let err = resolver.resolve_html("https://example.com/clip").await.unwrap_err();
        assert_eq!(err, EmbedError::UnsupportedProvider("https://example.com/clip".to_string()));
        assert_eq!(err.reason(), "Media provider not supported");
    }

    #[tokio::test]
    async fn test_photo_becomes_img() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"type":"photo","url":"http://x/y.png"}"#)));
        let resolver = resolver(mock);

        let html = resolver.resolve_html("https://www.flickr.com/photos/a/1").await.unwrap();
        assert_eq!(html, r#"<img src="http://x/y.png">"#);
    }

    #[tokio::test]
    async fn test_video_markup_returned_verbatim() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().times(1).returning(|_| {
            Ok(HttpResponse::new(200, r#"{"type":"video","html":"<iframe src=x></iframe>"}"#))
        });
        let resolver = resolver(mock);

        let html = resolver.resolve_html("youtube.com/watch?v=abc").await.unwrap();
        assert_eq!(html, "<iframe src=x></iframe>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_surfaced() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(404, "Not Found")));
        let resolver = resolver(mock);

        let err = resolver.resolve_html("https://vimeo.com/1").await.unwrap_err();
        assert!(matches!(err, EmbedError::Transport { status: Some(404), .. }));
        assert_eq!(err.reason(), "Media request failed");
    }

    #[tokio::test]
    async fn test_network_failure_is_surfaced() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .times(1)
            .returning(|_| Err(NetworkError::Request("connection reset".to_string())));
        let resolver = resolver(mock);

        let err = resolver.lookup("https://vimeo.com/1").await.unwrap_err();
        assert!(matches!(err, EmbedError::Transport { status: None, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_has_empty_reason() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Ok(HttpResponse::new(200, "<html>oops</html>")));
        let resolver = resolver(mock);

        let err = resolver.resolve_html("https://vimeo.com/1").await.unwrap_err();
        assert!(matches!(err, EmbedError::MalformedResponse(_)));
        assert_eq!(err.reason(), "");
    }

    #[tokio::test]
    async fn test_unsupported_media_type() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"type":"link"}"#)));
        let resolver = resolver(mock);

        let err = resolver.resolve_html("https://vimeo.com/1").await.unwrap_err();
        assert_eq!(err.reason(), "Media type not supported");
    }

    #[tokio::test]
    async fn test_local_media_center_endpoint() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .withf(|url: &str| {
                url.starts_with(
                    "/ajax-proxy/?url=http%3A%2F%2Fideascube.lan%2Ffr%2Fmediacenter%2Foembed%2F%3F",
                )
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"type":"rich","html":"<video></video>"}"#)));
        let resolver = resolver(mock);

        let html = resolver
            .resolve_html("http://ideascube.lan/fr/mediacenter/document/3/")
            .await
            .unwrap();
        assert_eq!(html, "<video></video>");
    }
}
