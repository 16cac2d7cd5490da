//! Integration tests for media URL resolution
//!
//! A wiremock server plays the same-origin proxy; the resolver talks to it
//! through the real reqwest client.

use std::collections::HashMap;
use std::sync::Arc;

use networking::{HttpClientConfig, ReqwestHttpClient};
use oembed::mediacenter::{self, Document};
use oembed::{EmbedConfig, EmbedError, MediaUrlResolver};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer, config: EmbedConfig) -> MediaUrlResolver {
    let client = ReqwestHttpClient::new(HttpClientConfig::new(server.uri())).unwrap();
    MediaUrlResolver::new(&config, Arc::new(client)).unwrap()
}

#[tokio::test]
async fn test_youtube_video_through_proxy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax-proxy/"))
        .and(query_param(
            "url",
            "http://www.youtube.com/oembed?url=youtube.com%2Fwatch%3Fv%3Dabc&format=json&maxwidth=800",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"type":"video","html":"<iframe src=\"https://www.youtube.com/embed/abc\"></iframe>"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = EmbedConfig::new(format!("{}/fr/blog/new/", mock_server.uri()));
    let resolver = resolver_for(&mock_server, config);

    let html = resolver.resolve_html("youtube.com/watch?v=abc").await.unwrap();
    assert_eq!(html, r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#);
}

#[tokio::test]
async fn test_configured_maxwidth_and_proxy_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proxy/"))
        .and(query_param(
            "url",
            "http://vimeo.com/api/oembed.json?url=https%3A%2F%2Fvimeo.com%2F42&format=json&maxwidth=320",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"type":"photo","url":"http://x/y.png"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = EmbedConfig::new(format!("{}/", mock_server.uri()))
        .with_proxy_path("/proxy/")
        .with_maxwidth(320);
    let resolver = resolver_for(&mock_server, config);

    let html = resolver.resolve_html("https://vimeo.com/42").await.unwrap();
    assert_eq!(html, r#"<img src="http://x/y.png">"#);
}

#[tokio::test]
async fn test_proxy_error_status_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax-proxy/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let config = EmbedConfig::new(format!("{}/fr/", mock_server.uri()));
    let resolver = resolver_for(&mock_server, config);

    let err = resolver.resolve_html("https://vimeo.com/42").await.unwrap_err();
    assert!(matches!(err, EmbedError::Transport { status: Some(400), .. }));
}

#[tokio::test]
async fn test_markup_refused_by_configuration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax-proxy/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"type":"rich","html":"<script></script>"}"#),
        )
        .mount(&mock_server)
        .await;

    let config = EmbedConfig::new(format!("{}/", mock_server.uri())).with_provider_markup(false);
    let resolver = resolver_for(&mock_server, config);

    let err = resolver.resolve_html("https://www.dailymotion.com/video/x1").await.unwrap_err();
    assert_eq!(err.reason(), "Media type not supported");
}

#[tokio::test]
async fn test_local_document_round_trip() {
    let mock_server = MockServer::start().await;

    let mut store = HashMap::new();
    store.insert(5, Document::new(5, "Harvest", "/media/harvest.mp4"));
    let source = "http://ideascube.lan/fr/mediacenter/document/5/";
    let body = mediacenter::oembed_json(&store, Some(source)).unwrap();

    let provider_url = format!(
        "{}/fr/mediacenter/oembed/?url=http%3A%2F%2Fideascube.lan%2Ffr%2Fmediacenter%2Fdocument%2F5%2F&format=json&maxwidth=800",
        mock_server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/ajax-proxy/"))
        .and(query_param("url", provider_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = EmbedConfig::new(format!("{}/fr/blog/new/", mock_server.uri()));
    let resolver = resolver_for(&mock_server, config);

    let html = resolver.resolve_html(source).await.unwrap();
    assert_eq!(html, r#"<video controls><source src="/media/harvest.mp4"></video>"#);
}
