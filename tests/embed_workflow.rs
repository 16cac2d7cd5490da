//! End-to-end embedding workflow
//!
//! The editor resolves URLs through the same-origin proxy endpoint, served
//! in process by `AjaxProxy`, which forwards to a wiremock provider.

use std::sync::Arc;

use async_trait::async_trait;
use editor::{EditorHost, InlineEditor, OembedControl, Range, SaveOutcome, DATA_URL_ATTR};
use networking::{AjaxProxy, HttpClient, HttpResponse, NetworkError, ProxyConfig, ProxyRequest};
use oembed::{EmbedConfig, EmbedError, MediaUrlResolver};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER_NAME: &str = "ideascube.lan";
const PAGE_URL: &str = "http://ideascube.lan/fr/blog/new/";

/// Serves `/ajax-proxy/` requests with an in-process proxy
struct ProxyRoute {
    proxy: AjaxProxy,
    referer: String,
}

#[async_trait]
impl HttpClient for ProxyRoute {
    async fn get(&self, url: &str) -> networking::Result<HttpResponse> {
        let url = Url::parse(&format!("http://{}", SERVER_NAME))?.join(url)?;
        if url.path() != "/ajax-proxy/" {
            return Ok(HttpResponse::new(404, "Not Found"));
        }

        let mut request = ProxyRequest::get(SERVER_NAME).ajax_from(self.referer.as_str());
        if let Some((_, target)) = url.query_pairs().find(|(k, _)| k == "url") {
            request = request.url(target.into_owned());
        }

        let response = self.proxy.handle(&request).await;
        let mut answer = HttpResponse::new(response.status, response.body);
        if let Some(content_type) = response.content_type {
            answer = answer.with_content_type(content_type);
        }
        Ok(answer)
    }
}

fn config_for(provider: &MockServer) -> EmbedConfig {
    EmbedConfig::new(PAGE_URL).with_provider(
        r"^(https?://)?media\.example\.org/",
        format!("{}/oembed", provider.uri()),
    )
}

fn resolver(provider: &MockServer, proxy: ProxyConfig, referer: &str) -> MediaUrlResolver {
    let route = ProxyRoute {
        proxy: AjaxProxy::new(proxy).unwrap(),
        referer: referer.to_string(),
    };
    MediaUrlResolver::new(&config_for(provider), Arc::new(route)).unwrap()
}

#[tokio::test]
async fn test_dialog_to_container_through_proxy() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oembed"))
        .and(query_param("url", "https://media.example.org/v/1"))
        .and(query_param("format", "json"))
        .and(query_param("maxwidth", "800"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"type":"video","html":"<iframe src=\"https://media.example.org/e/1\"></iframe>"}"#),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let control = OembedControl::new(resolver(
        &provider,
        ProxyConfig::default().with_debug(true),
        PAGE_URL,
    ));
    let mut editor = InlineEditor::new();
    let root = editor.document().root();
    editor.select(Some(Range::collapsed(root, 0)));

    let mut dialog = control.click(&mut editor);
    dialog.set_input("https://media.example.org/v/1");
    let outcome = dialog.submit(&control, &mut editor).await;

    let SaveOutcome::Inserted(node) = outcome else {
        panic!("unexpected outcome: {:?}", outcome);
    };
    assert_eq!(
        editor.document().attribute(node, DATA_URL_ATTR),
        Some("https://media.example.org/v/1")
    );
    assert_eq!(
        editor.html(),
        r#"<div data-url="https://media.example.org/v/1" class="minislate-oembed-container"><iframe src="https://media.example.org/e/1"></iframe></div>"#
    );

    let mut dialog = control.click(&mut editor);
    assert_eq!(dialog.input(), "https://media.example.org/v/1");
    dialog.set_input("");
    assert_eq!(dialog.submit(&control, &mut editor).await, SaveOutcome::Removed);
    assert_eq!(editor.html(), "");
}

#[tokio::test]
async fn test_provider_error_status_reaches_insertion_flow() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&provider)
        .await;

    let resolver = resolver(&provider, ProxyConfig::default().with_debug(true), PAGE_URL);

    let err = resolver
        .resolve_html("https://media.example.org/v/404")
        .await
        .unwrap_err();
    assert!(matches!(err, EmbedError::Transport { status: Some(404), .. }));
    assert_eq!(err.reason(), "Media request failed");
}

#[tokio::test]
async fn test_foreign_referer_is_refused() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"type":"rich","html":"x"}"#))
        .expect(0)
        .mount(&provider)
        .await;

    let resolver = resolver(&provider, ProxyConfig::default(), "http://elsewhere.org/");

    let err = resolver
        .resolve_html("https://media.example.org/v/1")
        .await
        .unwrap_err();
    assert!(matches!(err, EmbedError::Transport { status: Some(400), .. }));
}

#[tokio::test]
async fn test_unsupported_provider_never_reaches_proxy() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let control = OembedControl::new(resolver(
        &provider,
        ProxyConfig::default().with_debug(true),
        PAGE_URL,
    ));
    let mut editor = InlineEditor::new();

    let outcome = control
        .save_oembed(&mut editor, None, Some("https://unknown.example.com/v/1"))
        .await;
    assert_eq!(outcome, SaveOutcome::Dropped);
    assert_eq!(editor.html(), "");

    let err = control
        .resolver()
        .resolve_html("https://unknown.example.com/v/1")
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "Media provider not supported");
}

#[test]
fn test_network_error_converts_to_transport() {
    let err: EmbedError = NetworkError::Request("reset".to_string()).into();
    assert!(matches!(err, EmbedError::Transport { status: None, .. }));
}
