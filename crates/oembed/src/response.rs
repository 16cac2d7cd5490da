//! Provider response interpretation
//!
//! Only the `type` discriminator is checked. `photo` answers carry a media
//! URL, `video` and `rich` answers carry ready-made markup. That markup
//! comes from a third party and is inserted verbatim unless the
//! interpreter is told to refuse it.

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};

/// oEmbed `type` discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Static image, served at `url`
    Photo,
    /// Playable video, as `html`
    Video,
    /// Arbitrary rich content, as `html`
    Rich,
    /// Plain link
    Link,
    /// Missing or unknown type
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaType {
    /// Get the media type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
            MediaType::Rich => "rich",
            MediaType::Link => "link",
            MediaType::Unknown => "unknown",
        }
    }
}

/// oEmbed 1.0 response, reduced to the fields used here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OembedResponse {
    /// Response type
    #[serde(rename = "type", default)]
    pub kind: MediaType,
    /// Media URL (`photo`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Embed markup (`video`, `rich`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Resource title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Provider name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
}

impl OembedResponse {
    /// A `rich` response carrying `html`
    pub fn rich(html: impl Into<String>) -> Self {
        Self {
            kind: MediaType::Rich,
            html: Some(html.into()),
            ..Default::default()
        }
    }

    /// A `photo` response pointing at `url`
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            kind: MediaType::Photo,
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// What to insert for a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaResult {
    /// An image element with this source
    Image {
        /// Image URL
        src: String,
    },
    /// Markup inserted as is
    Markup {
        /// Provider HTML
        html: String,
    },
}

impl MediaResult {
    /// HTML for this result
    pub fn to_html(&self) -> String {
        match self {
            MediaResult::Image { src } => format!("<img src=\"{}\">", escape_html(src)),
            MediaResult::Markup { html } => html.clone(),
        }
    }
}

/// Escape text for use in HTML content or a quoted attribute
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turns raw provider bodies into [`MediaResult`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreter {
    allow_markup: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self { allow_markup: true }
    }
}

impl Interpreter {
    /// Create an interpreter; `allow_markup = false` refuses `video`/`rich`
    pub fn new(allow_markup: bool) -> Self {
        Self { allow_markup }
    }

    /// Parse and classify a raw body
    pub fn interpret(&self, raw_body: &str) -> Result<MediaResult> {
        let response: OembedResponse = serde_json::from_str(raw_body).map_err(|e| {
            tracing::debug!("Unparsable oEmbed response: {}", e);
            EmbedError::MalformedResponse(e.to_string())
        })?;
        self.classify(response)
    }

    /// Classify an already parsed response
    pub fn classify(&self, response: OembedResponse) -> Result<MediaResult> {
        match response.kind {
            MediaType::Photo => response
                .url
                .map(|src| MediaResult::Image { src })
                .ok_or_else(|| EmbedError::MalformedResponse("photo without url".to_string())),
            MediaType::Video | MediaType::Rich if self.allow_markup => response
                .html
                .map(|html| MediaResult::Markup { html })
                .ok_or_else(|| {
                    EmbedError::MalformedResponse(format!("{} without html", response.kind.as_str()))
                }),
            other => {
                tracing::debug!("Refusing oEmbed media type {}", other.as_str());
                Err(EmbedError::UnsupportedMediaType(other.as_str().to_string()))
            }
        }
    }
}

/// Interpret a raw body with the default (markup trusting) interpreter
///
/// # Example
///
/// ```
/// use oembed::{interpret, MediaResult};
///
/// let result = interpret(r#"{"type":"photo","url":"http://x/y.png"}"#).unwrap();
/// assert_eq!(result, MediaResult::Image { src: "http://x/y.png".to_string() });
/// ```
pub fn interpret(raw_body: &str) -> Result<MediaResult> {
    Interpreter::default().interpret(raw_body)
}
