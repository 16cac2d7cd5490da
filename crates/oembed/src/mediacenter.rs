//! oEmbed endpoint of the local media center
//!
//! Documents uploaded to the instance are embeddable like any third-party
//! media: the provider table routes their URLs to
//! `[/<lang>]/mediacenter/oembed/`, which answers with a `rich` response
//! rendering the document according to its kind.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::response::{escape_html, OembedResponse};

/// Errors of the endpoint
///
/// `MissingUrl` and `NotFound` are answered as 404, `Encoding` as 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediacenterError {
    /// No `url` parameter
    #[error("Missing url parameter")]
    MissingUrl,

    /// URL does not designate an existing document
    #[error("No document for URL: {0}")]
    NotFound(String),

    /// The answer could not be serialized
    #[error("Failed to encode answer: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for MediacenterError {
    fn from(err: serde_json::Error) -> Self {
        MediacenterError::Encoding(err.to_string())
    }
}

/// Kind of a media center document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Picture
    Image,
    /// Sound
    Audio,
    /// Movie
    Video,
    /// PDF document
    Pdf,
    /// Plain text
    Text,
    /// Anything else
    #[default]
    Other,
}

impl DocumentKind {
    /// Kinds recognised in a content type, in lookup order
    const LOOKUPS: [(&'static str, DocumentKind); 5] = [
        ("image", DocumentKind::Image),
        ("video", DocumentKind::Video),
        ("audio", DocumentKind::Audio),
        ("text", DocumentKind::Text),
        ("pdf", DocumentKind::Pdf),
    ];

    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::Audio => "audio",
            DocumentKind::Video => "video",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
            DocumentKind::Other => "other",
        }
    }
}

/// Guess a document kind from a content type such as `video/mp4`
pub fn guess_kind_from_content_type(content_type: &str) -> Option<DocumentKind> {
    DocumentKind::LOOKUPS
        .iter()
        .find(|(lookup, _)| content_type.contains(lookup))
        .map(|(_, kind)| *kind)
}

/// Guess a document kind from a file name
pub fn guess_kind_from_filename(filename: &str) -> Option<DocumentKind> {
    mime_guess::from_path(filename)
        .first()
        .and_then(|mime| guess_kind_from_content_type(mime.essence_str()))
}

/// A media center document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Primary key
    pub id: u64,
    /// Title
    pub title: String,
    /// Kind
    pub kind: DocumentKind,
    /// URL of the uploaded file
    pub original_url: String,
}

impl Document {
    /// Create a document, guessing its kind from the file URL
    pub fn new(id: u64, title: impl Into<String>, original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        let kind = guess_kind_from_filename(&original_url).unwrap_or_default();
        Self {
            id,
            title: title.into(),
            kind,
            original_url,
        }
    }

    /// Override the kind
    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Markup embedding this document
    pub fn render(&self) -> String {
        let src = escape_html(&self.original_url);
        match self.kind {
            DocumentKind::Image => {
                format!("<img src=\"{}\" alt=\"{}\">", src, escape_html(&self.title))
            }
            DocumentKind::Video => format!("<video controls><source src=\"{}\"></video>", src),
            DocumentKind::Audio => format!("<audio controls><source src=\"{}\"></audio>", src),
            DocumentKind::Pdf | DocumentKind::Text | DocumentKind::Other => {
                format!("<a href=\"{}\">{}</a>", src, escape_html(&self.title))
            }
        }
    }
}

/// Read access to media center documents
pub trait DocumentStore {
    /// Look up a document by primary key
    fn get(&self, id: u64) -> Option<Document>;
}

impl DocumentStore for HashMap<u64, Document> {
    fn get(&self, id: u64) -> Option<Document> {
        HashMap::get(self, &id).cloned()
    }
}

fn document_path() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:/[a-z]{2}(?:-[a-z]+)?)?/mediacenter/document/(\d+)/$")
            .expect("valid document path pattern")
    })
}

/// Primary key of the document a URL points at
///
/// Accepts absolute URLs and bare paths, with or without a language
/// prefix.
pub fn document_id_from_url(url: &str) -> Option<u64> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    document_path()
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// Answer an oEmbed request for the `url` parameter
pub fn oembed<S>(store: &S, url: Option<&str>) -> Result<OembedResponse, MediacenterError>
where
    S: DocumentStore + ?Sized,
{
    let url = url.filter(|u| !u.is_empty()).ok_or(MediacenterError::MissingUrl)?;
    let document = document_id_from_url(url)
        .and_then(|id| store.get(id))
        .ok_or_else(|| MediacenterError::NotFound(url.to_string()))?;

    tracing::debug!("Serving oEmbed for document {} ({})", document.id, document.kind.as_str());
    Ok(OembedResponse {
        title: Some(document.title.clone()),
        ..OembedResponse::rich(document.render())
    })
}

/// [`oembed`], serialized as the JSON body of the answer
pub fn oembed_json<S>(store: &S, url: Option<&str>) -> Result<String, MediacenterError>
where
    S: DocumentStore + ?Sized,
{
    let response = oembed(store, url)?;
    Ok(serde_json::to_string(&response)?)
}
