//! Error types for oEmbed resolution

use thiserror::Error;

/// Errors that can occur while resolving an embed
///
/// Every failure is local to one insertion attempt. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    /// No provider pattern matches the URL; no request was sent
    #[error("Unsupported provider for URL: {0}")]
    UnsupportedProvider(String),

    /// Non-2xx status, or no status at all
    #[error("Transport failure ({}): {message}", status_label(.status))]
    Transport {
        /// HTTP status, if one was received
        status: Option<u16>,
        /// Description of the failure
        message: String,
    },

    /// Body could not be parsed
    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    /// Parsed, but the media type is not handled
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Configuration could not be loaded or compiled
    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "no status".to_string(),
    }
}

impl EmbedError {
    /// Reason shown to the user by the insertion flow
    pub fn reason(&self) -> &'static str {
        match self {
            EmbedError::UnsupportedProvider(_) => "Media provider not supported",
            EmbedError::Transport { .. } => "Media request failed",
            EmbedError::MalformedResponse(_) => "",
            EmbedError::UnsupportedMediaType(_) => "Media type not supported",
            EmbedError::Config(_) => "Media embedding is misconfigured",
        }
    }
}

impl From<networking::NetworkError> for EmbedError {
    fn from(err: networking::NetworkError) -> Self {
        EmbedError::Transport {
            status: None,
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for EmbedError {
    fn from(err: regex::Error) -> Self {
        EmbedError::Config(err.to_string())
    }
}

/// Result type for embed operations
pub type Result<T> = std::result::Result<T, EmbedError>;
