//! Editing surface for embedded media
//!
//! A framework-agnostic model of the inline editor hosting embeds: a small
//! document tree, selection ranges, the capabilities the embedding code
//! needs from the host editor, and the toolbar control and dialog that
//! insert, update and remove embed containers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod dialog;
pub mod document;
pub mod host;
pub mod selection;
pub mod sink;

pub use control::{OembedControl, SaveOutcome};
pub use dialog::OembedDialog;
pub use document::{Document, NodeId};
pub use host::{EditorHost, InlineEditor};
pub use selection::{Range, SavedSelection};
pub use sink::{InsertionTarget, CONTAINER_CLASS, DATA_URL_ATTR};

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Error types for editor operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Node id does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Node is not attached to the document tree
    #[error("Node {0} is detached")]
    Detached(NodeId),

    /// Range offsets fall outside their container
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}
