//! oEmbed resolution for the content editor
//!
//! Maps a user supplied URL to a provider endpoint, builds the request
//! routed through the same-origin proxy, and turns the provider answer
//! into something the editor can insert. Also serves the oEmbed endpoint
//! of the local media center.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod mediacenter;
pub mod providers;
pub mod request;
pub mod resolver;
pub mod response;

pub use config::{EmbedConfig, LocalOrigin, ProviderEntry};
pub use error::{EmbedError, Result};
pub use providers::ProviderTable;
pub use request::{build_proxy_url, query_string, OembedRequest, ProxyUrlBuilder};
pub use resolver::MediaUrlResolver;
pub use response::{escape_html, interpret, Interpreter, MediaResult, MediaType, OembedResponse};
