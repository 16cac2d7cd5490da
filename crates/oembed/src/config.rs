//! Embedding configuration
//!
//! Everything the resolver needs to know about its deployment is passed in
//! explicitly: the page it runs on, the instance's own domain, the proxy
//! path and the provider list. Configuration can be built in code or read
//! from TOML:
//!
//! ```toml
//! page_url = "http://ideascube.lan/fr/blog/new/"
//! domain = "ideascube.lan"
//! maxwidth = 640
//!
//! [[extra_providers]]
//! pattern = '^(https?://)?(www\.)?soundcloud\.com/'
//! endpoint = "https://soundcloud.com/oembed"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EmbedError, Result};
use crate::request::{DEFAULT_MAXWIDTH, DEFAULT_PROXY_PATH};

/// Domain of a stock deployment
pub const DEFAULT_DOMAIN: &str = "ideascube.lan";

/// Path of the media center oEmbed endpoint, below the language prefix
pub const MEDIACENTER_OEMBED_PATH: &str = "/mediacenter/oembed/";

/// Number of leading path characters kept as the language prefix (`/fr`)
const PATH_PREFIX_LEN: usize = 3;

/// Additional provider declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Regular expression matched against the start of the URL
    pub pattern: String,
    /// oEmbed endpoint of the provider
    pub endpoint: String,
}

impl ProviderEntry {
    /// Create a provider entry
    pub fn new(pattern: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// URL of the page hosting the editor
    pub page_url: String,
    /// The instance's own domain
    pub domain: String,
    /// Same-origin proxy path
    pub proxy_path: String,
    /// `maxwidth` requested from providers
    pub maxwidth: u32,
    /// Whether provider `video`/`rich` HTML may be inserted
    pub allow_provider_markup: bool,
    /// Providers tried after the built-in ones
    pub extra_providers: Vec<ProviderEntry>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            page_url: "http://localhost/".to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            proxy_path: DEFAULT_PROXY_PATH.to_string(),
            maxwidth: DEFAULT_MAXWIDTH,
            allow_provider_markup: true,
            extra_providers: Vec::new(),
        }
    }
}

impl EmbedConfig {
    /// Create a configuration for an editor running on `page_url`
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| EmbedError::Config(e.to_string()))
    }

    /// Read a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| EmbedError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&input)
    }

    /// Set the instance domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the proxy path
    pub fn with_proxy_path(mut self, proxy_path: impl Into<String>) -> Self {
        self.proxy_path = proxy_path.into();
        self
    }

    /// Set the requested maximum width
    pub fn with_maxwidth(mut self, maxwidth: u32) -> Self {
        self.maxwidth = maxwidth;
        self
    }

    /// Allow or refuse provider markup
    pub fn with_provider_markup(mut self, allow: bool) -> Self {
        self.allow_provider_markup = allow;
        self
    }

    /// Append a provider
    pub fn with_provider(mut self, pattern: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.extra_providers.push(ProviderEntry::new(pattern, endpoint));
        self
    }

    /// Derive the local origin from `page_url` and `domain`
    pub fn local_origin(&self) -> Result<LocalOrigin> {
        LocalOrigin::from_page_url(&self.page_url, &self.domain)
    }
}

/// Where the local media center lives, as seen from the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOrigin {
    /// Scheme, host and port of the page (`http://ideascube.lan`)
    pub origin: String,
    /// Language prefix of the page path (`/fr`), possibly empty
    pub path_prefix: String,
    /// The instance's own domain
    pub domain: String,
}

impl LocalOrigin {
    /// Create a local origin from its parts
    pub fn new(
        origin: impl Into<String>,
        path_prefix: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            path_prefix: path_prefix.into(),
            domain: domain.into(),
        }
    }

    /// Derive the origin and language prefix from a page URL
    pub fn from_page_url(page_url: &str, domain: &str) -> Result<Self> {
        let url = Url::parse(page_url)
            .map_err(|e| EmbedError::Config(format!("invalid page URL {}: {}", page_url, e)))?;
        let origin = url.origin().ascii_serialization();
        let prefix: String = url.path().chars().take(PATH_PREFIX_LEN).collect();
        let path_prefix = prefix.trim_end_matches('/').to_string();

        Ok(Self::new(origin, path_prefix, domain))
    }

    /// oEmbed endpoint of the local media center
    pub fn endpoint(&self) -> String {
        format!("{}{}{}", self.origin, self.path_prefix, MEDIACENTER_OEMBED_PATH)
    }

    /// Pattern matching URLs that point at this instance
    pub fn pattern(&self) -> String {
        format!(
            r"^(https?://)?((www\.)?{}/|localhost)",
            regex::escape(&self.domain)
        )
    }
}
