//! Provider resolution
//!
//! An ordered table of URL patterns and the oEmbed endpoint serving each.
//! The first matching pattern wins. Patterns are matched from the start of
//! the URL only, and tolerate a missing scheme and a `www.` prefix.

use regex::Regex;

use crate::config::{EmbedConfig, LocalOrigin, ProviderEntry};
use crate::error::Result;

/// Built-in third-party providers, in match order
pub const DEFAULT_PROVIDERS: &[(&str, &str)] = &[
    (
        r"^(http(s)?://)?(www\.)?(youtube\.com|youtu\.be)",
        "http://www.youtube.com/oembed",
    ),
    (
        r"^(http(s)?://)?(www\.)?dailymotion\.com",
        "http://www.dailymotion.com/services/oembed",
    ),
    (r"^(https?://)?vimeo.com/", "http://vimeo.com/api/oembed.json"),
    (
        r"^(https?://)?(www\.)?flickr.com/",
        "https://www.flickr.com/services/oembed/",
    ),
];

/// One compiled provider
#[derive(Debug, Clone)]
pub struct Provider {
    pattern: Regex,
    endpoint: String,
}

impl Provider {
    /// Compile a provider
    pub fn new(pattern: &str, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            endpoint: endpoint.into(),
        })
    }

    /// The pattern source
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check whether `url` belongs to this provider
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// Ordered provider table, immutable once built
///
/// # Example
///
/// ```
/// use oembed::{LocalOrigin, ProviderTable};
///
/// let local = LocalOrigin::new("http://ideascube.lan", "/fr", "ideascube.lan");
/// let table = ProviderTable::new(&local).unwrap();
///
/// assert_eq!(table.resolve("youtu.be/abc"), Some("http://www.youtube.com/oembed"));
/// assert_eq!(table.resolve("ftp://example.com"), None);
/// ```
#[derive(Debug, Clone)]
pub struct ProviderTable {
    providers: Vec<Provider>,
}

impl ProviderTable {
    /// Built-in providers followed by the local media center
    pub fn new(local: &LocalOrigin) -> Result<Self> {
        Self::with_extra(local, &[])
    }

    /// Built-in providers, then `extra`, then the local media center
    pub fn with_extra(local: &LocalOrigin, extra: &[ProviderEntry]) -> Result<Self> {
        let mut providers = DEFAULT_PROVIDERS
            .iter()
            .map(|(pattern, endpoint)| Provider::new(pattern, *endpoint))
            .collect::<Result<Vec<_>>>()?;

        for entry in extra {
            providers.push(Provider::new(&entry.pattern, entry.endpoint.as_str())?);
        }
        providers.push(Provider::new(&local.pattern(), local.endpoint())?);

        Ok(Self { providers })
    }

    /// Build the table described by a configuration
    pub fn from_config(config: &EmbedConfig) -> Result<Self> {
        Self::with_extra(&config.local_origin()?, &config.extra_providers)
    }

    /// Endpoint of the first provider matching `url`
    pub fn resolve(&self, url: &str) -> Option<&str> {
        let endpoint = self
            .providers
            .iter()
            .find(|p| p.matches(url))
            .map(|p| p.endpoint());

        match endpoint {
            Some(endpoint) => tracing::debug!("{} resolved to provider {}", url, endpoint),
            None => tracing::debug!("No provider for {}", url),
        }
        endpoint
    }

    /// Providers in match order
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
