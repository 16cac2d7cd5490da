//! Toolbar control for embedded media
//!
//! This is the legacy embedding flow: failures of any kind leave the
//! document untouched and are only logged. Callers wanting a reason to
//! show the user go through [`oembed::MediaUrlResolver::resolve_html`]
//! instead.

use oembed::{MediaResult, MediaUrlResolver};

use crate::dialog::OembedDialog;
use crate::document::{Document, NodeId};
use crate::host::EditorHost;
use crate::selection::Range;
use crate::sink::{self, InsertionTarget, CONTAINER_CLASS};

/// What a save did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// An existing container was removed
    Removed,
    /// A container was created
    Inserted(NodeId),
    /// An existing container was refilled
    Updated(NodeId),
    /// Nothing changed
    Dropped,
}

/// Embed button of the editor toolbar
pub struct OembedControl {
    resolver: MediaUrlResolver,
}

impl OembedControl {
    /// Create a control resolving URLs with `resolver`
    pub fn new(resolver: MediaUrlResolver) -> Self {
        Self { resolver }
    }

    /// Resolver in use
    pub fn resolver(&self) -> &MediaUrlResolver {
        &self.resolver
    }

    /// Whether `node` is an embed container
    pub fn filter_container(doc: &Document, node: NodeId) -> bool {
        doc.tag(node) == Some("div") && doc.has_class_name(node, CONTAINER_CLASS)
    }

    /// Embed container under the selection
    pub fn get_container<H>(&self, host: &H) -> Option<NodeId>
    where
        H: EditorHost + ?Sized,
    {
        host.top_nodes(&Self::filter_container).into_iter().next()
    }

    /// Whether the caret sits in a block without text
    pub fn is_empty_node<H>(&self, host: &H) -> bool
    where
        H: EditorHost + ?Sized,
    {
        host.enclosing_node()
            .is_some_and(|node| host.document().text_content(node).is_empty())
    }

    /// Whether the button shows as active
    pub fn is_highlighted<H>(&self, host: &H) -> bool
    where
        H: EditorHost + ?Sized,
    {
        self.get_container(host).is_some()
    }

    /// Whether the button is offered
    pub fn is_visible<H>(&self, host: &H) -> bool
    where
        H: EditorHost + ?Sized,
    {
        self.get_container(host).is_some() || self.is_empty_node(host)
    }

    /// Button click: open the dialog for the container under the selection
    pub fn click<H>(&self, host: &mut H) -> OembedDialog
    where
        H: EditorHost + ?Sized,
    {
        let container = self.get_container(host);
        OembedDialog::open(host, container)
    }

    /// Target for a save on `node`, or at the current selection
    ///
    /// Without a selection, new containers go at the end of the document.
    pub fn insertion_target<H>(&self, host: &H, node: Option<NodeId>) -> InsertionTarget
    where
        H: EditorHost + ?Sized,
    {
        match node {
            Some(node) => InsertionTarget::Existing(node),
            None => {
                let doc = host.document();
                let range = host
                    .range()
                    .unwrap_or_else(|| Range::end_of(doc, doc.root()));
                InsertionTarget::Fresh(range)
            }
        }
    }

    /// Resolve `url`
    ///
    /// Failures are logged here. Callers of the legacy flow drop them
    /// without touching the document.
    pub async fn fetch(&self, url: &str) -> oembed::Result<MediaResult> {
        self.resolver.lookup(url).await.map_err(|e| {
            tracing::debug!("Dropping embed for {}: {}", url, e);
            e
        })
    }

    /// Put a resolved `result` for `url` at `target`
    pub fn apply<H>(
        &self,
        host: &mut H,
        target: InsertionTarget,
        url: &str,
        result: &MediaResult,
    ) -> SaveOutcome
    where
        H: EditorHost + ?Sized,
    {
        match sink::insert(host, target, url, Some(result)) {
            Ok(Some(node)) => match target {
                InsertionTarget::Existing(_) => SaveOutcome::Updated(node),
                InsertionTarget::Fresh(_) => SaveOutcome::Inserted(node),
            },
            Ok(None) => SaveOutcome::Dropped,
            Err(e) => {
                tracing::warn!("Failed to place embed for {}: {}", url, e);
                SaveOutcome::Dropped
            }
        }
    }

    /// Remove the container `node`
    pub fn remove<H>(&self, host: &mut H, node: NodeId) -> SaveOutcome
    where
        H: EditorHost + ?Sized,
    {
        match sink::insert(host, InsertionTarget::Existing(node), "", None) {
            Ok(_) => SaveOutcome::Removed,
            Err(e) => {
                tracing::warn!("Failed to remove embed container {}: {}", node, e);
                SaveOutcome::Dropped
            }
        }
    }

    /// Save the dialog value for `node`
    ///
    /// An empty or missing URL removes `node`. Otherwise the URL is resolved
    /// and the result placed into `node`, or into a new container at the
    /// selection captured when the save started. A failed lookup changes
    /// nothing.
    pub async fn save_oembed<H>(
        &self,
        host: &mut H,
        node: Option<NodeId>,
        url: Option<&str>,
    ) -> SaveOutcome
    where
        H: EditorHost + ?Sized,
    {
        let url = url.unwrap_or_default();
        if url.is_empty() {
            return match node {
                Some(node) => self.remove(host, node),
                None => {
                    host.show_toolbar();
                    SaveOutcome::Dropped
                }
            };
        }

        let target = self.insertion_target(host, node);
        match self.fetch(url).await {
            Ok(result) => self.apply(host, target, url, &result),
            Err(_) => SaveOutcome::Dropped,
        }
    }
}
