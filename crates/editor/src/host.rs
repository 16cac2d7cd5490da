//! Capabilities required from the host editing widget
//!
//! The embedding code only ever talks to the editor through [`EditorHost`]:
//! reading and replacing the active range, saving and restoring it around a
//! dialog, toggling the toolbar and cleaning a block after an insertion.

use crate::document::{Document, NodeId};
use crate::selection::{Range, SavedSelection};
use crate::{EditorError, Result};

/// Block elements that cannot contain other blocks
const PHRASING_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Editing widget hosting embeds
pub trait EditorHost {
    /// The edited document
    fn document(&self) -> &Document;

    /// The edited document, mutably
    fn document_mut(&mut self) -> &mut Document;

    /// Current selection, if the editor has one
    fn range(&self) -> Option<Range>;

    /// Replace the current selection
    fn select(&mut self, range: Option<Range>);

    /// Show the toolbar
    fn show_toolbar(&mut self);

    /// Hide the toolbar
    fn hide_toolbar(&mut self);

    /// Whether the toolbar is shown
    fn toolbar_visible(&self) -> bool;

    /// Capture the current selection
    fn save_selection(&self) -> SavedSelection {
        SavedSelection::new(self.range())
    }

    /// Bring back a captured selection
    fn restore_selection(&mut self, saved: &SavedSelection) {
        self.select(saved.range());
    }

    /// Select `node`
    fn set_range(&mut self, node: NodeId) -> Result<()> {
        let range = Range::select_node(self.document(), node)?;
        self.select(Some(range));
        Ok(())
    }

    /// Tidy `block` after a node was inserted into it
    ///
    /// Text children are merged. A paragraph that ended up holding a `div`
    /// is split around it, and any part left empty is dropped.
    fn clean_block(&mut self, block: NodeId) -> Result<()> {
        let doc = self.document_mut();
        doc.normalize(block)?;

        let is_phrasing = doc.tag(block).is_some_and(|tag| PHRASING_BLOCKS.contains(&tag));
        let children = doc.children(block).to_vec();
        let holds_div = children.iter().any(|&child| doc.tag(child) == Some("div"));
        if !is_phrasing || !holds_div || block == doc.root() {
            return Ok(());
        }
        let parent = doc.parent(block).ok_or(EditorError::Detached(block))?;
        let mut index = doc.index_in_parent(block).ok_or(EditorError::Detached(block))?;
        let tag = doc.tag(block).unwrap_or("p").to_string();

        tracing::debug!("Splitting {} around an inserted block", block);
        doc.detach(block)?;
        let mut spare = Some(block);
        let mut holder: Option<NodeId> = None;
        for child in children {
            if doc.tag(child) == Some("div") {
                doc.insert_child(parent, index, child)?;
                index += 1;
                holder = None;
                continue;
            }
            let current = match holder {
                Some(current) => current,
                None => {
                    let current = spare.take().unwrap_or_else(|| doc.create_element(&tag));
                    doc.insert_child(parent, index, current)?;
                    index += 1;
                    holder = Some(current);
                    current
                }
            };
            doc.append_child(current, child)?;
        }
        Ok(())
    }

    /// Top level nodes touched by the selection that satisfy `filter`
    fn top_nodes(&self, filter: &dyn Fn(&Document, NodeId) -> bool) -> Vec<NodeId> {
        let Some(range) = self.range() else {
            return Vec::new();
        };
        let doc = self.document();

        let candidates = if range.container == doc.root() {
            range.nodes(doc)
        } else {
            doc.top_level_ancestor(range.container).into_iter().collect()
        };

        let mut nodes = Vec::new();
        for node in candidates {
            if filter(doc, node) && !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        nodes
    }

    /// Top level block holding the caret
    fn enclosing_node(&self) -> Option<NodeId> {
        let range = self.range()?;
        let doc = self.document();
        if range.container == doc.root() {
            range.nodes(doc).first().copied()
        } else {
            doc.top_level_ancestor(range.container)
        }
    }
}

/// In-memory editor
#[derive(Debug, Clone, Default)]
pub struct InlineEditor {
    document: Document,
    range: Option<Range>,
    toolbar_visible: bool,
}

impl InlineEditor {
    /// Create an editor over an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor over `document`
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Serialized content of the editable root
    pub fn html(&self) -> String {
        self.document.inner_html(self.document.root())
    }
}

impl EditorHost for InlineEditor {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn range(&self) -> Option<Range> {
        self.range
    }

    fn select(&mut self, range: Option<Range>) {
        self.range = range;
    }

    fn show_toolbar(&mut self) {
        self.toolbar_visible = true;
    }

    fn hide_toolbar(&mut self) {
        self.toolbar_visible = false;
    }

    fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }
}
