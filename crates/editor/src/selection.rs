//! Selection ranges
//!
//! A range spans child positions `start..end` of one container node. A
//! collapsed range (`start == end`) is a caret.

use crate::document::{Document, NodeId};
use crate::{EditorError, Result};

/// Selection inside a container node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Node whose children the offsets index
    pub container: NodeId,
    /// First selected child position
    pub start: usize,
    /// Position after the last selected child
    pub end: usize,
}

impl Range {
    /// Create a range over `start..end` of `container`
    pub fn new(container: NodeId, start: usize, end: usize) -> Self {
        Self {
            container,
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Caret at `offset` in `container`
    pub fn collapsed(container: NodeId, offset: usize) -> Self {
        Self::new(container, offset, offset)
    }

    /// Range selecting exactly `node` within its parent
    pub fn select_node(doc: &Document, node: NodeId) -> Result<Self> {
        let parent = doc.parent(node).ok_or(EditorError::Detached(node))?;
        let index = doc.index_in_parent(node).ok_or(EditorError::Detached(node))?;
        Ok(Self::new(parent, index, index + 1))
    }

    /// Caret after the last child of `container`
    pub fn end_of(doc: &Document, container: NodeId) -> Self {
        Self::collapsed(container, doc.children(container).len())
    }

    /// The same position expressed inside an element
    ///
    /// A caret inside a text or raw node becomes a caret in the parent
    /// element, before the node at offset 0 and after it otherwise. Text is
    /// never split.
    pub fn to_element_range(&self, doc: &Document) -> Result<Self> {
        if doc.is_element(self.container) {
            return Ok(*self);
        }
        let parent = doc
            .parent(self.container)
            .ok_or(EditorError::Detached(self.container))?;
        let index = doc
            .index_in_parent(self.container)
            .ok_or(EditorError::Detached(self.container))?;
        let offset = if self.start > 0 { index + 1 } else { index };
        Ok(Self::collapsed(parent, offset))
    }

    /// Whether the range is a caret
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Nodes covered by the range
    pub fn nodes(&self, doc: &Document) -> Vec<NodeId> {
        let children = doc.children(self.container);
        let end = self.end.min(children.len());
        let start = self.start.min(end);
        children[start..end].to_vec()
    }

    fn check(&self, doc: &Document) -> Result<()> {
        let len = doc.children(self.container).len();
        if self.end > len {
            return Err(EditorError::InvalidRange(format!(
                "{}..{} in {} with {} children",
                self.start, self.end, self.container, len
            )));
        }
        Ok(())
    }

    /// Remove the selected nodes and collapse onto `start`
    pub fn delete_contents(&mut self, doc: &mut Document) -> Result<()> {
        self.check(doc)?;
        for node in self.nodes(doc) {
            doc.detach(node)?;
        }
        self.end = self.start;
        Ok(())
    }

    /// Insert `node` at the start of the range
    pub fn insert_node(&mut self, doc: &mut Document, node: NodeId) -> Result<()> {
        self.check(doc)?;
        doc.insert_child(self.container, self.start, node)?;
        self.end += 1;
        Ok(())
    }
}

/// Selection captured before a dialog takes focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedSelection(Option<Range>);

impl SavedSelection {
    /// Capture `range`
    pub fn new(range: Option<Range>) -> Self {
        Self(range)
    }

    /// The captured range, if any
    pub fn range(&self) -> Option<Range> {
        self.0
    }
}
