//! Editable document tree
//!
//! An arena of element, text and raw markup nodes. Raw nodes hold HTML that
//! is kept as an opaque string: it is serialized back verbatim and never
//! parsed. Removed nodes stay in the arena, detached, so ids held by
//! callers remain valid.

use std::fmt;

use oembed::escape_html;

use crate::{EditorError, Result};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "source", "wbr"];

/// Handle to a node of a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Document tree rooted at the editable element
///
/// Nodes are never freed: detached nodes keep their slot for the lifetime
/// of the document, so memory grows with every node created. Refilling a
/// container through [`Document::set_inner_html`] reuses its raw node and
/// does not allocate.
///
/// # Example
///
/// ```
/// use editor::Document;
///
/// let mut doc = Document::new();
/// let p = doc.create_element("p");
/// let text = doc.create_text("Hello");
/// doc.append_child(p, text).unwrap();
/// doc.append_child(doc.root(), p).unwrap();
///
/// assert_eq!(doc.inner_html(doc.root()), "<p>Hello</p>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an empty editable root
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("div");
        doc
    }

    /// The editable root
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn data(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes.get(node.0).ok_or(EditorError::UnknownNode(node))
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(node.0).ok_or(EditorError::UnknownNode(node))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached raw markup node
    pub fn create_raw(&mut self, html: &str) -> NodeId {
        self.push(NodeKind::Raw(html.to_string()))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Parent of `node`, if attached to one
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).ok().and_then(|d| d.parent)
    }

    /// Children of `node`
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `node` among its siblings
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// Whether `node` is reachable from the root
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors(node).last().copied() == Some(self.root)
    }

    /// `node` followed by its ancestors, nearest first
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.data(node).ok().map(|_| node);
        while let Some(n) = current {
            chain.push(n);
            current = self.parent(n);
        }
        chain
    }

    /// Whether `ancestor` is `node` or contains it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Ancestor of `node` that is a direct child of the root
    pub fn top_level_ancestor(&self, node: NodeId) -> Option<NodeId> {
        let chain = self.ancestors(node);
        let root_pos = chain.iter().position(|&n| n == self.root)?;
        if root_pos == 0 {
            None
        } else {
            Some(chain[root_pos - 1])
        }
    }

    /// Insert `child` at `index` in `parent`, detaching it first
    ///
    /// `index` counts the children of `parent` once `child` is out of the
    /// way. Nothing moves when the insertion is refused.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if !self.is_element(parent) {
            self.data(parent)?;
            return Err(EditorError::InvalidRange(format!(
                "{} is not an element and cannot hold children",
                parent
            )));
        }
        self.data(child)?;
        if self.contains(child, parent) {
            return Err(EditorError::InvalidRange(format!(
                "{} cannot be inserted into its own subtree",
                child
            )));
        }

        let siblings = self.children(parent);
        let available = siblings.len() - usize::from(siblings.contains(&child));
        if index > available {
            return Err(EditorError::InvalidRange(format!(
                "index {} beyond {} children",
                index, available
            )));
        }

        self.detach(child)?;
        self.data_mut(parent)?.children.insert(index, child);
        self.data_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append `child` to `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Remove `node` from its parent; the node and its subtree survive detached
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        if let Some(parent) = self.data(node)?.parent {
            self.data_mut(parent)?.children.retain(|&c| c != node);
            self.data_mut(node)?.parent = None;
        }
        Ok(())
    }

    /// Remove `node` from the tree
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(EditorError::InvalidRange("the root cannot be removed".to_string()));
        }
        if self.parent(node).is_none() {
            return Err(EditorError::Detached(node));
        }
        self.detach(node)
    }

    /// Replace all children of `node` with one raw markup node
    ///
    /// When `node` already holds a single raw node, that node is rewritten
    /// in place instead of allocating a new one.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()> {
        let children = self.children(node);
        if children.len() == 1 {
            let only = children[0];
            if let NodeKind::Raw(markup) = &mut self.data_mut(only)?.kind {
                *markup = html.to_string();
                return Ok(());
            }
        }
        for child in self.children(node).to_vec() {
            self.detach(child)?;
        }
        let raw = self.create_raw(html);
        self.append_child(node, raw)
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Whether `node` is an element
    pub fn is_element(&self, node: NodeId) -> bool {
        self.tag(node).is_some()
    }

    /// Tag name of an element node
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.data(node).ok()?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value of an element node
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.data(node).ok()?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, keeping its position when it already exists
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| k == name) {
                    Some((_, v)) => *v = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            _ => Err(EditorError::InvalidRange(format!("{} is not an element", node))),
        }
    }

    /// Whether `node` is an element with exactly this `class` attribute
    pub fn has_class_name(&self, node: NodeId, class_name: &str) -> bool {
        self.attribute(node, "class") == Some(class_name)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Concatenated text of `node` and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Ok(data) = self.data(node) else { return };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Raw(html) => out.push_str(&strip_tags(html)),
            NodeKind::Element { .. } => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serialized children of `node`
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialized `node`
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Ok(data) = self.data(node) else { return };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Raw(html) => out.push_str(html),
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &data.children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    /// Merge adjacent text children of `node` and drop empty ones
    pub fn normalize(&mut self, node: NodeId) -> Result<()> {
        let children = self.children(node).to_vec();
        let mut previous_text: Option<NodeId> = None;

        for child in children {
            let text = match &self.data(child)?.kind {
                NodeKind::Text(text) => Some(text.clone()),
                _ => None,
            };
            match (text, previous_text) {
                (Some(text), _) if text.is_empty() => self.detach(child)?,
                (Some(text), Some(prev)) => {
                    if let NodeKind::Text(existing) = &mut self.data_mut(prev)?.kind {
                        existing.push_str(&text);
                    }
                    self.detach(child)?;
                }
                (Some(_), None) => previous_text = Some(child),
                (None, _) => previous_text = None,
            }
        }
        Ok(())
    }

    /// Number of nodes allocated so far, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
