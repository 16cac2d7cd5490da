//! Placing resolved media into the document
//!
//! Embeds live in `div` containers marked with [`CONTAINER_CLASS`]. The
//! source URL is kept in the container's [`DATA_URL_ATTR`] attribute, which
//! is the only state an embed carries.

use oembed::MediaResult;

use crate::document::NodeId;
use crate::host::EditorHost;
use crate::selection::Range;
use crate::{EditorError, Result};

/// Class marking embed containers
pub const CONTAINER_CLASS: &str = "minislate-oembed-container";

/// Attribute holding the source URL of a container
pub const DATA_URL_ATTR: &str = "data-url";

/// Where resolved media goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionTarget {
    /// Update an existing container
    Existing(NodeId),
    /// Create a container at this range, replacing its contents
    Fresh(Range),
}

/// Insert `result` for `source_url` at `target`
///
/// A `None` result removes an existing container and inserts nothing. The
/// toolbar is shown again in every case. Returns the container holding the
/// media, if any.
pub fn insert<H>(
    host: &mut H,
    target: InsertionTarget,
    source_url: &str,
    result: Option<&MediaResult>,
) -> Result<Option<NodeId>>
where
    H: EditorHost + ?Sized,
{
    let outcome = place(host, target, source_url, result);
    host.show_toolbar();
    outcome
}

fn place<H>(
    host: &mut H,
    target: InsertionTarget,
    source_url: &str,
    result: Option<&MediaResult>,
) -> Result<Option<NodeId>>
where
    H: EditorHost + ?Sized,
{
    let Some(result) = result else {
        if let InsertionTarget::Existing(node) = target {
            tracing::debug!("Removing embed container {}", node);
            host.document_mut().remove(node)?;
        }
        return Ok(None);
    };

    let node = match target {
        InsertionTarget::Existing(node) => {
            host.document_mut().set_attribute(node, DATA_URL_ATTR, source_url)?;
            host.set_range(node)?;
            node
        }
        InsertionTarget::Fresh(range) => {
            let doc = host.document_mut();
            let mut range = range.to_element_range(doc)?;
            let node = doc.create_element("div");
            doc.set_attribute(node, DATA_URL_ATTR, source_url)?;
            doc.set_attribute(node, "class", CONTAINER_CLASS)?;
            range.delete_contents(doc)?;
            range.insert_node(doc, node)?;

            let parent = doc.parent(node).ok_or(EditorError::Detached(node))?;
            host.clean_block(parent)?;
            host.set_range(node)?;
            tracing::debug!("Created embed container {} for {}", node, source_url);
            node
        }
    };

    populate(host, node, result)?;
    Ok(Some(node))
}

fn populate<H>(host: &mut H, node: NodeId, result: &MediaResult) -> Result<()>
where
    H: EditorHost + ?Sized,
{
    let doc = host.document_mut();
    match result {
        MediaResult::Image { src } => {
            let img = doc.create_element("img");
            doc.set_attribute(img, "src", src)?;
            doc.append_child(node, img)
        }
        MediaResult::Markup { html } => doc.set_inner_html(node, html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InlineEditor;

    fn markup(html: &str) -> MediaResult {
        MediaResult::Markup {
            html: html.to_string(),
        }
    }

    fn editor_with_text(text: &str) -> (InlineEditor, NodeId) {
        let mut editor = InlineEditor::new();
        let doc = editor.document_mut();
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        doc.append_child(p, t).unwrap();
        let root = doc.root();
        doc.append_child(root, p).unwrap();
        (editor, p)
    }

    fn append_embed(editor: &mut InlineEditor, url: &str, html: &str) -> NodeId {
        let root = editor.document().root();
        let target = InsertionTarget::Fresh(Range::end_of(editor.document(), root));
        insert(editor, target, url, Some(&markup(html))).unwrap().unwrap()
    }

    #[test]
    fn test_fresh_container_replaces_selection() {
        let (mut editor, p) = editor_with_text("selected");
        let root = editor.document().root();
        let target = InsertionTarget::Fresh(Range::select_node(editor.document(), p).unwrap());

        let node = insert(&mut editor, target, "youtube.com/watch?v=abc", Some(&markup("<iframe></iframe>")))
            .unwrap()
            .unwrap();

        assert_eq!(
            editor.html(),
            r#"<div data-url="youtube.com/watch?v=abc" class="minislate-oembed-container"><iframe></iframe></div>"#
        );
        assert_eq!(editor.document().parent(node), Some(root));
        assert_eq!(editor.range(), Some(Range::new(root, 0, 1)));
        assert!(editor.toolbar_visible());
    }

    #[test]
    fn test_fresh_container_inside_paragraph_is_lifted() {
        let (mut editor, p) = editor_with_text("");
        let text = editor.document().children(p)[0];
        let target = InsertionTarget::Fresh(Range::select_node(editor.document(), text).unwrap());

        let image = MediaResult::Image {
            src: "http://x/y.png".to_string(),
        };
        let node = insert(&mut editor, target, "https://flickr.com/p/1", Some(&image))
            .unwrap()
            .unwrap();

        let doc = editor.document();
        assert_eq!(doc.parent(node), Some(doc.root()));
        assert_eq!(
            editor.html(),
            r#"<div data-url="https://flickr.com/p/1" class="minislate-oembed-container"><img src="http://x/y.png"></div>"#
        );
    }

    #[test]
    fn test_caret_inside_text_keeps_container_visible() {
        let (mut editor, p) = editor_with_text("hello");
        let text = editor.document().children(p)[0];
        let caret = InsertionTarget::Fresh(Range::collapsed(text, 0));

        let node = insert(&mut editor, caret, "youtube.com/watch?v=abc", Some(&markup("<iframe></iframe>")))
            .unwrap()
            .unwrap();

        let doc = editor.document();
        assert!(doc.is_attached(node));
        assert_eq!(doc.parent(node), Some(doc.root()));
        assert_eq!(
            editor.html(),
            r#"<div data-url="youtube.com/watch?v=abc" class="minislate-oembed-container"><iframe></iframe></div><p>hello</p>"#
        );
    }

    #[test]
    fn test_caret_after_text_splits_paragraph() {
        let (mut editor, p) = editor_with_text("hello");
        let root = editor.document().root();
        let text = editor.document().children(p)[0];
        let caret = InsertionTarget::Fresh(Range::collapsed(text, 5));

        let node = insert(&mut editor, caret, "https://vimeo.com/1", Some(&markup("<b>v</b>")))
            .unwrap()
            .unwrap();

        assert_eq!(
            editor.html(),
            r#"<p>hello</p><div data-url="https://vimeo.com/1" class="minislate-oembed-container"><b>v</b></div>"#
        );
        assert_eq!(editor.range(), Some(Range::new(root, 1, 2)));
        assert!(editor.document().is_attached(node));
    }

    #[test]
    fn test_existing_container_is_updated() {
        let (mut editor, _) = editor_with_text("before");
        let root = editor.document().root();
        let first = append_embed(&mut editor, "https://vimeo.com/1", "<b>one</b>");
        editor.select(None);
        editor.hide_toolbar();

        let second = insert(
            &mut editor,
            InsertionTarget::Existing(first),
            "https://vimeo.com/2",
            Some(&markup("<b>two</b>")),
        )
        .unwrap();

        assert_eq!(second, Some(first));
        let doc = editor.document();
        assert_eq!(doc.attribute(first, DATA_URL_ATTR), Some("https://vimeo.com/2"));
        assert_eq!(doc.inner_html(first), "<b>two</b>");
        assert_eq!(editor.range(), Some(Range::new(root, 1, 2)));
        assert!(editor.toolbar_visible());
    }

    #[test]
    fn test_image_appended_to_existing_content() {
        let (mut editor, _) = editor_with_text("x");
        let node = append_embed(&mut editor, "https://flickr.com/p/1", "<i>old</i>");

        let image = MediaResult::Image {
            src: "http://x/new.png".to_string(),
        };
        insert(&mut editor, InsertionTarget::Existing(node), "https://flickr.com/p/2", Some(&image))
            .unwrap();

        assert_eq!(
            editor.document().inner_html(node),
            r#"<i>old</i><img src="http://x/new.png">"#
        );
    }

    #[test]
    fn test_none_removes_existing_container() {
        let (mut editor, _) = editor_with_text("keep");
        let node = append_embed(&mut editor, "https://vimeo.com/1", "<b>media</b>");
        editor.hide_toolbar();

        let removed = insert(&mut editor, InsertionTarget::Existing(node), "", None).unwrap();

        assert_eq!(removed, None);
        assert_eq!(editor.html(), "<p>keep</p>");
        assert!(!editor.document().is_attached(node));
        assert!(editor.toolbar_visible());
    }

    #[test]
    fn test_none_on_fresh_target_changes_nothing() {
        let (mut editor, p) = editor_with_text("keep");
        let target = InsertionTarget::Fresh(Range::select_node(editor.document(), p).unwrap());

        assert_eq!(insert(&mut editor, target, "", None).unwrap(), None);
        assert_eq!(editor.html(), "<p>keep</p>");
        assert!(editor.toolbar_visible());
    }

    #[test]
    fn test_failure_still_shows_toolbar() {
        let mut editor = InlineEditor::new();
        let orphan = editor.document_mut().create_element("div");

        let err = insert(&mut editor, InsertionTarget::Existing(orphan), "", None).unwrap_err();
        assert_eq!(err, EditorError::Detached(orphan));
        assert!(editor.toolbar_visible());
    }
}
