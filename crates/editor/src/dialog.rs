//! URL dialog of the embed control

use crate::control::{OembedControl, SaveOutcome};
use crate::document::NodeId;
use crate::host::EditorHost;
use crate::selection::SavedSelection;
use crate::sink::DATA_URL_ATTR;

/// Dialog asking for the URL of an embed
///
/// Opening the dialog captures the editor selection; every way of leaving
/// it puts that selection back before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OembedDialog {
    node: Option<NodeId>,
    selection: SavedSelection,
    input: String,
}

impl OembedDialog {
    /// Open the dialog for `node`, or for a new embed
    pub fn open<H>(host: &mut H, node: Option<NodeId>) -> Self
    where
        H: EditorHost + ?Sized,
    {
        let selection = host.save_selection();
        host.hide_toolbar();
        let input = node
            .and_then(|n| host.document().attribute(n, DATA_URL_ATTR))
            .unwrap_or_default()
            .to_string();
        Self {
            node,
            selection,
            input,
        }
    }

    /// Container being edited
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Current URL field value
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Type into the URL field
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Whether a Remove button is offered
    pub fn has_remove_button(&self) -> bool {
        self.node.is_some()
    }

    /// Close without saving
    pub fn escape<H>(self, host: &mut H)
    where
        H: EditorHost + ?Sized,
    {
        host.restore_selection(&self.selection);
        host.show_toolbar();
    }

    /// Save the typed URL (Enter or the Save button)
    pub async fn submit<H>(self, control: &OembedControl, host: &mut H) -> SaveOutcome
    where
        H: EditorHost + ?Sized,
    {
        host.restore_selection(&self.selection);
        control.save_oembed(host, self.node, Some(&self.input)).await
    }

    /// Remove the edited container; `None` when editing a new embed
    pub async fn remove<H>(self, control: &OembedControl, host: &mut H) -> Option<SaveOutcome>
    where
        H: EditorHost + ?Sized,
    {
        let node = self.node?;
        host.restore_selection(&self.selection);
        Some(control.save_oembed(host, Some(node), None).await)
    }
}
