#![forbid(unsafe_code)]

//! Listener seam between the engine and its host.

use mindcanvas_model::Node;

/// Notifications the engine emits as side effects of operations.
///
/// All methods default to no-ops so hosts implement only what they need.
/// The engine calls these after its own state is consistent, so handlers
/// may read back through the canvas accessors.
pub trait CanvasObserver {
    /// Selection changed. `None` means the selection was cleared.
    fn node_selected(&mut self, _node: Option<&Node>) {}

    /// A node's text was committed from an edit session.
    fn node_edited(&mut self, _node: &Node) {}

    /// Nodes were created, deleted, reparented, or restored.
    fn structure_changed(&mut self) {}

    /// A note was written through to storage.
    fn note_saved(&mut self, _node: &Node) {}
}
