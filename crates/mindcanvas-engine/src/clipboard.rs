#![forbid(unsafe_code)]

//! Subtree clipboard.
//!
//! Copy takes a snapshot of the node records, so later edits or deletion of
//! the source do not affect what paste produces. Paste re-creates the
//! subtree through the store with fresh ids.

use mindcanvas_model::{Node, NodeId};

/// A copied subtree: the top node plus all descendants, as captured records.
#[derive(Debug, Clone)]
pub struct Clipboard {
    /// The copied node itself.
    pub top: Node,
    /// Every node of the subtree including `top`, parents before children.
    pub subtree: Vec<Node>,
}

impl Clipboard {
    /// Capture a subtree. `subtree` must contain `top` and its descendants.
    #[must_use]
    pub fn new(top: Node, subtree: Vec<Node>) -> Self {
        Self { top, subtree }
    }

    /// Children of `id` within the captured snapshot, in sibling order.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        let mut kids: Vec<&Node> = self
            .subtree
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .collect();
        kids.sort_by_key(|n| (n.sort_order, n.id));
        kids.into_iter()
    }
}
