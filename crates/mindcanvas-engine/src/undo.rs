#![forbid(unsafe_code)]

//! Bounded undo/redo history.
//!
//! Actions are full snapshots, not diffs: a delete carries every node of the
//! removed subtree so undo can restore it id-preserving, and a create
//! carries the created records so redo after an undo brings back the same
//! ids. History is deliberately short (5 + 5); pushing while over capacity
//! drops the oldest entry.

use mindcanvas_core::Point;
use mindcanvas_model::{MapId, Node, NodeId, NodeStyle};
use std::collections::VecDeque;

/// Default undo capacity.
pub const MAX_UNDO: usize = 5;
/// Default redo capacity.
pub const MAX_REDO: usize = 5;

/// One undoable operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// Nodes were created. `nodes` holds the created records, parents before
    /// children (a single create has one entry; a paste has the whole
    /// subtree). Undo deletes the first entry (cascading); redo restores
    /// every record under its original id.
    Create { nodes: Vec<Node> },
    /// A subtree was deleted. Same layout as `Create`, inverted.
    Delete { nodes: Vec<Node> },
    /// A node's text changed.
    EditText {
        node_id: NodeId,
        old_text: String,
        new_text: String,
    },
    /// A node was reparented or reordered.
    Move {
        node_id: NodeId,
        old_parent: Option<NodeId>,
        new_parent: Option<NodeId>,
        old_sort_order: i64,
        new_sort_order: i64,
    },
    /// A node's style was replaced.
    Style {
        node_id: NodeId,
        old_style: NodeStyle,
        new_style: NodeStyle,
    },
    /// Auto-balance: every node's pinned position and the map's layout flag
    /// changed at once.
    Layout {
        map_id: MapId,
        old_auto_layout: bool,
        new_auto_layout: bool,
        old_positions: Vec<(NodeId, Option<Point>)>,
        new_positions: Vec<(NodeId, Option<Point>)>,
    },
}

impl UndoAction {
    /// Short human-readable label for menus.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            UndoAction::Create { .. } => "Create node",
            UndoAction::Delete { .. } => "Delete node",
            UndoAction::EditText { .. } => "Edit node text",
            UndoAction::Move { .. } => "Move node",
            UndoAction::Style { .. } => "Change node style",
            UndoAction::Layout { .. } => "Auto-balance layout",
        }
    }
}

/// Two bounded stacks with a re-entrancy guard.
///
/// While the engine is applying an undo or redo, `push` is a no-op, so the
/// store mutations made during application cannot record themselves as new
/// history.
#[derive(Debug, Default)]
pub struct UndoHistory {
    undo: VecDeque<UndoAction>,
    redo: VecDeque<UndoAction>,
    applying: bool,
}

impl UndoHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action. Clears the redo stack and trims the oldest undo
    /// entries past capacity. Ignored while an undo/redo is being applied.
    pub fn push(&mut self, action: UndoAction) {
        if self.applying {
            return;
        }
        self.undo.push_back(action);
        self.redo.clear();
        while self.undo.len() > MAX_UNDO {
            self.undo.pop_front();
        }
    }

    /// Pop the most recent action for undoing; it moves to the redo stack.
    pub fn pop_undo(&mut self) -> Option<UndoAction> {
        let action = self.undo.pop_back()?;
        self.redo.push_back(action.clone());
        while self.redo.len() > MAX_REDO {
            self.redo.pop_front();
        }
        Some(action)
    }

    /// Pop the most recent undone action for redoing; it moves back to the
    /// undo stack.
    pub fn pop_redo(&mut self) -> Option<UndoAction> {
        let action = self.redo.pop_back()?;
        self.undo.push_back(action.clone());
        while self.undo.len() > MAX_UNDO {
            self.undo.pop_front();
        }
        Some(action)
    }

    /// Mark the start/end of undo application; pushes are ignored inside.
    pub fn set_applying(&mut self, applying: bool) {
        self.applying = applying;
    }

    /// Whether an undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Label of the next undo, or `""`.
    #[must_use]
    pub fn undo_description(&self) -> &'static str {
        self.undo.back().map_or("", UndoAction::description)
    }

    /// Label of the next redo, or `""`.
    #[must_use]
    pub fn redo_description(&self) -> &'static str {
        self.redo.back().map_or("", UndoAction::description)
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(n: i64) -> UndoAction {
        UndoAction::EditText {
            node_id: NodeId(n),
            old_text: "old".to_string(),
            new_text: "new".to_string(),
        }
    }

    #[test]
    fn push_clears_redo() {
        let mut h = UndoHistory::new();
        h.push(edit(1));
        h.pop_undo().unwrap();
        assert!(h.can_redo());
        h.push(edit(2));
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_capacity_drops_oldest() {
        let mut h = UndoHistory::new();
        for i in 0..(MAX_UNDO as i64 + 3) {
            h.push(edit(i));
        }
        let mut popped = Vec::new();
        while let Some(a) = h.pop_undo() {
            popped.push(a);
        }
        assert_eq!(popped.len(), MAX_UNDO);
        // Newest first; the oldest three were discarded.
        assert_eq!(popped.first(), Some(&edit(MAX_UNDO as i64 + 2)));
        assert_eq!(popped.last(), Some(&edit(3)));
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut h = UndoHistory::new();
        h.push(edit(1));
        let a = h.pop_undo().unwrap();
        assert_eq!(a, edit(1));
        assert!(!h.can_undo());
        let b = h.pop_redo().unwrap();
        assert_eq!(b, edit(1));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn pushes_ignored_while_applying() {
        let mut h = UndoHistory::new();
        h.set_applying(true);
        h.push(edit(1));
        assert!(!h.can_undo());
        h.set_applying(false);
        h.push(edit(2));
        assert!(h.can_undo());
    }

    #[test]
    fn descriptions() {
        let mut h = UndoHistory::new();
        assert_eq!(h.undo_description(), "");
        h.push(edit(1));
        assert_eq!(h.undo_description(), "Edit node text");
        h.pop_undo();
        assert_eq!(h.redo_description(), "Edit node text");
    }
}
