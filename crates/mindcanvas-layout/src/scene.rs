#![forbid(unsafe_code)]

//! The output of a layout pass: nodes with canvas-space boxes.

use mindcanvas_core::{Point, Rect, Vec2};
use mindcanvas_model::{Node, NodeId};
use std::collections::HashMap;

/// One node with its layout box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    /// Snapshot of the node record this box was computed from.
    pub node: Node,
    /// Canvas-space box.
    pub rect: Rect,
    /// Mid-angle of this node's sector in radial mode (radians). Zero for
    /// the root and for horizontal layouts.
    pub angle: f64,
}

/// A positioned document, in depth-first preorder (root first, each node
/// before its children).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    placed: Vec<PlacedNode>,
    index: HashMap<NodeId, usize>,
}

impl Scene {
    pub(crate) fn push(&mut self, placed: PlacedNode) {
        self.index.insert(placed.node.id, self.placed.len());
        self.placed.push(placed);
    }

    /// Number of placed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Placed nodes in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedNode> {
        self.placed.iter()
    }

    /// The root's placement, if the scene is non-empty.
    #[must_use]
    pub fn root(&self) -> Option<&PlacedNode> {
        self.placed.first()
    }

    /// Placement of a specific node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&PlacedNode> {
        self.index.get(&id).map(|&i| &self.placed[i])
    }

    /// Layout box of a specific node.
    #[must_use]
    pub fn rect_of(&self, id: NodeId) -> Option<Rect> {
        self.get(id).map(|p| p.rect)
    }

    /// The topmost node under a canvas-space point.
    ///
    /// Scans in reverse draw order so that when boxes overlap, the one
    /// drawn last (deepest in the tree) wins.
    #[must_use]
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        self.placed
            .iter()
            .rev()
            .find(|placed| placed.rect.contains(p))
            .map(|placed| placed.node.id)
    }

    /// Bounding box of all placed nodes, or `None` for an empty scene.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut iter = self.placed.iter();
        let first = iter.next()?.rect;
        Some(iter.fold(first, |acc, p| acc.union(&p.rect)))
    }

    /// Translate one node's box. This is the only mutation the engine
    /// applies between layout passes (live node dragging); everything else
    /// goes through a fresh [`compute_layout`](crate::compute_layout).
    pub fn apply_drag_delta(&mut self, id: NodeId, delta: Vec2) {
        if let Some(&i) = self.index.get(&id) {
            let r = &mut self.placed[i].rect;
            *r = r.translated(delta.dx, delta.dy);
        }
    }

    pub(crate) fn set_origin(&mut self, id: NodeId, origin: Point) {
        if let Some(&i) = self.index.get(&id) {
            let r = &mut self.placed[i].rect;
            *r = r.at(origin);
        }
    }

    /// Current top-left position of every placed node.
    pub fn positions(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.placed.iter().map(|p| (p.node.id, p.rect.origin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::node;

    fn placed(id: i64, rect: Rect) -> PlacedNode {
        PlacedNode {
            node: node(id, if id == 1 { None } else { Some(1) }, "n", id),
            rect,
            angle: 0.0,
        }
    }

    fn scene() -> Scene {
        let mut s = Scene::default();
        s.push(placed(1, Rect::new(0.0, 0.0, 100.0, 40.0)));
        s.push(placed(2, Rect::new(50.0, 10.0, 100.0, 40.0)));
        s
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let s = scene();
        // Both boxes cover (60, 20); the later one wins.
        assert_eq!(s.hit_test(Point::new(60.0, 20.0)), Some(NodeId(2)));
        assert_eq!(s.hit_test(Point::new(5.0, 5.0)), Some(NodeId(1)));
        assert_eq!(s.hit_test(Point::new(-50.0, -50.0)), None);
    }

    #[test]
    fn content_bounds_unions_all() {
        let s = scene();
        assert_eq!(s.content_bounds(), Some(Rect::new(0.0, 0.0, 150.0, 50.0)));
        assert_eq!(Scene::default().content_bounds(), None);
    }

    #[test]
    fn drag_delta_moves_one_box() {
        let mut s = scene();
        s.apply_drag_delta(NodeId(2), Vec2::new(10.0, -5.0));
        assert_eq!(s.rect_of(NodeId(2)), Some(Rect::new(60.0, 5.0, 100.0, 40.0)));
        assert_eq!(s.rect_of(NodeId(1)), Some(Rect::new(0.0, 0.0, 100.0, 40.0)));
    }

    #[test]
    fn drag_delta_on_missing_id_is_noop() {
        let mut s = scene();
        let before = s.clone();
        s.apply_drag_delta(NodeId(99), Vec2::new(10.0, 10.0));
        assert_eq!(s, before);
    }
}
