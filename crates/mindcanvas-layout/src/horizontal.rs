#![forbid(unsafe_code)]

//! Horizontal tree layout: root on the left, subtrees fanning right.
//!
//! Each child column starts `HORIZONTAL_SPACING` past its parent's right
//! edge. Sibling subtrees stack vertically, and the block of children is
//! centered on the parent, so a single child sits level with it.

use crate::scene::{PlacedNode, Scene};
use crate::tree::TreeIndex;
use crate::{HORIZONTAL_SPACING, NODE_HEIGHT, VERTICAL_SPACING, measure_node};
use mindcanvas_core::{Point, Rect};
use mindcanvas_model::Node;

pub(crate) fn layout(tree: &TreeIndex<'_>, auto: bool, scene: &mut Scene) {
    let Some(root) = tree.root() else { return };
    place(tree, root, 0, 0.0, 0.0, auto, scene);
}

/// Vertical room a subtree needs, including its trailing gap.
fn subtree_height(tree: &TreeIndex<'_>, node: &Node) -> f64 {
    let floor = NODE_HEIGHT + VERTICAL_SPACING;
    let total: f64 = tree
        .visible_children(node)
        .map(|child| subtree_height(tree, child))
        .sum();
    if total == 0.0 { floor } else { total.max(floor) }
}

fn place(
    tree: &TreeIndex<'_>,
    node: &Node,
    depth: usize,
    parent_right: f64,
    y_offset: f64,
    auto: bool,
    scene: &mut Scene,
) {
    let is_root = depth == 0;
    let size = measure_node(&node.text, is_root);

    let fallback = if is_root {
        Point::new(-size.width / 2.0, -size.height / 2.0)
    } else {
        Point::new(parent_right + HORIZONTAL_SPACING, y_offset)
    };
    // Auto mode ignores saved positions for everything but the root.
    let origin = if !is_root && auto {
        fallback
    } else {
        node.position.unwrap_or(fallback)
    };

    let rect = Rect::new(origin.x, origin.y, size.width, size.height);
    scene.push(PlacedNode {
        node: node.clone(),
        rect,
        angle: 0.0,
    });

    let children: Vec<&Node> = tree.visible_children(node).collect();
    if children.is_empty() {
        return;
    }

    let total: f64 = children
        .iter()
        .map(|child| subtree_height(tree, child))
        .sum();
    let mut child_y = rect.y + rect.height / 2.0 - total / 2.0;
    for child in children {
        let height = subtree_height(tree, child);
        place(
            tree,
            child,
            depth + 1,
            rect.right(),
            child_y + height / 2.0 - NODE_HEIGHT / 2.0,
            auto,
            scene,
        );
        child_y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::node;
    use crate::{NODE_MIN_WIDTH, ROOT_HEIGHT, ROOT_MIN_WIDTH, compute_layout};
    use mindcanvas_model::{LayoutMode, NodeId};

    #[test]
    fn root_defaults_to_centered_on_origin() {
        let nodes = vec![node(1, None, "root", 0)];
        let scene = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let r = scene.rect_of(NodeId(1)).unwrap();
        assert_eq!(r, Rect::new(-ROOT_MIN_WIDTH / 2.0, -ROOT_HEIGHT / 2.0, ROOT_MIN_WIDTH, ROOT_HEIGHT));
        assert_eq!(r.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn single_child_sits_level_with_parent() {
        let nodes = vec![node(1, None, "root", 0), node(2, Some(1), "a", 0)];
        let scene = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let root = scene.rect_of(NodeId(1)).unwrap();
        let child = scene.rect_of(NodeId(2)).unwrap();
        assert_eq!(child.x, root.right() + HORIZONTAL_SPACING);
        assert_eq!(child.center().y, root.center().y);
        assert_eq!(child.width, NODE_MIN_WIDTH);
    }

    #[test]
    fn two_children_split_symmetrically() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(1), "b", 1),
        ];
        let scene = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let a = scene.rect_of(NodeId(2)).unwrap();
        let b = scene.rect_of(NodeId(3)).unwrap();
        // Sibling order maps to top-to-bottom.
        assert!(a.center().y < b.center().y);
        // Block centered on the root (center y 0).
        assert!((a.center().y + b.center().y).abs() < 1e-9);
        assert!(b.y - a.bottom() >= VERTICAL_SPACING - 1e-9);
    }

    #[test]
    fn collapsed_subtree_is_not_placed() {
        let mut nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "hidden", 0),
        ];
        nodes[1].is_collapsed = true;
        let scene = compute_layout(&nodes, LayoutMode::Horizontal, true);
        assert!(scene.get(NodeId(3)).is_none());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn grandchildren_advance_one_column() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "b", 0),
        ];
        let scene = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let a = scene.rect_of(NodeId(2)).unwrap();
        let b = scene.rect_of(NodeId(3)).unwrap();
        assert_eq!(b.x, a.right() + HORIZONTAL_SPACING);
    }

    #[test]
    fn manual_mode_keeps_unpinned_fallback_slots() {
        // Without any pins, manual layout matches the auto shape.
        let nodes = vec![node(1, None, "root", 0), node(2, Some(1), "a", 0)];
        let auto = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let manual = compute_layout(&nodes, LayoutMode::Horizontal, false);
        assert_eq!(
            auto.rect_of(NodeId(2)).unwrap(),
            manual.rect_of(NodeId(2)).unwrap()
        );
    }

    #[test]
    fn subtree_height_has_leaf_floor() {
        let nodes = vec![node(1, None, "root", 0), node(2, Some(1), "a", 0)];
        let tree = TreeIndex::new(&nodes);
        let leaf = tree.node(NodeId(2)).unwrap();
        assert_eq!(subtree_height(&tree, leaf), NODE_HEIGHT + VERTICAL_SPACING);
    }
}
