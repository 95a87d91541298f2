#![forbid(unsafe_code)]

//! Radial layout: root centered, children on concentric rings.
//!
//! Each node gets an angular sector proportional to how many visible leaves
//! its subtree carries, and sits at the middle of that sector. Children
//! subdivide their parent's sector, so subtrees stay angularly coherent.

use crate::scene::{PlacedNode, Scene};
use crate::tree::TreeIndex;
use crate::{RADIAL_RADIUS_BASE, RADIAL_RADIUS_STEP, measure_node};
use mindcanvas_core::{Point, Rect};
use mindcanvas_model::Node;
use std::f64::consts::{FRAC_PI_2, TAU};

pub(crate) fn layout(tree: &TreeIndex<'_>, auto: bool, scene: &mut Scene) {
    let Some(root) = tree.root() else { return };
    place(tree, root, 0, Point::new(0.0, 0.0), 0.0, TAU, auto, scene);
}

/// Visible leaves under a node; a collapsed node counts as one leaf.
fn count_leaves(tree: &TreeIndex<'_>, node: &Node) -> usize {
    let total: usize = tree
        .visible_children(node)
        .map(|child| count_leaves(tree, child))
        .sum();
    if total == 0 { 1 } else { total }
}

#[allow(clippy::too_many_arguments)]
fn place(
    tree: &TreeIndex<'_>,
    node: &Node,
    depth: usize,
    parent_center: Point,
    start_angle: f64,
    span: f64,
    auto: bool,
    scene: &mut Scene,
) {
    let is_root = depth == 0;
    let size = measure_node(&node.text, is_root);
    let half_w = size.width / 2.0;
    let half_h = size.height / 2.0;

    // The root honors its saved position in both modes; other nodes only
    // when auto layout is off.
    let pinned = if is_root || !auto { node.position } else { None };
    let origin = pinned.unwrap_or_else(|| {
        if is_root {
            return Point::new(-half_w, -half_h);
        }
        let radius = RADIAL_RADIUS_BASE + RADIAL_RADIUS_STEP * (depth as f64 - 1.0);
        let mid = start_angle + span / 2.0;
        Point::new(
            parent_center.x + radius * mid.cos() - half_w,
            parent_center.y + radius * mid.sin() - half_h,
        )
    });
    let center = Point::new(origin.x + half_w, origin.y + half_h);

    let rect = Rect::new(origin.x, origin.y, size.width, size.height);
    scene.push(PlacedNode {
        node: node.clone(),
        rect,
        angle: if is_root { 0.0 } else { start_angle + span / 2.0 },
    });

    let children: Vec<&Node> = tree.visible_children(node).collect();
    if children.is_empty() {
        return;
    }

    let total_leaves: usize = children
        .iter()
        .map(|child| count_leaves(tree, child))
        .sum();

    // The root hands out the full circle starting at twelve o'clock;
    // everyone else subdivides their own sector.
    let (mut child_start, full_span) = if is_root {
        (-FRAC_PI_2, TAU)
    } else {
        (start_angle, span)
    };

    for child in children {
        let leaves = count_leaves(tree, child);
        let child_span = full_span * (leaves as f64 / total_leaves as f64);
        place(
            tree,
            child,
            depth + 1,
            center,
            child_start,
            child_span,
            auto,
            scene,
        );
        child_start += child_span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_layout;
    use crate::tests::node;
    use mindcanvas_model::{LayoutMode, NodeId};

    const EPS: f64 = 1e-9;

    #[test]
    fn two_children_land_opposite() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(1), "b", 1),
        ];
        let scene = compute_layout(&nodes, LayoutMode::Radial, true);
        // Equal leaf weight: sectors of pi each, mid angles at 0 and pi.
        let a = scene.rect_of(NodeId(2)).unwrap().center();
        let b = scene.rect_of(NodeId(3)).unwrap().center();
        assert!((a.x - RADIAL_RADIUS_BASE).abs() < EPS);
        assert!(a.y.abs() < EPS);
        assert!((b.x + RADIAL_RADIUS_BASE).abs() < EPS);
        assert!(b.y.abs() < EPS);
    }

    #[test]
    fn grandchildren_sit_on_the_next_ring() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "b", 0),
        ];
        let scene = compute_layout(&nodes, LayoutMode::Radial, true);
        let child = scene.rect_of(NodeId(2)).unwrap().center();
        let grandchild = scene.rect_of(NodeId(3)).unwrap().center();
        let ring = child.distance(grandchild);
        assert!((ring - (RADIAL_RADIUS_BASE + RADIAL_RADIUS_STEP)).abs() < EPS);
    }

    #[test]
    fn heavier_subtree_gets_wider_sector() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "heavy", 0),
            node(3, Some(1), "light", 1),
            node(4, Some(2), "l1", 0),
            node(5, Some(2), "l2", 1),
            node(6, Some(2), "l3", 2),
        ];
        let scene = compute_layout(&nodes, LayoutMode::Radial, true);
        // heavy has 3 leaves, light 1: sectors 3/4 tau vs 1/4 tau.
        let heavy = scene.get(NodeId(2)).unwrap();
        let light = scene.get(NodeId(3)).unwrap();
        assert!((heavy.angle - (-FRAC_PI_2 + 0.75 * TAU / 2.0)).abs() < EPS);
        assert!((light.angle - (-FRAC_PI_2 + 0.75 * TAU + 0.25 * TAU / 2.0)).abs() < EPS);
    }

    #[test]
    fn collapsed_child_counts_as_single_leaf() {
        let mut nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "a1", 0),
            node(4, Some(2), "a2", 1),
            node(5, Some(1), "b", 1),
        ];
        nodes[1].is_collapsed = true;
        let scene = compute_layout(&nodes, LayoutMode::Radial, true);
        // With a collapsed, both children weigh one leaf each.
        let a = scene.get(NodeId(2)).unwrap();
        let b = scene.get(NodeId(5)).unwrap();
        assert!((a.angle - 0.0).abs() < EPS);
        assert!(((b.angle - std::f64::consts::PI).abs()) < EPS);
        assert!(scene.get(NodeId(3)).is_none());
    }

    #[test]
    fn pinned_node_keeps_position_and_anchors_children() {
        let mut nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "b", 0),
        ];
        nodes[1].position = Some(Point::new(1000.0, 1000.0));
        let scene = compute_layout(&nodes, LayoutMode::Radial, false);
        let a = scene.rect_of(NodeId(2)).unwrap();
        assert_eq!(a.origin(), Point::new(1000.0, 1000.0));
        // The grandchild radiates from the pinned center, not the auto slot.
        let b = scene.rect_of(NodeId(3)).unwrap().center();
        let ring = a.center().distance(b);
        assert!((ring - (RADIAL_RADIUS_BASE + RADIAL_RADIUS_STEP)).abs() < EPS);
    }
}
