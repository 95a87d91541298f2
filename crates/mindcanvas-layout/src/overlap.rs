#![forbid(unsafe_code)]

//! Overlap avoidance for manually arranged maps.
//!
//! The search walks concentric rings outward from the desired spot, probing
//! a fixed number of angles per ring. It is bounded: if every probe in
//! range collides, the desired position is returned unchanged rather than
//! pushing the node arbitrarily far away.

use crate::scene::Scene;
use mindcanvas_core::{Point, Rect, Size};
use mindcanvas_model::NodeId;
use std::f64::consts::TAU;

/// Minimum clearance kept between node boxes.
pub const OVERLAP_PADDING: f64 = 10.0;

const RING_STEP: f64 = 18.0;
const RING_LIMIT: usize = 60;
const PROBES_PER_RING: usize = 24;

/// Find a spot for a box of `size` near `desired` that keeps `padding`
/// clearance from every placed node (except `exclude`, normally the node
/// being placed itself).
#[must_use]
pub fn find_free_position(
    scene: &Scene,
    desired: Point,
    size: Size,
    exclude: Option<NodeId>,
    padding: f64,
) -> Point {
    let collides = |p: Point| {
        let candidate = Rect::new(p.x, p.y, size.width, size.height);
        scene
            .iter()
            .filter(|other| Some(other.node.id) != exclude)
            .any(|other| candidate.overlaps(&other.rect, padding))
    };

    if !collides(desired) {
        return desired;
    }

    for ring in 1..RING_LIMIT {
        let radius = ring as f64 * RING_STEP;
        for probe in 0..PROBES_PER_RING {
            let angle = TAU * (probe as f64 / PROBES_PER_RING as f64);
            let p = Point::new(
                desired.x + radius * angle.cos(),
                desired.y + radius * angle.sin(),
            );
            if !collides(p) {
                return p;
            }
        }
    }

    desired
}

/// Nudge auto-slotted nodes off any overlaps.
///
/// Pinned nodes and the root never move; each unpinned node is relocated in
/// draw order, checking against the scene as already adjusted, so earlier
/// fixes are visible to later ones.
pub(crate) fn resolve_unpinned(scene: &mut Scene) {
    let movable: Vec<NodeId> = scene
        .iter()
        .filter(|p| p.node.parent_id.is_some() && p.node.position.is_none())
        .map(|p| p.node.id)
        .collect();

    for id in movable {
        let Some(placed) = scene.get(id) else { continue };
        let desired = placed.rect.origin();
        let size = placed.rect.size();
        let free = find_free_position(scene, desired, size, Some(id), OVERLAP_PADDING);
        scene.set_origin(id, free);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PlacedNode;
    use crate::tests::node;
    use crate::{HORIZONTAL_SPACING, compute_layout};
    use mindcanvas_model::LayoutMode;

    fn one_box_scene() -> Scene {
        let mut s = Scene::default();
        s.push(PlacedNode {
            node: node(1, None, "root", 0),
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            angle: 0.0,
        });
        s
    }

    #[test]
    fn free_spot_is_returned_unchanged() {
        let s = one_box_scene();
        let p = find_free_position(
            &s,
            Point::new(300.0, 300.0),
            Size::new(100.0, 40.0),
            None,
            OVERLAP_PADDING,
        );
        assert_eq!(p, Point::new(300.0, 300.0));
    }

    #[test]
    fn colliding_spot_moves_to_clear_ground() {
        let s = one_box_scene();
        let size = Size::new(100.0, 40.0);
        let p = find_free_position(&s, Point::new(10.0, 10.0), size, None, OVERLAP_PADDING);
        assert_ne!(p, Point::new(10.0, 10.0));
        let landed = Rect::new(p.x, p.y, size.width, size.height);
        assert!(!landed.overlaps(&s.rect_of(mindcanvas_model::NodeId(1)).unwrap(), OVERLAP_PADDING));
    }

    #[test]
    fn exclude_skips_own_box() {
        let s = one_box_scene();
        // The only collision candidate is the node itself.
        let p = find_free_position(
            &s,
            Point::new(0.0, 0.0),
            Size::new(100.0, 40.0),
            Some(mindcanvas_model::NodeId(1)),
            OVERLAP_PADDING,
        );
        assert_eq!(p, Point::new(0.0, 0.0));
    }

    #[test]
    fn unpinned_node_is_nudged_off_a_pinned_one() {
        // Pin one child directly over the other's fallback slot.
        let mut nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(1), "b", 1),
        ];
        let auto = compute_layout(&nodes, LayoutMode::Horizontal, true);
        let b_slot = auto.rect_of(mindcanvas_model::NodeId(3)).unwrap().origin();
        nodes[1].position = Some(b_slot);

        let manual = compute_layout(&nodes, LayoutMode::Horizontal, false);
        let a = manual.rect_of(mindcanvas_model::NodeId(2)).unwrap();
        let b = manual.rect_of(mindcanvas_model::NodeId(3)).unwrap();
        assert_eq!(a.origin(), b_slot);
        assert_ne!(b.origin(), b_slot);
        assert!(!a.overlaps(&b, OVERLAP_PADDING));
        // Sanity: the pinned slot really is in the child column.
        assert!(b_slot.x > HORIZONTAL_SPACING);
    }
}
