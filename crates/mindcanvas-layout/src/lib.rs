#![forbid(unsafe_code)]

//! Layout: turns a flat node list into a positioned [`Scene`].
//!
//! [`compute_layout`] is a pure function of its inputs. It never writes to
//! storage and never mutates the nodes it is given, so the same document
//! always produces the same scene. The engine owns persistence of manual
//! positions as a separate step.
//!
//! Two algorithms are available: a horizontal tree (root on the left,
//! subtrees fanning right) and a radial one (root centered, children on
//! concentric rings). In manual mode, nodes carrying a saved position are
//! pinned there; unpinned nodes get their automatic slot and are then nudged
//! off any overlaps by a bounded spiral search.

pub mod overlap;
pub mod scene;
pub mod tree;

mod horizontal;
mod radial;

use mindcanvas_core::Size;
use mindcanvas_model::{LayoutMode, Node};

pub use overlap::{OVERLAP_PADDING, find_free_position};
pub use scene::{PlacedNode, Scene};
pub use tree::TreeIndex;

use unicode_width::UnicodeWidthStr;

/// Inner padding between node text and border, per side.
pub const NODE_PADDING: f64 = 16.0;
/// Minimum width of a non-root node.
pub const NODE_MIN_WIDTH: f64 = 120.0;
/// Maximum width of any node.
pub const NODE_MAX_WIDTH: f64 = 300.0;
/// Minimum width of the root node.
pub const ROOT_MIN_WIDTH: f64 = 160.0;
/// Height of a non-root node.
pub const NODE_HEIGHT: f64 = 40.0;
/// Height of the root node.
pub const ROOT_HEIGHT: f64 = 56.0;
/// Horizontal gap between a parent's right edge and its children.
pub const HORIZONTAL_SPACING: f64 = 60.0;
/// Vertical gap between sibling subtrees.
pub const VERTICAL_SPACING: f64 = 15.0;
/// Ring radius for the root's direct children in radial mode.
pub const RADIAL_RADIUS_BASE: f64 = 140.0;
/// Ring radius increment per depth level in radial mode.
pub const RADIAL_RADIUS_STEP: f64 = 120.0;

/// Approximate rendered width of one text column.
const CHAR_WIDTH: f64 = 9.0;

/// Size of a node's box, derived from its text.
///
/// Width tracks the display width of the text (so wide CJK glyphs count
/// double), clamped to the min/max for the node kind.
#[must_use]
pub fn measure_node(text: &str, is_root: bool) -> Size {
    let text_width = text.width() as f64 * CHAR_WIDTH + NODE_PADDING * 2.0;
    if is_root {
        Size::new(
            text_width.clamp(ROOT_MIN_WIDTH, NODE_MAX_WIDTH),
            ROOT_HEIGHT,
        )
    } else {
        Size::new(
            text_width.clamp(NODE_MIN_WIDTH, NODE_MAX_WIDTH),
            NODE_HEIGHT,
        )
    }
}

/// Lay out a document.
///
/// `nodes` is the full node list of one map. The first root in sibling
/// order anchors the tree; an empty list (or a list with no root) yields an
/// empty scene. Collapsed nodes contribute their own box but none of their
/// descendants.
#[must_use]
pub fn compute_layout(nodes: &[Node], mode: LayoutMode, auto_layout: bool) -> Scene {
    let tree = TreeIndex::new(nodes);
    let mut scene = Scene::default();
    if tree.root().is_none() {
        return scene;
    }

    match mode {
        LayoutMode::Horizontal => horizontal::layout(&tree, auto_layout, &mut scene),
        LayoutMode::Radial => radial::layout(&tree, auto_layout, &mut scene),
    }

    if !auto_layout {
        overlap::resolve_unpinned(&mut scene);
    }

    scene
}
