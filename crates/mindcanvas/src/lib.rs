#![forbid(unsafe_code)]

//! Mindcanvas public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a
//! lightweight prelude. A host widget typically constructs a
//! [`Canvas`] over a [`NodeStore`] backend, feeds it [`PointerEvent`]s
//! and [`KeyEvent`]s, and redraws from the [`Scene`] and [`Camera`].

// --- Core re-exports -------------------------------------------------------

pub use mindcanvas_core::camera::{
    Camera, MAX_ZOOM, MIN_ZOOM, MinimapProjection, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_STEP,
};
pub use mindcanvas_core::event::{KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use mindcanvas_core::geometry::{Point, Rect, Size, Vec2};

// --- Model re-exports ------------------------------------------------------

pub use mindcanvas_model::{
    LayoutMode, MapId, MapSettings, MemoryStore, MindMap, Node, NodeId, NodeStore, NodeStyle,
    Priority, Status, StoreError,
};

// --- Layout re-exports -----------------------------------------------------

pub use mindcanvas_layout::{
    NODE_HEIGHT, NODE_MAX_WIDTH, NODE_MIN_WIDTH, PlacedNode, ROOT_HEIGHT, Scene, compute_layout,
    measure_node,
};

// --- Engine re-exports -----------------------------------------------------

pub use mindcanvas_engine::{
    CURSOR_BLINK_MS, Canvas, CanvasObserver, Clipboard, DRAG_THRESHOLD, EditSession, UndoAction,
    UndoHistory,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Camera, Canvas, CanvasObserver, KeyCode, KeyEvent, LayoutMode, MapId, MemoryStore,
        Modifiers, Node, NodeId, NodeStore, Point, PointerButton, PointerEvent, Rect, Scene, Size,
        StoreError, Vec2,
    };

    pub use crate::{core, engine, layout, model};
}

pub use mindcanvas_core as core;
pub use mindcanvas_engine as engine;
pub use mindcanvas_layout as layout;
pub use mindcanvas_model as model;
