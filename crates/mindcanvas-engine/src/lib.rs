#![forbid(unsafe_code)]

//! The stateful canvas engine.
//!
//! [`Canvas`] ties the pieces together: it owns the document (through a
//! [`NodeStore`](mindcanvas_model::NodeStore) backend), the current
//! [`Scene`](mindcanvas_layout::Scene), the camera, selection and hover,
//! the drag/pan gesture machine, the inline text editor, bounded undo/redo,
//! and the clipboard. The host feeds it canonical input events and redraws
//! from the scene; the engine never draws anything itself.

pub mod canvas;
pub mod clipboard;
pub mod edit;
pub mod observer;
pub mod undo;

pub use canvas::{Canvas, DRAG_THRESHOLD};
pub use clipboard::Clipboard;
pub use edit::{CURSOR_BLINK_MS, EditSession};
pub use observer::CanvasObserver;
pub use undo::{UndoAction, UndoHistory};
