#![forbid(unsafe_code)]

//! Core: geometry, canonical input events, and the view transform.
//!
//! Everything in this crate is canvas-space math with no storage or layout
//! dependencies. Coordinates are f64 canvas units unless a function says
//! otherwise; screen units are device pixels.

pub mod camera;
pub mod event;
pub mod geometry;

pub use camera::{Camera, MinimapProjection};
pub use event::{KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use geometry::{Point, Rect, Size, Vec2};
