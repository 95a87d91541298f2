#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The host application translates its windowing toolkit's events into these
//! before feeding them to the engine, so the engine has no compile-time
//! dependency on any UI framework.
//!
//! # Design Notes
//!
//! - Pointer positions are screen pixels; the engine inverse-transforms them
//!   through the [`Camera`](crate::camera::Camera) for hit testing.
//! - `Modifiers` use bitflags for easy combination.
//! - Double clicks arrive as `clicks: 2` on `Pressed`, matching how desktop
//!   toolkits report press counts.

use crate::geometry::Point;
use bitflags::bitflags;

/// A pointer (mouse/trackpad) event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A button was pressed. `clicks` is the press count (2 = double click).
    Pressed {
        pos: Point,
        button: PointerButton,
        clicks: u8,
    },
    /// The pointer moved (with or without a button held).
    Moved { pos: Point },
    /// A button was released.
    Released { pos: Point, button: PointerButton },
    /// Scroll wheel movement. Negative `delta_y` scrolls up.
    Wheel {
        pos: Point,
        delta_y: f64,
        modifiers: Modifiers,
    },
    /// The pointer left the canvas.
    Left,
}

/// Pointer buttons the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button: select, drag, edit.
    Primary,
    /// Right button: context actions.
    Secondary,
    /// Middle button (unused by the engine, forwarded for completeness).
    Middle,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Shift is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes the engine reacts to.
///
/// Printable input arrives as `Char`; anything the engine does not recognize
/// should simply not be forwarded (the engine returns `false` for unhandled
/// keys either way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character key (includes space).
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    F2,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_builders() {
        let ev = KeyEvent::new(KeyCode::Char('z')).with_modifiers(Modifiers::CTRL);
        assert!(ev.ctrl());
        assert!(!ev.shift());
        assert_eq!(ev.code, KeyCode::Char('z'));
    }

    #[test]
    fn modifiers_combine() {
        let m = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(m.contains(Modifiers::CTRL));
        assert!(m.contains(Modifiers::SHIFT));
        assert!(!m.contains(Modifiers::ALT));
    }

    #[test]
    fn default_modifiers_are_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
