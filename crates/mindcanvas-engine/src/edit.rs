#![forbid(unsafe_code)]

//! Inline text edit session.
//!
//! One session exists while a node's text is being edited in place. The
//! cursor is a byte offset that always sits on a grapheme boundary, so
//! arrow keys and backspace treat complex emoji or combining marks as one
//! unit. Selection is an optional anchor; the selected range runs between
//! anchor and cursor in either direction.
//!
//! Placeholder mode covers freshly created nodes: the inherited text is
//! shown greyed out and the first typed character replaces all of it.

use mindcanvas_model::NodeId;
use unicode_segmentation::UnicodeSegmentation;

/// Cursor blink half-period in milliseconds. The host drives the timer and
/// calls [`EditSession::toggle_blink`] on each tick.
pub const CURSOR_BLINK_MS: u64 = 530;

/// In-progress text edit on one node.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    node_id: NodeId,
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    placeholder: bool,
    cursor_visible: bool,
}

impl EditSession {
    /// Start editing with the cursor at the end and nothing selected.
    #[must_use]
    pub fn new(node_id: NodeId, text: &str) -> Self {
        Self {
            node_id,
            cursor: text.len(),
            text: text.to_string(),
            anchor: None,
            placeholder: false,
            cursor_visible: true,
        }
    }

    /// Start editing with the whole text selected (double-click entry).
    #[must_use]
    pub fn with_select_all(node_id: NodeId, text: &str) -> Self {
        let mut s = Self::new(node_id, text);
        s.anchor = Some(0);
        s
    }

    /// Start editing in placeholder mode (fresh node).
    #[must_use]
    pub fn placeholder(node_id: NodeId, text: &str) -> Self {
        let mut s = Self::new(node_id, text);
        s.placeholder = true;
        s
    }

    /// Start editing seeded with a single typed character, replacing the
    /// node's text (type-to-edit entry).
    #[must_use]
    pub fn seeded(node_id: NodeId, c: char) -> Self {
        Self::new(node_id, &c.to_string())
    }

    /// The node being edited.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Current buffer contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position as a byte offset into [`text`](Self::text).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The selected byte range (start, end), if any text is selected.
    #[must_use]
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// Whether the buffer still holds untouched placeholder text.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Whether the cursor is currently in the visible blink phase.
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Flip the blink phase. Called by the host on its blink timer.
    /// Every edit or cursor move snaps the phase back to visible.
    pub fn toggle_blink(&mut self) {
        self.cursor_visible = !self.cursor_visible;
    }

    /// Insert a character at the cursor. Replaces the selection if one
    /// exists, or the whole buffer in placeholder mode.
    pub fn insert_char(&mut self, c: char) {
        self.cursor_visible = true;
        if self.selection().is_some() {
            self.delete_selection();
        }
        self.anchor = None;
        if self.placeholder {
            self.text = c.to_string();
            self.cursor = self.text.len();
            self.placeholder = false;
        } else {
            self.text.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    /// Delete the selection, or the grapheme before the cursor.
    pub fn backspace(&mut self) {
        self.cursor_visible = true;
        if self.selection().is_some() {
            self.delete_selection();
            return;
        }
        self.anchor = None;
        if self.cursor > 0 {
            let start = self.prev_boundary();
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    /// Delete the selection, or the grapheme after the cursor.
    pub fn delete_forward(&mut self) {
        self.cursor_visible = true;
        if self.selection().is_some() {
            self.delete_selection();
            return;
        }
        self.anchor = None;
        let end = self.next_boundary();
        if end > self.cursor {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    /// Move one grapheme left, clearing any selection.
    pub fn move_left(&mut self) {
        self.cursor_visible = true;
        self.anchor = None;
        self.cursor = self.prev_boundary();
    }

    /// Move one grapheme right, clearing any selection.
    pub fn move_right(&mut self) {
        self.cursor_visible = true;
        self.anchor = None;
        self.cursor = self.next_boundary();
    }

    /// Jump to the start of the buffer, clearing any selection.
    pub fn move_home(&mut self) {
        self.cursor_visible = true;
        self.anchor = None;
        self.cursor = 0;
    }

    /// Jump to the end of the buffer, clearing any selection.
    pub fn move_end(&mut self) {
        self.cursor_visible = true;
        self.anchor = None;
        self.cursor = self.text.len();
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self) {
        self.cursor_visible = true;
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    fn delete_selection(&mut self) {
        if let Some((start, end)) = self.selection() {
            self.text.replace_range(start..end, "");
            self.cursor = start;
        }
        self.anchor = None;
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .last()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> EditSession {
        EditSession::new(NodeId(1), text)
    }

    #[test]
    fn new_session_cursor_at_end() {
        let s = session("hello");
        assert_eq!(s.cursor(), 5);
        assert_eq!(s.selection(), None);
        assert!(s.cursor_visible());
    }

    #[test]
    fn insert_and_backspace_ascii() {
        let mut s = session("ab");
        s.insert_char('c');
        assert_eq!(s.text(), "abc");
        s.backspace();
        s.backspace();
        assert_eq!(s.text(), "a");
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        // Family emoji: four scalars joined by ZWJs, one grapheme.
        let mut s = session("a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}");
        s.backspace();
        assert_eq!(s.text(), "a");
    }

    #[test]
    fn arrows_move_by_grapheme() {
        let mut s = session("e\u{301}x"); // e + combining acute, then x
        s.move_left();
        s.move_left();
        assert_eq!(s.cursor(), 0);
        s.move_right();
        assert_eq!(s.cursor(), "e\u{301}".len());
    }

    #[test]
    fn move_at_edges_is_noop() {
        let mut s = session("a");
        s.move_right();
        assert_eq!(s.cursor(), 1);
        s.move_home();
        s.move_left();
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn select_all_then_type_replaces() {
        let mut s = EditSession::with_select_all(NodeId(1), "old text");
        assert_eq!(s.selection(), Some((0, 8)));
        s.insert_char('n');
        assert_eq!(s.text(), "n");
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn selection_deletes_on_backspace_and_delete() {
        let mut s = session("hello");
        s.select_all();
        s.backspace();
        assert_eq!(s.text(), "");

        let mut s = session("hello");
        s.select_all();
        s.delete_forward();
        assert_eq!(s.text(), "");
    }

    #[test]
    fn placeholder_replaced_by_first_char() {
        let mut s = EditSession::placeholder(NodeId(1), "New Topic");
        assert!(s.is_placeholder());
        s.insert_char('x');
        assert_eq!(s.text(), "x");
        assert!(!s.is_placeholder());
        s.insert_char('y');
        assert_eq!(s.text(), "xy");
    }

    #[test]
    fn placeholder_survives_non_insert_edits() {
        let mut s = EditSession::placeholder(NodeId(1), "New Topic");
        s.backspace();
        assert_eq!(s.text(), "New Topi");
        assert!(s.is_placeholder());
    }

    #[test]
    fn home_end_and_mid_insert() {
        let mut s = session("ac");
        s.move_home();
        s.move_right();
        s.insert_char('b');
        assert_eq!(s.text(), "abc");
        s.move_end();
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn seeded_session_holds_single_char() {
        let s = EditSession::seeded(NodeId(1), 'q');
        assert_eq!(s.text(), "q");
        assert_eq!(s.cursor(), 1);
        assert!(!s.is_placeholder());
    }

    #[test]
    fn blink_toggles() {
        let mut s = session("x");
        assert!(s.cursor_visible());
        s.toggle_blink();
        assert!(!s.cursor_visible());
        s.toggle_blink();
        assert!(s.cursor_visible());
    }

    #[test]
    fn keystrokes_reset_blink_to_visible() {
        let mut s = session("ab");
        s.toggle_blink();
        s.insert_char('x');
        assert!(s.cursor_visible());

        s.toggle_blink();
        s.backspace();
        assert!(s.cursor_visible());

        s.toggle_blink();
        s.move_left();
        assert!(s.cursor_visible());

        s.toggle_blink();
        s.move_end();
        assert!(s.cursor_visible());
    }

    #[test]
    fn delete_forward_mid_string() {
        let mut s = session("abc");
        s.move_home();
        s.delete_forward();
        assert_eq!(s.text(), "bc");
        s.move_end();
        s.delete_forward();
        assert_eq!(s.text(), "bc");
    }
}
