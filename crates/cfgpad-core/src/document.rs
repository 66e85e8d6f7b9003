//! Rope-backed text document with a single 1-based cursor.
//!
//! This is the editing model behind the terminal host: enough to type, delete, move around
//! and jump to a problem. Multi-cursor, undo and soft wrapping are left to richer editor
//! kernels.

use crate::position::Position;
use ropey::Rope;

/// Width of one indentation step inserted by Tab and after a mapping key.
pub const INDENT_WIDTH: usize = 2;

/// An editable document.
#[derive(Debug, Clone)]
pub struct Document {
    uri: String,
    rope: Rope,
    cursor: Position,
    /// Column to return to when moving vertically through shorter lines.
    preferred_column: Option<usize>,
    version: u64,
    saved_version: u64,
}

impl Document {
    /// Create a document with the cursor at the origin.
    pub fn new(uri: impl Into<String>, text: &str) -> Self {
        Self {
            uri: uri.into(),
            rope: Rope::from_str(text),
            cursor: Position::origin(),
            preferred_column: None,
            version: 1,
            saved_version: 1,
        }
    }

    /// Document identifier (used as marker resource and LSP URI).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole text, keeping the cursor as close as possible.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.bump_version();
        self.set_position(self.cursor);
    }

    /// Returns true if the text changed since the last [`Self::mark_saved`].
    pub fn is_modified(&self) -> bool {
        self.version != self.saved_version
    }

    /// Record the current version as persisted.
    pub fn mark_saved(&mut self) {
        self.saved_version = self.version;
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of 1-based `line`, without its line ending.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line == 0 || line > self.line_count() {
            return None;
        }
        let text = self.rope.line(line - 1).to_string();
        Some(text.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Character length of 1-based `line`, without its line ending.
    pub fn line_len(&self, line: usize) -> usize {
        self.line_text(line)
            .map(|text| text.chars().count())
            .unwrap_or(0)
    }

    /// Cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor, clamping to the document.
    pub fn set_position(&mut self, position: Position) {
        self.cursor = self.clamp(position);
        self.preferred_column = None;
    }

    /// Clamp `position` to an existing line and column.
    pub fn clamp(&self, position: Position) -> Position {
        let line = position.line.clamp(1, self.line_count().max(1));
        let column = position.column.clamp(1, self.line_len(line) + 1);
        Position::new(line, column)
    }

    /// Character offset of `position` (clamped).
    pub fn offset_of(&self, position: Position) -> usize {
        let position = self.clamp(position);
        self.rope.line_to_char(position.line - 1) + position.column - 1
    }

    /// Position of character `offset` (clamped to the end of the text).
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let column = offset - self.rope.line_to_char(line);
        Position::new(line + 1, column + 1)
    }

    /// Insert `text` at the cursor and move the cursor past it.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = self.offset_of(self.cursor);
        self.rope.insert(offset, text);
        self.bump_version();
        self.cursor = self.position_of(offset + text.chars().count());
        self.preferred_column = None;
    }

    /// Insert a single character.
    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut buf));
    }

    /// Insert a line break, carrying over the current indentation.
    ///
    /// A line ending in `:` (a mapping key without inline value) gets one extra level.
    pub fn insert_newline(&mut self) {
        let line = self.line_text(self.cursor.line).unwrap_or_default();
        let before_cursor: String = line.chars().take(self.cursor.column - 1).collect();
        let mut indent = before_cursor.chars().take_while(|c| *c == ' ').count();
        if before_cursor.trim_end().ends_with(':') {
            indent += INDENT_WIDTH;
        }

        let mut text = String::with_capacity(indent + 1);
        text.push('\n');
        text.extend(std::iter::repeat_n(' ', indent));
        self.insert_text(&text);
    }

    /// Insert spaces up to the next indentation stop.
    pub fn insert_tab(&mut self) {
        let column = self.cursor.column - 1;
        let width = INDENT_WIDTH - (column % INDENT_WIDTH);
        self.insert_text(&" ".repeat(width));
    }

    /// Delete the character before the cursor (joins lines at column 1).
    pub fn backspace(&mut self) -> bool {
        let offset = self.offset_of(self.cursor);
        if offset == 0 {
            return false;
        }
        let mut start = offset - 1;
        if self.rope.char(start) == '\n' && start > 0 && self.rope.char(start - 1) == '\r' {
            start -= 1;
        }
        self.rope.remove(start..offset);
        self.bump_version();
        self.cursor = self.position_of(start);
        self.preferred_column = None;
        true
    }

    /// Delete the character under the cursor (joins lines at end of line).
    pub fn delete(&mut self) -> bool {
        let offset = self.offset_of(self.cursor);
        let len = self.rope.len_chars();
        if offset >= len {
            return false;
        }
        let mut end = offset + 1;
        if self.rope.char(offset) == '\r' && end < len && self.rope.char(end) == '\n' {
            end += 1;
        }
        self.rope.remove(offset..end);
        self.bump_version();
        self.preferred_column = None;
        true
    }

    /// Move one character left, wrapping to the end of the previous line.
    pub fn move_left(&mut self) {
        let Position { line, column } = self.cursor;
        if column > 1 {
            self.set_position(Position::new(line, column - 1));
        } else if line > 1 {
            self.set_position(Position::new(line - 1, self.line_len(line - 1) + 1));
        }
    }

    /// Move one character right, wrapping to the start of the next line.
    pub fn move_right(&mut self) {
        let Position { line, column } = self.cursor;
        if column <= self.line_len(line) {
            self.set_position(Position::new(line, column + 1));
        } else if line < self.line_count() {
            self.set_position(Position::new(line + 1, 1));
        }
    }

    /// Move up `lines` lines, keeping the preferred column.
    pub fn move_up(&mut self, lines: usize) {
        let target = self.cursor.line.saturating_sub(lines).max(1);
        self.move_vertically(target);
    }

    /// Move down `lines` lines, keeping the preferred column.
    pub fn move_down(&mut self, lines: usize) {
        let target = (self.cursor.line + lines).min(self.line_count().max(1));
        self.move_vertically(target);
    }

    /// Move to the first non-blank character, or column 1 if already there.
    pub fn move_home(&mut self) {
        let line = self.cursor.line;
        let indent = self
            .line_text(line)
            .map(|text| text.chars().take_while(|c| c.is_whitespace()).count())
            .unwrap_or(0);
        let target = if self.cursor.column == indent + 1 {
            1
        } else {
            indent + 1
        };
        self.set_position(Position::new(line, target));
    }

    /// Move past the last character of the line.
    pub fn move_end(&mut self) {
        let line = self.cursor.line;
        self.set_position(Position::new(line, self.line_len(line) + 1));
    }

    fn move_vertically(&mut self, target_line: usize) {
        let preferred = self.preferred_column.unwrap_or(self.cursor.column);
        self.cursor = self.clamp(Position::new(target_line, preferred));
        self.preferred_column = Some(preferred);
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_cursor_tracking() {
        let mut doc = Document::new("config.yaml", "");
        doc.insert_text("server:");
        assert_eq!(doc.cursor(), Position::new(1, 8));
        doc.insert_newline();
        assert_eq!(doc.text(), "server:\n  ");
        assert_eq!(doc.cursor(), Position::new(2, 3));
        doc.insert_text("port: 80");
        doc.insert_newline();
        assert_eq!(doc.text(), "server:\n  port: 80\n  ");
        assert!(doc.is_modified());
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut doc = Document::new("d", "ab\ncd");
        doc.set_position(Position::new(2, 1));
        assert!(doc.backspace());
        assert_eq!(doc.text(), "abcd");
        assert_eq!(doc.cursor(), Position::new(1, 3));

        doc.set_position(Position::origin());
        assert!(!doc.backspace());
    }

    #[test]
    fn test_backspace_removes_crlf_pair() {
        let mut doc = Document::new("d", "a\r\nb");
        doc.set_position(Position::new(2, 1));
        doc.backspace();
        assert_eq!(doc.text(), "ab");
    }

    #[test]
    fn test_delete_at_end_of_line() {
        let mut doc = Document::new("d", "a\nb");
        doc.set_position(Position::new(1, 2));
        assert!(doc.delete());
        assert_eq!(doc.text(), "ab");
        doc.set_position(Position::new(1, 3));
        assert!(!doc.delete());
    }

    #[test]
    fn test_set_position_clamps() {
        let doc_text = "short\nlonger line\n";
        let mut doc = Document::new("d", doc_text);
        doc.set_position(Position::new(99, 99));
        assert_eq!(doc.cursor(), Position::new(3, 1));
        doc.set_position(Position::new(1, 40));
        assert_eq!(doc.cursor(), Position::new(1, 6));
        doc.set_position(Position::new(0, 0));
        assert_eq!(doc.cursor(), Position::new(1, 1));
    }

    #[test]
    fn test_vertical_moves_keep_preferred_column() {
        let mut doc = Document::new("d", "abcdef\nab\nabcdef");
        doc.set_position(Position::new(1, 6));
        doc.move_down(1);
        assert_eq!(doc.cursor(), Position::new(2, 3));
        doc.move_down(1);
        assert_eq!(doc.cursor(), Position::new(3, 6));
        doc.move_up(10);
        assert_eq!(doc.cursor(), Position::new(1, 6));
    }

    #[test]
    fn test_horizontal_moves_wrap() {
        let mut doc = Document::new("d", "ab\ncd");
        doc.set_position(Position::new(1, 3));
        doc.move_right();
        assert_eq!(doc.cursor(), Position::new(2, 1));
        doc.move_left();
        assert_eq!(doc.cursor(), Position::new(1, 3));
    }

    #[test]
    fn test_home_toggles_between_indent_and_column_one() {
        let mut doc = Document::new("d", "    key: v");
        doc.move_end();
        doc.move_home();
        assert_eq!(doc.cursor(), Position::new(1, 5));
        doc.move_home();
        assert_eq!(doc.cursor(), Position::new(1, 1));
    }

    #[test]
    fn test_tab_aligns_to_indent_stop() {
        let mut doc = Document::new("d", "");
        doc.insert_char('a');
        doc.insert_tab();
        assert_eq!(doc.text(), "a ");
        doc.insert_tab();
        assert_eq!(doc.text(), "a   ");
    }

    #[test]
    fn test_set_text_and_saved_state() {
        let mut doc = Document::new("d", "x");
        assert!(!doc.is_modified());
        doc.set_text("y: 1\n");
        assert!(doc.is_modified());
        doc.mark_saved();
        assert!(!doc.is_modified());
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1).as_deref(), Some("y: 1"));
        assert_eq!(doc.line_text(3), None);
    }

    #[test]
    fn test_unicode_columns_are_chars() {
        let mut doc = Document::new("d", "名前: 値");
        doc.move_end();
        assert_eq!(doc.cursor(), Position::new(1, 6));
        assert_eq!(doc.offset_of(doc.cursor()), 5);
    }
}
