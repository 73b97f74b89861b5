use std::ops::Range;

use ropey::Rope;

use super::history::Edit;
use crate::cursor::Cursor;
use crate::error::OperationError;
use crate::operation::{self, TextOperation};

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text buffer backed by a rope data structure.
///
/// Holds the document, the local selection (as char offsets) and the
/// focus state of the widget. Every content change goes through
/// [`replace`](Self::replace) or [`apply`](Self::apply) so the selection
/// always stays inside the document.
pub struct EditorBuffer {
    rope: Rope,
    selection: Cursor,
    /// Remembered column for vertical movement (sticky column).
    col_memory: Option<usize>,
    focused: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Cursor::caret(0),
            col_memory: None,
            focused: false,
        }
    }

    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Document length in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in chars (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// Line and column of a char offset.
    pub fn line_col(&self, char_idx: usize) -> (usize, usize) {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        (line, idx - self.rope.line_to_char(line))
    }

    /// Char offset of a line and column, clamped to the document.
    pub fn char_idx(&self, line: usize, col: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + col.min(self.line_len(line))
    }

    /// The local selection.
    pub const fn selection(&self) -> Cursor {
        self.selection
    }

    /// Replace the selection, clamped to the document.
    pub fn set_selection(&mut self, cursor: Cursor) {
        self.selection = cursor.clamp(self.rope.len_chars());
        self.col_memory = None;
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Set the focus state, returning whether it changed.
    pub const fn set_focused(&mut self, focused: bool) -> bool {
        let changed = self.focused != focused;
        self.focused = focused;
        changed
    }

    /// Replace the whole content, keeping the selection in bounds.
    pub fn set_content(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = self.selection.clamp(self.rope.len_chars());
        self.col_memory = None;
    }

    /// Replace `range` with `text` and put the caret after the new text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Edit {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.selection = Cursor::caret(start + text.chars().count());
        self.col_memory = None;
        Edit {
            at: start,
            removed,
            inserted: text.to_string(),
        }
    }

    /// Apply an operation from elsewhere, carrying the selection along.
    ///
    /// # Errors
    /// Returns an error, leaving the buffer untouched, if `op` does not fit.
    pub fn apply(&mut self, op: &TextOperation) -> Result<(), OperationError> {
        operation::apply_to_rope(op, &mut self.rope)?;
        self.selection = self.selection.transform(op);
        self.col_memory = None;
        Ok(())
    }

    /// Insert a character over the selection.
    pub fn insert_char(&mut self, ch: char) -> Edit {
        let mut utf8 = [0; 4];
        self.replace(self.selection.range(), ch.encode_utf8(&mut utf8))
    }

    /// Insert a string over the selection. Inserting nothing over an
    /// empty selection is not an edit.
    pub fn insert_str(&mut self, s: &str) -> Option<Edit> {
        if s.is_empty() && self.selection.is_caret() {
            return None;
        }
        Some(self.replace(self.selection.range(), s))
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) -> Edit {
        self.insert_char('\n')
    }

    /// Delete the selection, or the character before the caret (Backspace).
    pub fn delete_back(&mut self) -> Option<Edit> {
        let range = self.selection.range();
        if !range.is_empty() {
            return Some(self.replace(range, ""));
        }
        if range.start == 0 {
            return None;
        }
        Some(self.replace(range.start - 1..range.start, ""))
    }

    /// Delete the selection, or the character after the caret (Delete key).
    pub fn delete_forward(&mut self) -> Option<Edit> {
        let range = self.selection.range();
        if !range.is_empty() {
            return Some(self.replace(range, ""));
        }
        if range.start >= self.rope.len_chars() {
            return None;
        }
        Some(self.replace(range.start..range.start + 1, ""))
    }

    /// Move the caret in the given direction, collapsing any selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(false),
            Direction::Down => self.move_vertical(true),
        }
    }

    /// Move the caret to the beginning of the line (Home).
    pub fn move_home(&mut self) {
        let (line, _) = self.line_col(self.selection.position);
        self.set_caret(self.char_idx(line, 0));
    }

    /// Move the caret to the end of the line (End).
    pub fn move_end(&mut self) {
        let (line, _) = self.line_col(self.selection.position);
        self.set_caret(self.char_idx(line, usize::MAX));
    }

    /// Move the caret to a specific line and column, clamped.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.set_caret(self.char_idx(line, col));
    }

    /// Move the caret to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.set_caret(self.rope.len_chars());
    }

    // --- Private helpers ---

    fn set_caret(&mut self, idx: usize) {
        self.selection = Cursor::caret(idx.min(self.rope.len_chars()));
        self.col_memory = None;
    }

    fn move_left(&mut self) {
        let range = self.selection.range();
        if !range.is_empty() {
            self.set_caret(range.start);
        } else if range.start > 0 {
            self.set_caret(range.start - 1);
        }
    }

    fn move_right(&mut self) {
        let range = self.selection.range();
        if !range.is_empty() {
            self.set_caret(range.end);
        } else if range.end < self.rope.len_chars() {
            self.set_caret(range.end + 1);
        }
    }

    fn move_vertical(&mut self, down: bool) {
        let (line, col) = self.line_col(self.selection.position);
        let target = if down {
            if line + 1 >= self.line_count() {
                return;
            }
            line + 1
        } else {
            if line == 0 {
                return;
            }
            line - 1
        };
        let want = self.col_memory.unwrap_or(col);
        self.selection = Cursor::caret(self.char_idx(target, want));
        self.col_memory = Some(want);
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .finish()
    }
}
