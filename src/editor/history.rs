//! The widget's own undo stack, used when the engine has not taken over
//! undo and redo.

use std::collections::VecDeque;

use super::buffer::EditorBuffer;
use crate::operation::TextOperation;

/// One local edit: `removed` was replaced by `inserted` at char offset `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub at: usize,
    pub removed: String,
    pub inserted: String,
}

impl Edit {
    /// The edit as an operation over a document of `len_before` chars.
    pub fn operation(&self, len_before: usize) -> TextOperation {
        TextOperation::replacement(
            len_before,
            self.at,
            self.removed.chars().count(),
            &self.inserted,
        )
    }

    /// The operation undoing this edit, over the document it produced.
    pub fn inverse(&self, len_before: usize) -> TextOperation {
        let len_after =
            len_before + self.inserted.chars().count() - self.removed.chars().count();
        TextOperation::replacement(
            len_after,
            self.at,
            self.inserted.chars().count(),
            &self.removed,
        )
    }
}

/// Bounded undo/redo stacks of local edits.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Edit>,
    redo: Vec<Edit>,
    limit: usize,
}

impl History {
    pub const fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record a fresh edit. Clears the redo stack.
    pub fn record(&mut self, edit: Edit) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(edit);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Revert the newest edit in `buffer`, returning the edit performed.
    pub fn undo(&mut self, buffer: &mut EditorBuffer) -> Option<Edit> {
        let edit = self.undo.pop_back()?;
        let end = edit.at + edit.inserted.chars().count();
        let performed = buffer.replace(edit.at..end, &edit.removed);
        self.redo.push(edit);
        Some(performed)
    }

    /// Reapply the newest undone edit, returning the edit performed.
    pub fn redo(&mut self, buffer: &mut EditorBuffer) -> Option<Edit> {
        let edit = self.redo.pop()?;
        let end = edit.at + edit.removed.chars().count();
        let performed = buffer.replace(edit.at..end, &edit.inserted);
        self.undo.push_back(edit);
        Some(performed)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::apply_to_str;

    #[test]
    fn test_edit_operation_and_inverse() {
        let edit = Edit {
            at: 5,
            removed: String::new(),
            inserted: " world".to_string(),
        };
        let op = edit.operation(5);
        let inverse = edit.inverse(5);
        assert_eq!(op, TextOperation::new().retain(5).insert(" world"));
        assert_eq!(inverse, TextOperation::new().retain(5).delete(6));
        assert_eq!(
            apply_to_str(&inverse, &apply_to_str(&op, "hello").unwrap()).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_undo_then_redo() {
        let mut buf = EditorBuffer::from_text("ab");
        let mut history = History::new(10);
        buf.move_to_end();
        history.record(buf.insert_char('c'));
        history.record(buf.insert_char('d'));

        let undone = history.undo(&mut buf).unwrap();
        assert_eq!(buf.text(), "abc");
        assert_eq!(undone.removed, "d");

        history.undo(&mut buf);
        assert_eq!(buf.text(), "ab");
        assert!(!history.can_undo());

        history.redo(&mut buf);
        assert_eq!(buf.text(), "abc");
        assert!(history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut buf = EditorBuffer::from_text("");
        let mut history = History::new(10);
        history.record(buf.insert_char('a'));
        history.undo(&mut buf);
        history.record(buf.insert_char('b'));
        assert!(!history.can_redo());
        assert!(history.redo(&mut buf).is_none());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut buf = EditorBuffer::from_text("");
        let mut history = History::new(2);
        for ch in ['a', 'b', 'c'] {
            history.record(buf.insert_char(ch));
        }
        history.undo(&mut buf);
        history.undo(&mut buf);
        assert!(history.undo(&mut buf).is_none());
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_zero_limit_records_nothing() {
        let mut buf = EditorBuffer::from_text("");
        let mut history = History::new(0);
        history.record(buf.insert_char('a'));
        assert!(!history.can_undo());
    }
}
