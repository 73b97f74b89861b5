//! Caret and selection positions in document coordinates.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::operation::{Component, TextOperation};

/// A caret or selection, as char offsets into the document.
///
/// `position` is where the caret sits; `selection_end` is the other end
/// of the selection (equal to `position` for a bare caret). Either end may
/// come first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub position: usize,
    pub selection_end: usize,
}

impl Cursor {
    pub const fn new(position: usize, selection_end: usize) -> Self {
        Self {
            position,
            selection_end,
        }
    }

    /// A caret with no selection.
    pub const fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    pub const fn is_caret(&self) -> bool {
        self.position == self.selection_end
    }

    /// The selected span, lower end first.
    pub fn range(&self) -> Range<usize> {
        self.position.min(self.selection_end)..self.position.max(self.selection_end)
    }

    /// Pull both ends back inside a document of `len` chars.
    #[must_use]
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.position.min(len), self.selection_end.min(len))
    }

    /// Where this cursor lands after `op` is applied to the document.
    ///
    /// Text inserted at the cursor pushes it right; a cursor inside a
    /// deleted span collapses to the start of the deletion.
    #[must_use]
    pub fn transform(self, op: &TextOperation) -> Self {
        let position = transform_index(self.position, op);
        let selection_end = if self.is_caret() {
            position
        } else {
            transform_index(self.selection_end, op)
        };
        Self::new(position, selection_end)
    }
}

fn transform_index(index: usize, op: &TextOperation) -> usize {
    let mut remaining = index;
    let mut moved = index;
    for component in op.components() {
        match component {
            Component::Retain(n) => {
                if *n > remaining {
                    break;
                }
                remaining -= n;
            }
            Component::Insert(text) => moved += text.chars().count(),
            Component::Delete(n) => {
                moved -= remaining.min(*n);
                if *n > remaining {
                    break;
                }
                remaining -= n;
            }
        }
    }
    moved
}
