use ropey::Rope;

use super::{Component, TextOperation};
use crate::error::{EditorAdapterState, OperationError};

/// Walk `op` against a document of `content_len` chars without touching it.
///
/// Fails at the first component that runs past the end, or when the
/// operation does not cover the whole document. The error carries the
/// offsets reached so far.
///
/// # Errors
/// Returns the divergence as an [`OperationError`].
pub fn check(op: &TextOperation, content_len: usize) -> Result<(), OperationError> {
    let mut state = EditorAdapterState {
        retain: 0,
        skipped_chars: 0,
        content_length: content_len,
    };
    let mut pos = 0;
    for component in op.components() {
        let available = content_len - pos;
        match component {
            Component::Retain(n) => {
                if *n > available {
                    state.retain += available;
                    return Err(OperationError::RetainPastEnd {
                        requested: *n,
                        state,
                    });
                }
                state.retain += n;
                pos += n;
            }
            Component::Delete(n) => {
                if *n > available {
                    state.skipped_chars += available;
                    return Err(OperationError::DeletePastEnd {
                        requested: *n,
                        state,
                    });
                }
                state.skipped_chars += n;
                pos += n;
            }
            Component::Insert(_) => {}
        }
    }
    if pos != content_len {
        return Err(OperationError::LengthMismatch {
            base_len: op.base_len(),
            state,
        });
    }
    Ok(())
}

/// Apply `op` to `rope` in place. On error the rope is left untouched.
///
/// # Errors
/// Returns an error if `op` does not fit the rope's content.
pub fn apply_to_rope(op: &TextOperation, rope: &mut Rope) -> Result<(), OperationError> {
    check(op, rope.len_chars())?;
    let mut pos = 0;
    for component in op.components() {
        match component {
            Component::Retain(n) => pos += n,
            Component::Insert(text) => {
                rope.insert(pos, text);
                pos += text.chars().count();
            }
            Component::Delete(n) => rope.remove(pos..pos + n),
        }
    }
    Ok(())
}

/// Apply `op` to a string, returning the new content.
///
/// # Errors
/// Returns an error if `op` does not fit `text`.
pub fn apply_to_str(op: &TextOperation, text: &str) -> Result<String, OperationError> {
    let mut rope = Rope::from_str(text);
    apply_to_rope(op, &mut rope)?;
    Ok(rope.to_string())
}

/// Compute the operation that undoes `op`, reading deleted text from
/// `base` (the content `op` applies to).
///
/// # Errors
/// Returns an error if `op` does not fit `base`.
pub fn invert(op: &TextOperation, base: &Rope) -> Result<TextOperation, OperationError> {
    check(op, base.len_chars())?;
    let mut pos = 0;
    let mut inverse = TextOperation::new();
    for component in op.components() {
        inverse = match component {
            Component::Retain(n) => {
                pos += n;
                inverse.retain(*n)
            }
            Component::Insert(text) => inverse.delete(text.chars().count()),
            Component::Delete(n) => {
                let removed = base.slice(pos..pos + n).to_string();
                pos += n;
                inverse.insert(removed)
            }
        };
    }
    Ok(inverse)
}
