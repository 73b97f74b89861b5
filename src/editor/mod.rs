//! Reference editor backend.
//!
//! Provides a rope-backed text buffer with a selection, a native undo
//! stack, and remote cursor decorations, wired to the collaboration
//! engine through [`RopeEditorAdapter`].

mod adapter;
mod buffer;
mod history;
mod remote;

pub use adapter::{KeyPress, RopeEditorAdapter};
pub use buffer::{Direction, EditorBuffer};
pub use history::{Edit, History};
pub use remote::{RemoteCursor, RemoteCursors};
