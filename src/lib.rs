// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # collab-adapter
//!
//! The boundary between a text-editing widget and an operational
//! transformation collaboration engine.
//!
//! The engine talks to any widget through the [`adapter::EditorAdapter`]
//! trait:
//! - **Events**: the widget reports local edits, focus changes, cursor
//!   movement, undo/redo key presses and failures
//! - **Content**: the engine applies and inverts operations, reads and
//!   replaces the whole text
//! - **Cursors**: the local selection and decorations for remote users
//! - **Lifecycle**: everything is torn down exactly once by `dispose`
//!
//! ## Modules
//!
//! - [`operation`]: Retain/insert/delete operations and their application
//! - [`cursor`]: Selections and their transformation through operations
//! - [`event`]: The closed set of editor events and typed listeners
//! - [`emitter`]: Listener registry and dispatch
//! - [`adapter`]: The adapter contract
//! - [`editor`]: Rope-backed reference implementation
//! - [`config`]: Flag-file configuration

pub mod adapter;
pub mod client;
pub mod config;
pub mod cursor;
pub mod disposable;
pub mod editor;
pub mod emitter;
pub mod error;
pub mod event;
pub mod operation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adapter::{EditorAdapter, UndoRedoCallback};
    pub use crate::client::{ClientId, UserColor};
    pub use crate::cursor::Cursor;
    pub use crate::disposable::{Disposable, DisposeHandle};
    pub use crate::editor::{KeyPress, RopeEditorAdapter};
    pub use crate::error::{AdapterError, EditorAdapterState, OperationError};
    pub use crate::event::{EditorCallbacks, EditorEvent, Listener};
    pub use crate::operation::TextOperation;
}
