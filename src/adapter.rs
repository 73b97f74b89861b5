//! The contract between a concrete editor and the OT engine.
//!
//! An [`EditorAdapter`] is implemented once per editor backend and driven
//! by the engine through this trait alone. The engine never reaches into
//! the editor; the editor never sees the engine's history or transforms.
//!
//! Every method of a disposed adapter returns [`AdapterError::Disposed`];
//! [`Disposable::dispose`] itself may be called any number of times.

use std::fmt;
use std::rc::Rc;

use crate::client::ClientId;
use crate::cursor::Cursor;
use crate::disposable::{Disposable, DisposeHandle};
use crate::emitter::EventEmitter;
use crate::error::{AdapterError, OperationError};
use crate::event::{EditorCallbacks, EditorEvent, EventPayload, Listener};
use crate::operation::TextOperation;

/// Override invoked in place of the editor's native undo or redo.
pub type UndoRedoCallback = Rc<dyn Fn()>;

pub trait EditorAdapter: Disposable {
    /// Register `listener` for `event`. Listeners of one kind run in
    /// registration order.
    ///
    /// # Errors
    /// Fails if the listener is for a different kind, or after disposal.
    fn on(&mut self, event: EditorEvent, listener: Listener) -> Result<(), AdapterError>;

    /// Remove `listener` from `event`. Unknown listeners are ignored.
    ///
    /// # Errors
    /// Fails after disposal.
    fn off(&mut self, event: EditorEvent, listener: &Listener) -> Result<(), AdapterError>;

    /// Register every handler present in `callbacks`, as one `on` each.
    ///
    /// # Errors
    /// Fails after disposal.
    fn register_callbacks(&mut self, callbacks: EditorCallbacks) -> Result<(), AdapterError> {
        for listener in callbacks.into_listeners() {
            self.on(listener.kind(), listener)?;
        }
        Ok(())
    }

    /// Install the undo override, replacing any previous one.
    ///
    /// # Errors
    /// Fails after disposal.
    fn register_undo(&mut self, callback: UndoRedoCallback) -> Result<(), AdapterError>;

    /// Install the redo override, replacing any previous one.
    ///
    /// # Errors
    /// Fails after disposal.
    fn register_redo(&mut self, callback: UndoRedoCallback) -> Result<(), AdapterError>;

    /// The local cursor, or `None` when the editor has no focus or selection.
    ///
    /// # Errors
    /// Fails after disposal.
    fn get_cursor(&self) -> Result<Option<Cursor>, AdapterError>;

    /// Move the local cursor. Out-of-range positions are clamped.
    ///
    /// # Errors
    /// Fails after disposal.
    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), AdapterError>;

    /// Show a remote participant's cursor, replacing any decoration already
    /// shown for `client_id`. Disposing the returned handle removes exactly
    /// this decoration.
    ///
    /// # Errors
    /// Fails if `user_color` is not a color, or after disposal.
    fn set_other_cursor(
        &mut self,
        client_id: ClientId,
        cursor: Cursor,
        user_color: &str,
        user_name: Option<&str>,
    ) -> Result<DisposeHandle, AdapterError>;

    /// The whole document.
    ///
    /// # Errors
    /// Fails after disposal.
    fn get_text(&self) -> Result<String, AdapterError>;

    /// Replace the whole document without emitting `Change`.
    ///
    /// # Errors
    /// Fails after disposal.
    fn set_text(&mut self, text: &str) -> Result<(), AdapterError>;

    /// Apply an engine operation to the content and every cursor. Never
    /// emits `Change`. A mismatching operation raises an `Error` event and
    /// leaves the content untouched.
    ///
    /// # Errors
    /// Fails if the operation does not fit the content, or after disposal.
    fn apply_operation(&mut self, operation: &TextOperation) -> Result<(), AdapterError>;

    /// The operation undoing `operation` against the current content.
    /// A mismatching operation raises an `Error` event.
    ///
    /// # Errors
    /// Fails if the operation does not fit the content, or after disposal.
    fn invert_operation(&self, operation: &TextOperation) -> Result<TextOperation, AdapterError>;
}

/// At most one undo and one redo override, scoped to one adapter.
#[derive(Clone, Default)]
pub struct UndoRedoHooks {
    undo: Option<UndoRedoCallback>,
    redo: Option<UndoRedoCallback>,
}

impl UndoRedoHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_undo(&mut self, callback: UndoRedoCallback) {
        self.undo = Some(callback);
    }

    pub fn set_redo(&mut self, callback: UndoRedoCallback) {
        self.redo = Some(callback);
    }

    pub fn undo(&self) -> Option<UndoRedoCallback> {
        self.undo.clone()
    }

    pub fn redo(&self) -> Option<UndoRedoCallback> {
        self.redo.clone()
    }

    pub fn clear(&mut self) {
        self.undo = None;
        self.redo = None;
    }
}

impl fmt::Debug for UndoRedoHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoHooks")
            .field("undo", &self.undo.is_some())
            .field("redo", &self.redo.is_some())
            .finish()
    }
}

/// Report an operation that did not fit the content through the `Error`
/// event. Backends call this before returning the error to the engine.
pub fn raise_operation_error(
    events: &EventEmitter,
    error: &OperationError,
    operation: &TextOperation,
) {
    let rendered = operation.to_string();
    let state = error.state();
    tracing::warn!(
        %error,
        operation = %rendered,
        retain = state.retain,
        skipped_chars = state.skipped_chars,
        content_length = state.content_length,
        "operation does not fit editor content"
    );
    events.emit(&EventPayload::Error {
        error,
        operation: &rendered,
        state: &state,
    });
}
