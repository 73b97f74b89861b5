use std::fmt;

use super::buffer::{Direction, EditorBuffer};
use super::history::{Edit, History};
use super::remote::{RemoteCursor, RemoteCursors};
use crate::adapter::{EditorAdapter, UndoRedoCallback, UndoRedoHooks, raise_operation_error};
use crate::client::{ClientId, UserColor};
use crate::config::AdapterConfig;
use crate::cursor::Cursor;
use crate::disposable::{Disposable, DisposeHandle};
use crate::emitter::EventEmitter;
use crate::error::AdapterError;
use crate::event::{EditorEvent, EventPayload, Listener};
use crate::operation::{self, TextOperation};

/// Outcome of an undo or redo key press.
#[must_use = "an intercepted key press does nothing until `finish` runs the override"]
pub enum KeyPress {
    /// The engine's override claimed the key and has not run yet.
    Intercepted(UndoRedoCallback),
    /// The editor's own history handled the key.
    Native,
    /// Native undo is disabled and no override is installed.
    Ignored,
}

impl KeyPress {
    /// Run the override, if any.
    ///
    /// Call this after releasing any borrow of the adapter, e.g.
    /// `let press = editor.borrow_mut().native_undo()?; press.finish();`.
    pub fn finish(self) {
        if let Self::Intercepted(callback) = self {
            callback();
        }
    }

    pub const fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercepted(_))
    }
}

impl fmt::Debug for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intercepted(_) => f.write_str("Intercepted"),
            Self::Native => f.write_str("Native"),
            Self::Ignored => f.write_str("Ignored"),
        }
    }
}

/// An operation applied by the engine together with the inverse computed
/// from the content it was applied to.
#[derive(Debug, Clone)]
struct AppliedOperation {
    operation: TextOperation,
    inverse: TextOperation,
    revision: u64,
}

/// [`EditorAdapter`] over an in-memory rope editor.
///
/// The `focus`, `type_*`, `delete_*`, `move_*` and `native_*` methods play
/// the part of the user; they go through the same paths a widget's input
/// handlers would and emit the corresponding events.
#[derive(Debug)]
pub struct RopeEditorAdapter {
    buffer: EditorBuffer,
    events: EventEmitter,
    hooks: UndoRedoHooks,
    remote: RemoteCursors,
    history: History,
    config: AdapterConfig,
    /// Bumped on every content change.
    revision: u64,
    last_applied: Option<AppliedOperation>,
    disposed: bool,
}

impl RopeEditorAdapter {
    pub fn new(text: &str) -> Self {
        Self::with_config(text, AdapterConfig::default())
    }

    pub fn with_config(text: &str, config: AdapterConfig) -> Self {
        Self {
            buffer: EditorBuffer::from_text(text),
            events: EventEmitter::new(),
            hooks: UndoRedoHooks::new(),
            remote: RemoteCursors::new(),
            history: History::new(config.history_limit),
            config,
            revision: 0,
            last_applied: None,
            disposed: false,
        }
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub const fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// A handle to the listener registry, usable from inside listeners.
    pub fn events(&self) -> EventEmitter {
        self.events.clone()
    }

    pub fn remote_cursor(&self, client_id: &ClientId) -> Option<RemoteCursor> {
        self.remote.get(client_id)
    }

    /// Every remote cursor decoration, ordered by client id.
    pub fn remote_cursors(&self) -> Vec<RemoteCursor> {
        self.remote.snapshot()
    }

    // --- Simulated user input ---

    /// The widget gains focus.
    ///
    /// # Errors
    /// Fails after disposal.
    pub fn focus(&mut self) -> Result<(), AdapterError> {
        self.ensure_live()?;
        if self.buffer.set_focused(true) {
            self.events.emit(&EventPayload::Focus);
        }
        Ok(())
    }

    /// The widget loses focus.
    ///
    /// # Errors
    /// Fails after disposal.
    pub fn blur(&mut self) -> Result<(), AdapterError> {
        self.ensure_live()?;
        if self.buffer.set_focused(false) {
            self.events.emit(&EventPayload::Blur);
        }
        Ok(())
    }

    /// # Errors
    /// Fails after disposal.
    pub fn type_char(&mut self, ch: char) -> Result<(), AdapterError> {
        self.user_edit(|buffer| Some(buffer.insert_char(ch)))
    }

    /// # Errors
    /// Fails after disposal.
    pub fn type_str(&mut self, s: &str) -> Result<(), AdapterError> {
        self.user_edit(|buffer| buffer.insert_str(s))
    }

    /// # Errors
    /// Fails after disposal.
    pub fn split_line(&mut self) -> Result<(), AdapterError> {
        self.user_edit(|buffer| Some(buffer.split_line()))
    }

    /// # Errors
    /// Fails after disposal.
    pub fn delete_back(&mut self) -> Result<(), AdapterError> {
        self.user_edit(EditorBuffer::delete_back)
    }

    /// # Errors
    /// Fails after disposal.
    pub fn delete_forward(&mut self) -> Result<(), AdapterError> {
        self.user_edit(EditorBuffer::delete_forward)
    }

    /// # Errors
    /// Fails after disposal.
    pub fn move_cursor(&mut self, direction: Direction) -> Result<(), AdapterError> {
        self.user_move(|buffer| buffer.move_cursor(direction))
    }

    /// # Errors
    /// Fails after disposal.
    pub fn move_home(&mut self) -> Result<(), AdapterError> {
        self.user_move(EditorBuffer::move_home)
    }

    /// # Errors
    /// Fails after disposal.
    pub fn move_end(&mut self) -> Result<(), AdapterError> {
        self.user_move(EditorBuffer::move_end)
    }

    /// The user drags out a selection.
    ///
    /// # Errors
    /// Fails after disposal.
    pub fn select(&mut self, cursor: Cursor) -> Result<(), AdapterError> {
        self.user_move(|buffer| buffer.set_selection(cursor))
    }

    /// The user presses the undo key.
    ///
    /// With an override installed, `Undo` is emitted and the override is
    /// handed back as [`KeyPress::Intercepted`] for the caller to run once
    /// it no longer holds the adapter, so the override may drive the
    /// adapter itself. Otherwise the native history is used if enabled.
    ///
    /// # Errors
    /// Fails after disposal.
    pub fn native_undo(&mut self) -> Result<KeyPress, AdapterError> {
        self.ensure_live()?;
        if let Some(callback) = self.hooks.undo() {
            self.events.emit(&EventPayload::Undo);
            return Ok(KeyPress::Intercepted(callback));
        }
        if !self.config.native_undo {
            return Ok(KeyPress::Ignored);
        }
        let len_before = self.buffer.len_chars();
        if let Some(edit) = self.history.undo(&mut self.buffer) {
            self.publish_edit(&edit, len_before);
        }
        Ok(KeyPress::Native)
    }

    /// The user presses the redo key. See [`native_undo`](Self::native_undo).
    ///
    /// # Errors
    /// Fails after disposal.
    pub fn native_redo(&mut self) -> Result<KeyPress, AdapterError> {
        self.ensure_live()?;
        if let Some(callback) = self.hooks.redo() {
            self.events.emit(&EventPayload::Redo);
            return Ok(KeyPress::Intercepted(callback));
        }
        if !self.config.native_undo {
            return Ok(KeyPress::Ignored);
        }
        let len_before = self.buffer.len_chars();
        if let Some(edit) = self.history.redo(&mut self.buffer) {
            self.publish_edit(&edit, len_before);
        }
        Ok(KeyPress::Native)
    }

    // --- Private helpers ---

    const fn ensure_live(&self) -> Result<(), AdapterError> {
        if self.disposed {
            Err(AdapterError::Disposed)
        } else {
            Ok(())
        }
    }

    fn user_edit(
        &mut self,
        edit: impl FnOnce(&mut EditorBuffer) -> Option<Edit>,
    ) -> Result<(), AdapterError> {
        self.ensure_live()?;
        let len_before = self.buffer.len_chars();
        if let Some(edit) = edit(&mut self.buffer) {
            self.history.record(edit.clone());
            self.publish_edit(&edit, len_before);
        }
        Ok(())
    }

    fn user_move(&mut self, mv: impl FnOnce(&mut EditorBuffer)) -> Result<(), AdapterError> {
        self.ensure_live()?;
        let before = self.buffer.selection();
        mv(&mut self.buffer);
        if self.buffer.selection() != before {
            self.events.emit(&EventPayload::CursorActivity);
        }
        Ok(())
    }

    /// Report a local edit to remote decorations and listeners.
    fn publish_edit(&mut self, edit: &Edit, len_before: usize) {
        let operation = edit.operation(len_before);
        let inverse = edit.inverse(len_before);
        self.remote.transform_all(&operation);
        self.revision += 1;
        self.last_applied = None;
        if self.config.trace_operations {
            tracing::debug!(%operation, %inverse, "local edit");
        }
        self.events.emit(&EventPayload::Change {
            operation: &operation,
            inverse: &inverse,
        });
        self.events.emit(&EventPayload::CursorActivity);
    }
}

impl EditorAdapter for RopeEditorAdapter {
    fn on(&mut self, event: EditorEvent, listener: Listener) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.events.on(event, listener)
    }

    fn off(&mut self, event: EditorEvent, listener: &Listener) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.events.off(event, listener).map(|_| ())
    }

    fn register_undo(&mut self, callback: UndoRedoCallback) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.hooks.set_undo(callback);
        Ok(())
    }

    fn register_redo(&mut self, callback: UndoRedoCallback) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.hooks.set_redo(callback);
        Ok(())
    }

    fn get_cursor(&self) -> Result<Option<Cursor>, AdapterError> {
        self.ensure_live()?;
        Ok(self
            .buffer
            .is_focused()
            .then(|| self.buffer.selection()))
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.buffer.set_selection(cursor);
        Ok(())
    }

    fn set_other_cursor(
        &mut self,
        client_id: ClientId,
        cursor: Cursor,
        user_color: &str,
        user_name: Option<&str>,
    ) -> Result<DisposeHandle, AdapterError> {
        self.ensure_live()?;
        let Some(color) = UserColor::parse(user_color) else {
            return Err(AdapterError::InvalidColor {
                client: client_id,
                color: user_color.to_string(),
            });
        };
        let cursor = cursor.clamp(self.buffer.len_chars());
        tracing::debug!(client = %client_id, ?cursor, %color, "showing remote cursor");
        Ok(self
            .remote
            .set(client_id, cursor, color, user_name.map(ToOwned::to_owned)))
    }

    fn get_text(&self) -> Result<String, AdapterError> {
        self.ensure_live()?;
        Ok(self.buffer.text())
    }

    fn set_text(&mut self, text: &str) -> Result<(), AdapterError> {
        self.ensure_live()?;
        self.buffer.set_content(text);
        self.remote.clamp_all(self.buffer.len_chars());
        self.history.clear();
        self.revision += 1;
        self.last_applied = None;
        Ok(())
    }

    fn apply_operation(&mut self, op: &TextOperation) -> Result<(), AdapterError> {
        self.ensure_live()?;
        if self.config.trace_operations {
            tracing::debug!(operation = %op, "applying engine operation");
        }
        let inverse = match operation::invert(op, self.buffer.rope()) {
            Ok(inverse) => inverse,
            Err(error) => {
                raise_operation_error(&self.events, &error, op);
                return Err(error.into());
            }
        };
        if op.is_noop() {
            return Ok(());
        }
        if let Err(error) = self.buffer.apply(op) {
            raise_operation_error(&self.events, &error, op);
            return Err(error.into());
        }
        self.remote.transform_all(op);
        // Native history positions no longer match the content.
        self.history.clear();
        self.revision += 1;
        self.last_applied = Some(AppliedOperation {
            operation: op.clone(),
            inverse,
            revision: self.revision,
        });
        Ok(())
    }

    fn invert_operation(&self, op: &TextOperation) -> Result<TextOperation, AdapterError> {
        self.ensure_live()?;
        let cached = self
            .last_applied
            .as_ref()
            .filter(|last| last.revision == self.revision && last.operation == *op);
        if let Some(last) = cached {
            return Ok(last.inverse.clone());
        }
        operation::invert(op, self.buffer.rope()).map_err(|error| {
            raise_operation_error(&self.events, &error, op);
            error.into()
        })
    }
}

impl Disposable for RopeEditorAdapter {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.events.close();
        self.remote.clear();
        self.hooks.clear();
        self.history.clear();
        self.last_applied = None;
        tracing::debug!("editor adapter disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for RopeEditorAdapter {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::error::{EditorAdapterState, OperationError};

    type Changes = Rc<RefCell<Vec<(TextOperation, TextOperation)>>>;

    fn record_changes(adapter: &mut RopeEditorAdapter) -> Changes {
        let changes: Changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        adapter
            .on(
                EditorEvent::Change,
                Listener::change(move |op, inverse| {
                    c.borrow_mut().push((op.clone(), inverse.clone()));
                }),
            )
            .unwrap();
        changes
    }

    fn count(adapter: &mut RopeEditorAdapter, event: EditorEvent) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let bump = move || h.set(h.get() + 1);
        let listener = match event {
            EditorEvent::Blur => Listener::blur(bump),
            EditorEvent::Focus => Listener::focus(bump),
            EditorEvent::Undo => Listener::undo(bump),
            EditorEvent::Redo => Listener::redo(bump),
            EditorEvent::CursorActivity => Listener::cursor_activity(bump),
            EditorEvent::Change => Listener::change(move |_, _| bump()),
            EditorEvent::Error => Listener::error(move |_, _, _| bump()),
        };
        adapter.on(event, listener).unwrap();
        hits
    }

    // --- Content bridge ---

    #[test]
    fn test_apply_then_invert_round_trip() {
        let mut adapter = RopeEditorAdapter::new("hello");
        let op = TextOperation::new().retain(5).insert(" world");
        adapter.apply_operation(&op).unwrap();
        assert_eq!(adapter.get_text().unwrap(), "hello world");

        let inverse = adapter.invert_operation(&op).unwrap();
        assert_eq!(inverse, TextOperation::new().retain(5).delete(6));
        adapter.apply_operation(&inverse).unwrap();
        assert_eq!(adapter.get_text().unwrap(), "hello");
    }

    #[test]
    fn test_invert_after_apply_restores_deleted_text() {
        let mut adapter = RopeEditorAdapter::new("hello world");
        let op = TextOperation::new().retain(5).delete(6);
        adapter.apply_operation(&op).unwrap();
        let inverse = adapter.invert_operation(&op).unwrap();
        assert_eq!(inverse, TextOperation::new().retain(5).insert(" world"));
    }

    #[test]
    fn test_invert_before_apply_uses_current_content() {
        let adapter = RopeEditorAdapter::new("abc");
        let op = TextOperation::new().delete(1).retain(2);
        let inverse = adapter.invert_operation(&op).unwrap();
        assert_eq!(inverse, TextOperation::new().insert("a").retain(2));
    }

    #[test]
    fn test_apply_operation_is_change_silent() {
        let mut adapter = RopeEditorAdapter::new("abc");
        let changes = record_changes(&mut adapter);
        adapter
            .apply_operation(&TextOperation::new().retain(3).insert("d"))
            .unwrap();
        adapter
            .apply_operation(&TextOperation::new().retain(4))
            .unwrap();
        assert!(changes.borrow().is_empty());
        assert_eq!(adapter.get_text().unwrap(), "abcd");
    }

    #[test]
    fn test_failed_apply_emits_error_and_keeps_content() {
        let mut adapter = RopeEditorAdapter::new("hello");
        let seen: Rc<RefCell<Option<(String, EditorAdapterState)>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        adapter
            .on(
                EditorEvent::Error,
                Listener::error(move |_, op, state| {
                    *s.borrow_mut() = Some((op.to_string(), *state));
                }),
            )
            .unwrap();

        let err = adapter
            .apply_operation(&TextOperation::new().retain(10))
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Operation(OperationError::RetainPastEnd { .. })
        ));
        assert_eq!(adapter.get_text().unwrap(), "hello");
        assert_eq!(
            *seen.borrow(),
            Some((
                "[10]".to_string(),
                EditorAdapterState {
                    retain: 5,
                    skipped_chars: 0,
                    content_length: 5,
                }
            ))
        );
    }

    #[test]
    fn test_failed_invert_emits_error() {
        let mut adapter = RopeEditorAdapter::new("abc");
        let errors = count(&mut adapter, EditorEvent::Error);
        assert!(
            adapter
                .invert_operation(&TextOperation::new().retain(1).delete(5))
                .is_err()
        );
        assert_eq!(errors.get(), 1);
    }

    #[test]
    fn test_cached_inverse_expires_after_mutation() {
        let mut adapter = RopeEditorAdapter::new("ab");
        let op = TextOperation::new().retain(2).insert("c");
        adapter.apply_operation(&op).unwrap();
        adapter.set_text("xyz").unwrap();
        // `op` expects 2 chars; the content now has 3.
        assert!(adapter.invert_operation(&op).is_err());
    }

    #[test]
    fn test_set_text_is_change_silent() {
        let mut adapter = RopeEditorAdapter::new("old");
        let changes = record_changes(&mut adapter);
        adapter.set_text("new content").unwrap();
        assert_eq!(adapter.get_text().unwrap(), "new content");
        assert!(changes.borrow().is_empty());
    }

    // --- User edits ---

    #[test]
    fn test_typing_emits_change_with_inverse() {
        let mut adapter = RopeEditorAdapter::new("hello");
        let changes = record_changes(&mut adapter);
        adapter.move_end().unwrap();
        adapter.type_str(" world").unwrap();

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, TextOperation::new().retain(5).insert(" world"));
        assert_eq!(changes[0].1, TextOperation::new().retain(5).delete(6));
    }

    #[test]
    fn test_delete_back_emits_change() {
        let mut adapter = RopeEditorAdapter::new("abc");
        let changes = record_changes(&mut adapter);
        adapter.move_end().unwrap();
        adapter.delete_back().unwrap();
        assert_eq!(
            changes.borrow()[0],
            (
                TextOperation::new().retain(2).delete(1),
                TextOperation::new().retain(2).insert("c"),
            )
        );
    }

    #[test]
    fn test_noop_edit_emits_nothing() {
        let mut adapter = RopeEditorAdapter::new("abc");
        let changes = record_changes(&mut adapter);
        adapter.delete_back().unwrap();
        adapter.type_str("").unwrap();
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_local_edit_moves_remote_cursors() {
        let mut adapter = RopeEditorAdapter::new("hello");
        let _handle = adapter
            .set_other_cursor(ClientId::from(2), Cursor::caret(3), "#00ff00", None)
            .unwrap();
        adapter.type_str(">> ").unwrap();
        assert_eq!(
            adapter.remote_cursor(&ClientId::from(2)).unwrap().cursor,
            Cursor::caret(6)
        );
    }

    // --- Cursor bridge ---

    #[test]
    fn test_get_cursor_requires_focus() {
        let mut adapter = RopeEditorAdapter::new("hello");
        assert_eq!(adapter.get_cursor().unwrap(), None);
        adapter.focus().unwrap();
        assert_eq!(adapter.get_cursor().unwrap(), Some(Cursor::caret(0)));
    }

    #[test]
    fn test_set_cursor_clamps() {
        let mut adapter = RopeEditorAdapter::new("hello");
        adapter.focus().unwrap();
        adapter.set_cursor(Cursor::new(2, 99)).unwrap();
        assert_eq!(adapter.get_cursor().unwrap(), Some(Cursor::new(2, 5)));
    }

    #[test]
    fn test_set_cursor_does_not_emit_cursor_activity() {
        let mut adapter = RopeEditorAdapter::new("hello");
        let activity = count(&mut adapter, EditorEvent::CursorActivity);
        adapter.set_cursor(Cursor::caret(3)).unwrap();
        assert_eq!(activity.get(), 0);
        adapter.move_end().unwrap();
        assert_eq!(activity.get(), 1);
        adapter.move_end().unwrap();
        assert_eq!(activity.get(), 1);
    }

    #[test]
    fn test_apply_operation_moves_local_and_remote_cursors() {
        let mut adapter = RopeEditorAdapter::new("world");
        adapter.focus().unwrap();
        adapter.set_cursor(Cursor::caret(2)).unwrap();
        let _h = adapter
            .set_other_cursor(ClientId::from("b"), Cursor::new(0, 5), "#123", Some("Bea"))
            .unwrap();
        adapter
            .apply_operation(&TextOperation::new().insert("hello ").retain(5))
            .unwrap();
        assert_eq!(adapter.get_cursor().unwrap(), Some(Cursor::caret(8)));
        assert_eq!(
            adapter.remote_cursor(&ClientId::from("b")).unwrap().cursor,
            Cursor::new(6, 11)
        );
    }

    #[test]
    fn test_focus_and_blur_fire_on_transitions() {
        let mut adapter = RopeEditorAdapter::new("");
        let focus = count(&mut adapter, EditorEvent::Focus);
        let blur = count(&mut adapter, EditorEvent::Blur);
        adapter.focus().unwrap();
        adapter.focus().unwrap();
        adapter.blur().unwrap();
        assert_eq!((focus.get(), blur.get()), (1, 1));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut adapter = RopeEditorAdapter::new("");
        let err = adapter
            .set_other_cursor(ClientId::from(1), Cursor::caret(0), "blue-ish", None)
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidColor { .. }));
        assert!(adapter.remote_cursors().is_empty());
    }

    // --- Undo / redo ---

    #[test]
    fn test_registered_undo_replaces_native_history() {
        let mut adapter = RopeEditorAdapter::new("");
        let undo_events = count(&mut adapter, EditorEvent::Undo);
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        adapter
            .register_undo(Rc::new(move || c.set(c.get() + 1)))
            .unwrap();

        adapter.type_char('a').unwrap();
        let press = adapter.native_undo().unwrap();
        assert!(press.is_intercepted());
        assert_eq!(calls.get(), 0);
        press.finish();
        assert_eq!(adapter.get_text().unwrap(), "a");
        assert_eq!(calls.get(), 1);
        assert_eq!(undo_events.get(), 1);
    }

    #[test]
    fn test_undo_override_applies_inverse_to_same_adapter() {
        let editor = Rc::new(RefCell::new(RopeEditorAdapter::new("hello")));
        let op = TextOperation::new().retain(5).insert(" world");
        editor.borrow_mut().apply_operation(&op).unwrap();
        let inverse = editor.borrow().invert_operation(&op).unwrap();

        let engine_view = Rc::downgrade(&editor);
        editor
            .borrow_mut()
            .register_undo(Rc::new(move || {
                if let Some(editor) = engine_view.upgrade() {
                    editor.borrow_mut().apply_operation(&inverse).unwrap();
                }
            }))
            .unwrap();

        let press = editor.borrow_mut().native_undo().unwrap();
        press.finish();
        assert_eq!(editor.borrow().get_text().unwrap(), "hello");
    }

    #[test]
    fn test_reregistering_redo_replaces_previous() {
        let mut adapter = RopeEditorAdapter::new("");
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&log), Rc::clone(&log));
        adapter
            .register_redo(Rc::new(move || a.borrow_mut().push(1)))
            .unwrap();
        adapter
            .register_redo(Rc::new(move || b.borrow_mut().push(2)))
            .unwrap();
        adapter.native_redo().unwrap().finish();
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn test_native_undo_emits_change() {
        let mut adapter = RopeEditorAdapter::new("ab");
        adapter.move_end().unwrap();
        adapter.type_char('c').unwrap();
        let changes = record_changes(&mut adapter);

        assert!(matches!(adapter.native_undo(), Ok(KeyPress::Native)));
        assert_eq!(adapter.get_text().unwrap(), "ab");
        assert_eq!(
            changes.borrow()[0],
            (
                TextOperation::new().retain(2).delete(1),
                TextOperation::new().retain(2).insert("c"),
            )
        );

        adapter.native_redo().unwrap().finish();
        assert_eq!(adapter.get_text().unwrap(), "abc");
        assert_eq!(changes.borrow().len(), 2);
    }

    #[test]
    fn test_native_undo_disabled_by_config() {
        let config = AdapterConfig {
            native_undo: false,
            ..AdapterConfig::default()
        };
        let mut adapter = RopeEditorAdapter::with_config("", config);
        adapter.type_char('x').unwrap();
        assert!(matches!(adapter.native_undo(), Ok(KeyPress::Ignored)));
        assert_eq!(adapter.get_text().unwrap(), "x");
    }

    #[test]
    fn test_engine_operation_clears_native_history() {
        let mut adapter = RopeEditorAdapter::new("");
        adapter.type_char('x').unwrap();
        adapter
            .apply_operation(&TextOperation::new().insert("remote ").retain(1))
            .unwrap();
        adapter.native_undo().unwrap().finish();
        assert_eq!(adapter.get_text().unwrap(), "remote x");
    }

    // --- Disposal ---

    #[test]
    fn test_dispose_tears_everything_down() {
        let mut adapter = RopeEditorAdapter::new("abc");
        let events = adapter.events();
        let focus = count(&mut adapter, EditorEvent::Focus);
        let _h = adapter
            .set_other_cursor(ClientId::from(1), Cursor::caret(1), "#fff", None)
            .unwrap();
        adapter.register_undo(Rc::new(|| {})).unwrap();

        adapter.dispose();
        adapter.dispose();

        assert!(adapter.is_disposed());
        assert!(adapter.remote_cursors().is_empty());
        assert_eq!(events.emit(&EventPayload::Focus), 0);
        assert_eq!(focus.get(), 0);
    }

    #[test]
    fn test_every_operation_rejects_after_dispose() {
        let mut adapter = RopeEditorAdapter::new("abc");
        adapter.dispose();
        let op = TextOperation::new().retain(3);

        assert_eq!(adapter.get_text(), Err(AdapterError::Disposed));
        assert_eq!(adapter.set_text("x"), Err(AdapterError::Disposed));
        assert_eq!(adapter.get_cursor(), Err(AdapterError::Disposed));
        assert_eq!(adapter.set_cursor(Cursor::caret(0)), Err(AdapterError::Disposed));
        assert_eq!(adapter.apply_operation(&op), Err(AdapterError::Disposed));
        assert_eq!(adapter.invert_operation(&op), Err(AdapterError::Disposed));
        assert_eq!(
            adapter.on(EditorEvent::Blur, Listener::blur(|| {})),
            Err(AdapterError::Disposed)
        );
        assert_eq!(
            adapter.off(EditorEvent::Blur, &Listener::blur(|| {})),
            Err(AdapterError::Disposed)
        );
        assert_eq!(
            adapter.register_undo(Rc::new(|| {})),
            Err(AdapterError::Disposed)
        );
        assert!(
            adapter
                .set_other_cursor(ClientId::from(1), Cursor::caret(0), "#fff", None)
                .is_err()
        );
        assert_eq!(adapter.type_char('a'), Err(AdapterError::Disposed));
        assert_eq!(adapter.focus(), Err(AdapterError::Disposed));
        assert!(matches!(adapter.native_undo(), Err(AdapterError::Disposed)));
    }
}
