//! Editor-originated events and their typed listeners.
//!
//! The event set is closed. Each [`EditorEvent`] kind has exactly one
//! handler signature, carried by the matching [`Listener`] variant, so a
//! change handler can never be registered for focus events and the
//! compiler checks every dispatch site for exhaustiveness.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{AdapterError, EditorAdapterState, OperationError};
use crate::operation::TextOperation;

/// The seven kinds of event an adapter delivers to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditorEvent {
    Error,
    Blur,
    Focus,
    Undo,
    Redo,
    Change,
    CursorActivity,
}

impl EditorEvent {
    pub const ALL: [Self; 7] = [
        Self::Error,
        Self::Blur,
        Self::Focus,
        Self::Undo,
        Self::Redo,
        Self::Change,
        Self::CursorActivity,
    ];

    /// Stable event name, as used in logs and configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Blur => "blur",
            Self::Focus => "focus",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Change => "change",
            Self::CursorActivity => "cursorActivity",
        }
    }
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorEvent {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| AdapterError::UnknownEvent(s.to_string()))
    }
}

/// Handler for [`EditorEvent::Error`]: the error, the offending operation
/// rendered as a string, and where offset tracking diverged.
pub type ErrorHandler = Rc<dyn Fn(&OperationError, &str, &EditorAdapterState)>;
/// Handler for [`EditorEvent::Change`]: the operation and its inverse.
pub type ChangeHandler = Rc<dyn Fn(&TextOperation, &TextOperation)>;
/// Handler for the payload-free events.
pub type SignalHandler = Rc<dyn Fn()>;

/// A listener for one event kind.
///
/// Cloning a listener clones the handle, not the handler: a clone passed
/// to `off` removes the registration made with the original.
#[derive(Clone)]
pub enum Listener {
    Error(ErrorHandler),
    Blur(SignalHandler),
    Focus(SignalHandler),
    Undo(SignalHandler),
    Redo(SignalHandler),
    Change(ChangeHandler),
    CursorActivity(SignalHandler),
}

impl Listener {
    pub fn error(f: impl Fn(&OperationError, &str, &EditorAdapterState) + 'static) -> Self {
        Self::Error(Rc::new(f))
    }

    pub fn change(f: impl Fn(&TextOperation, &TextOperation) + 'static) -> Self {
        Self::Change(Rc::new(f))
    }

    pub fn blur(f: impl Fn() + 'static) -> Self {
        Self::Blur(Rc::new(f))
    }

    pub fn focus(f: impl Fn() + 'static) -> Self {
        Self::Focus(Rc::new(f))
    }

    pub fn undo(f: impl Fn() + 'static) -> Self {
        Self::Undo(Rc::new(f))
    }

    pub fn redo(f: impl Fn() + 'static) -> Self {
        Self::Redo(Rc::new(f))
    }

    pub fn cursor_activity(f: impl Fn() + 'static) -> Self {
        Self::CursorActivity(Rc::new(f))
    }

    /// The event kind this listener handles.
    pub const fn kind(&self) -> EditorEvent {
        match self {
            Self::Error(_) => EditorEvent::Error,
            Self::Blur(_) => EditorEvent::Blur,
            Self::Focus(_) => EditorEvent::Focus,
            Self::Undo(_) => EditorEvent::Undo,
            Self::Redo(_) => EditorEvent::Redo,
            Self::Change(_) => EditorEvent::Change,
            Self::CursorActivity(_) => EditorEvent::CursorActivity,
        }
    }

    /// Whether both listeners wrap the same handler allocation.
    pub fn same_as(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.handler_ptr() == other.handler_ptr()
    }

    fn handler_ptr(&self) -> *const () {
        match self {
            Self::Error(f) => Rc::as_ptr(f).cast(),
            Self::Change(f) => Rc::as_ptr(f).cast(),
            Self::Blur(f)
            | Self::Focus(f)
            | Self::Undo(f)
            | Self::Redo(f)
            | Self::CursorActivity(f) => Rc::as_ptr(f).cast(),
        }
    }

    /// Invoke the handler if `payload` is of this listener's kind.
    pub(crate) fn call(&self, payload: &EventPayload<'_>) {
        match (self, *payload) {
            (
                Self::Error(f),
                EventPayload::Error {
                    error,
                    operation,
                    state,
                },
            ) => f(error, operation, state),
            (Self::Change(f), EventPayload::Change { operation, inverse }) => {
                f(operation, inverse);
            }
            (Self::Blur(f), EventPayload::Blur)
            | (Self::Focus(f), EventPayload::Focus)
            | (Self::Undo(f), EventPayload::Undo)
            | (Self::Redo(f), EventPayload::Redo)
            | (Self::CursorActivity(f), EventPayload::CursorActivity) => f(),
            _ => {}
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&self.kind())
            .field(&self.handler_ptr())
            .finish()
    }
}

/// One occurrence of an event, borrowed for the duration of dispatch.
#[derive(Debug, Clone, Copy)]
pub enum EventPayload<'a> {
    Error {
        error: &'a OperationError,
        operation: &'a str,
        state: &'a EditorAdapterState,
    },
    Blur,
    Focus,
    Undo,
    Redo,
    Change {
        operation: &'a TextOperation,
        inverse: &'a TextOperation,
    },
    CursorActivity,
}

impl EventPayload<'_> {
    pub const fn kind(&self) -> EditorEvent {
        match self {
            Self::Error { .. } => EditorEvent::Error,
            Self::Blur => EditorEvent::Blur,
            Self::Focus => EditorEvent::Focus,
            Self::Undo => EditorEvent::Undo,
            Self::Redo => EditorEvent::Redo,
            Self::Change { .. } => EditorEvent::Change,
            Self::CursorActivity => EditorEvent::CursorActivity,
        }
    }
}

/// A batch of handlers, at most one per event kind.
#[derive(Default, Clone)]
pub struct EditorCallbacks {
    pub error: Option<ErrorHandler>,
    pub blur: Option<SignalHandler>,
    pub focus: Option<SignalHandler>,
    pub undo: Option<SignalHandler>,
    pub redo: Option<SignalHandler>,
    pub change: Option<ChangeHandler>,
    pub cursor_activity: Option<SignalHandler>,
}

impl EditorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_error(
        mut self,
        f: impl Fn(&OperationError, &str, &EditorAdapterState) + 'static,
    ) -> Self {
        self.error = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&TextOperation, &TextOperation) + 'static) -> Self {
        self.change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_blur(mut self, f: impl Fn() + 'static) -> Self {
        self.blur = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_focus(mut self, f: impl Fn() + 'static) -> Self {
        self.focus = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_undo(mut self, f: impl Fn() + 'static) -> Self {
        self.undo = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_redo(mut self, f: impl Fn() + 'static) -> Self {
        self.redo = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_cursor_activity(mut self, f: impl Fn() + 'static) -> Self {
        self.cursor_activity = Some(Rc::new(f));
        self
    }

    /// The present handlers as listeners, in [`EditorEvent::ALL`] order.
    pub fn into_listeners(self) -> Vec<Listener> {
        [
            self.error.map(Listener::Error),
            self.blur.map(Listener::Blur),
            self.focus.map(Listener::Focus),
            self.undo.map(Listener::Undo),
            self.redo.map(Listener::Redo),
            self.change.map(Listener::Change),
            self.cursor_activity.map(Listener::CursorActivity),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl fmt::Debug for EditorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<&str> = self
            .clone()
            .into_listeners()
            .iter()
            .map(|l| l.kind().as_str())
            .collect();
        f.debug_tuple("EditorCallbacks").field(&present).finish()
    }
}
