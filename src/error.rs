//! Error types shared by the operation bridge and the adapter surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientId;
use crate::event::EditorEvent;

/// Offset bookkeeping at the moment an operation stopped matching the content.
///
/// Only exists while a failure is being reported; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorAdapterState {
    /// Characters retained before the divergence.
    pub retain: usize,
    /// Characters deleted before the divergence.
    pub skipped_chars: usize,
    /// Length of the content the operation was checked against.
    pub content_length: usize,
}

/// An operation that does not fit the content it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("retain of {requested} chars runs past the end of the document")]
    RetainPastEnd {
        requested: usize,
        state: EditorAdapterState,
    },

    #[error("delete of {requested} chars runs past the end of the document")]
    DeletePastEnd {
        requested: usize,
        state: EditorAdapterState,
    },

    #[error("operation covers {base_len} chars but the document has {}", state.content_length)]
    LengthMismatch {
        base_len: usize,
        state: EditorAdapterState,
    },
}

impl OperationError {
    /// The divergence snapshot carried by every variant.
    pub const fn state(&self) -> EditorAdapterState {
        match self {
            Self::RetainPastEnd { state, .. }
            | Self::DeletePastEnd { state, .. }
            | Self::LengthMismatch { state, .. } => *state,
        }
    }
}

/// Failures surfaced by [`EditorAdapter`](crate::adapter::EditorAdapter) methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("adapter has been disposed")]
    Disposed,

    #[error("a {listener} listener cannot be registered for {event} events")]
    ListenerKindMismatch {
        event: EditorEvent,
        listener: EditorEvent,
    },

    #[error("unknown editor event {0:?}")]
    UnknownEvent(String),

    #[error("invalid color {color:?} for remote cursor of {client}")]
    InvalidColor { client: ClientId, color: String },

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors from parsing the JSON wire form of an operation.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed operation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation component {index} is not a non-zero integer or a string")]
    BadComponent { index: usize },
}
