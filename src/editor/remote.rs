//! Decorations for remote participants' cursors.
//!
//! At most one decoration exists per [`ClientId`]. Every decoration gets
//! a fresh generation number; a handle only removes the decoration of the
//! generation it was issued for, so releasing a handle whose decoration
//! was already replaced does nothing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::client::{ClientId, UserColor};
use crate::cursor::Cursor;
use crate::disposable::DisposeHandle;
use crate::operation::TextOperation;

/// One rendered remote cursor or selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCursor {
    pub client_id: ClientId,
    pub cursor: Cursor,
    pub color: UserColor,
    pub name: Option<String>,
    generation: u64,
}

#[derive(Debug, Default)]
struct Decorations {
    by_client: HashMap<ClientId, RemoteCursor>,
    next_generation: u64,
}

/// Registry of remote cursor decorations for one editor.
#[derive(Debug, Clone, Default)]
pub struct RemoteCursors {
    inner: Rc<RefCell<Decorations>>,
}

impl RemoteCursors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `cursor` for `client_id`, replacing its previous decoration.
    pub fn set(
        &self,
        client_id: ClientId,
        cursor: Cursor,
        color: UserColor,
        name: Option<String>,
    ) -> DisposeHandle {
        let generation = {
            let mut decorations = self.inner.borrow_mut();
            let generation = decorations.next_generation;
            decorations.next_generation += 1;
            let replaced = decorations.by_client.insert(
                client_id.clone(),
                RemoteCursor {
                    client_id: client_id.clone(),
                    cursor,
                    color,
                    name,
                    generation,
                },
            );
            if replaced.is_some() {
                tracing::trace!(client = %client_id, "replaced remote cursor decoration");
            }
            generation
        };

        let weak: Weak<RefCell<Decorations>> = Rc::downgrade(&self.inner);
        DisposeHandle::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut decorations = inner.borrow_mut();
            let current = decorations
                .by_client
                .get(&client_id)
                .is_some_and(|d| d.generation == generation);
            if current {
                decorations.by_client.remove(&client_id);
            }
        })
    }

    pub fn get(&self, client_id: &ClientId) -> Option<RemoteCursor> {
        self.inner.borrow().by_client.get(client_id).cloned()
    }

    /// All decorations, ordered by client id.
    pub fn snapshot(&self) -> Vec<RemoteCursor> {
        let mut all: Vec<RemoteCursor> = self.inner.borrow().by_client.values().cloned().collect();
        all.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        all
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().by_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every decoration through an edit of the document.
    pub fn transform_all(&self, op: &TextOperation) {
        for decoration in self.inner.borrow_mut().by_client.values_mut() {
            decoration.cursor = decoration.cursor.transform(op);
        }
    }

    /// Pull every decoration back inside a document of `len` chars.
    pub fn clamp_all(&self, len: usize) {
        for decoration in self.inner.borrow_mut().by_client.values_mut() {
            decoration.cursor = decoration.cursor.clamp(len);
        }
    }

    /// Remove every decoration. Outstanding handles become inert.
    pub fn clear(&self) {
        self.inner.borrow_mut().by_client.clear();
    }
}
