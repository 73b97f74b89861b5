//! Listener registry shared between an adapter and its listeners.
//!
//! Dispatch is synchronous and in registration order. The listener list is
//! snapshotted before a dispatch starts, so listeners may register or
//! unregister (themselves or others) while being invoked: additions wait
//! for the next event, removals take effect immediately.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::AdapterError;
use crate::event::{EditorEvent, EventPayload, Listener};

#[derive(Debug, Clone)]
struct Registration {
    id: u64,
    listener: Listener,
}

#[derive(Debug, Default)]
struct Registry {
    listeners: HashMap<EditorEvent, Vec<Registration>>,
    next_id: u64,
    closed: bool,
}

impl Registry {
    fn is_registered(&self, event: EditorEvent, id: u64) -> bool {
        self.listeners
            .get(&event)
            .is_some_and(|regs| regs.iter().any(|r| r.id == id))
    }
}

/// Cheaply clonable handle to one listener registry.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    inner: Rc<RefCell<Registry>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`.
    ///
    /// # Errors
    /// Fails if the listener's kind is not `event`, or the emitter is closed.
    pub fn on(&self, event: EditorEvent, listener: Listener) -> Result<(), AdapterError> {
        if listener.kind() != event {
            return Err(AdapterError::ListenerKindMismatch {
                event,
                listener: listener.kind(),
            });
        }
        let mut registry = self.inner.borrow_mut();
        if registry.closed {
            return Err(AdapterError::Disposed);
        }
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .listeners
            .entry(event)
            .or_default()
            .push(Registration { id, listener });
        Ok(())
    }

    /// Remove every registration of `listener` for `event`.
    ///
    /// Returns how many registrations were removed; zero is not an error.
    ///
    /// # Errors
    /// Fails if the emitter is closed.
    pub fn off(&self, event: EditorEvent, listener: &Listener) -> Result<usize, AdapterError> {
        let mut registry = self.inner.borrow_mut();
        if registry.closed {
            return Err(AdapterError::Disposed);
        }
        let Some(regs) = registry.listeners.get_mut(&event) else {
            return Ok(0);
        };
        let before = regs.len();
        regs.retain(|r| !r.listener.same_as(listener));
        Ok(before - regs.len())
    }

    /// Deliver `payload` to the listeners of its kind.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, payload: &EventPayload<'_>) -> usize {
        let event = payload.kind();
        let snapshot = {
            let registry = self.inner.borrow();
            if registry.closed {
                return 0;
            }
            registry.listeners.get(&event).cloned().unwrap_or_default()
        };
        tracing::trace!(%event, listeners = snapshot.len(), "dispatching editor event");

        let mut delivered = 0;
        for reg in snapshot {
            let still_registered = {
                let registry = self.inner.borrow();
                !registry.closed && registry.is_registered(event, reg.id)
            };
            if still_registered {
                reg.listener.call(payload);
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of registrations for `event`.
    pub fn listener_count(&self, event: EditorEvent) -> usize {
        self.inner.borrow().listeners.get(&event).map_or(0, Vec::len)
    }

    /// Drop every registration and refuse all further use. Idempotent.
    pub fn close(&self) {
        let mut registry = self.inner.borrow_mut();
        registry.closed = true;
        registry.listeners.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }
}
