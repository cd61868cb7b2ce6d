// ABOUTME: Synchronous publish/subscribe channel owned by a single component.
// ABOUTME: Subscriptions unsubscribe on drop; optional last-value replay for late subscribers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Listener<T> = Box<dyn FnMut(&T)>;

struct Inner<T> {
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
    emit_last_value: bool,
    last_value: Option<T>,
    pending: VecDeque<T>,
    delivering: bool,
    removed: Vec<u64>,
    disposed: bool,
}

/// Fan-out event channel.
///
/// Delivery is synchronous and in subscription order. Firing from inside a
/// listener queues the event behind the one currently being delivered, so
/// every listener sees events in the order they were fired.
pub struct Emitter<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: Clone + 'static> Emitter<T> {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Emitter that replays its most recent event to each new subscriber
    pub fn with_last_value() -> Self {
        Self::build(true)
    }

    fn build(emit_last_value: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                listeners: Vec::new(),
                next_id: 0,
                emit_last_value,
                last_value: None,
                pending: VecDeque::new(),
                delivering: false,
                removed: Vec::new(),
                disposed: false,
            })),
        }
    }

    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let mut listener: Listener<T> = Box::new(listener);

        let replay = {
            let inner = self.inner.borrow();
            if inner.disposed {
                return Subscription::empty();
            }
            if inner.emit_last_value {
                inner.last_value.clone()
            } else {
                None
            }
        };
        if let Some(value) = replay {
            listener(&value);
        }

        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            id
        };

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.borrow_mut();
                    inner.listeners.retain(|(listener_id, _)| *listener_id != id);
                    if inner.delivering {
                        inner.removed.push(id);
                    }
                }
            })),
        }
    }

    pub fn fire(&self, event: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            if inner.emit_last_value {
                inner.last_value = Some(event.clone());
            }
            inner.pending.push_back(event);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        loop {
            let (event, mut listeners) = {
                let mut inner = self.inner.borrow_mut();
                match inner.pending.pop_front() {
                    Some(event) => (event, std::mem::take(&mut inner.listeners)),
                    None => {
                        inner.delivering = false;
                        return;
                    }
                }
            };

            for (id, listener) in listeners.iter_mut() {
                let unsubscribed = self.inner.borrow().removed.contains(id);
                if unsubscribed {
                    continue;
                }
                listener(&event);
            }

            let mut inner = self.inner.borrow_mut();
            // Listeners subscribed during delivery landed in the emptied vec
            let added = std::mem::take(&mut inner.listeners);
            listeners.extend(added);
            let removed = std::mem::take(&mut inner.removed);
            listeners.retain(|(id, _)| !removed.contains(id));
            if inner.disposed {
                listeners.clear();
                inner.pending.clear();
            }
            inner.listeners = listeners;
        }
    }

    /// Most recent event, if this emitter caches one
    pub fn last_value(&self) -> Option<T> {
        self.inner.borrow().last_value.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Drop all listeners and ignore any later `fire`
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.disposed = true;
        inner.listeners.clear();
        inner.last_value = None;
    }
}

impl<T: Clone + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Emitter")
            .field("listeners", &inner.listeners.len())
            .field("emit_last_value", &inner.emit_last_value)
            .field("disposed", &inner.disposed)
            .finish()
    }
}

/// Handle to a subscription; the listener is removed when this is dropped
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn empty() -> Self {
        Self { release: None }
    }

    /// Keep the listener for the emitter's whole lifetime
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
