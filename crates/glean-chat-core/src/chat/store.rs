//! Observable conversation buffer.
//!
//! The store is the one shared mutable resource in the system. It is meant
//! to be constructed once at application start and passed explicitly to the
//! controller and any rendering collaborator.
//!
//! Notification contract: every mutation takes a snapshot and invokes each
//! listener with that fixed snapshot. A mutation performed from inside a
//! listener callback does not re-enter notification inline; it is deferred
//! and delivered as a fresh cycle after the current one completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::message::{Message, MessageSource, MessageUpdate, NewMessage, Role};

/// Seeded into every fresh store before any other interaction.
pub const WELCOME_MESSAGE: &str = "Welcome to the chat! How can I help you today?";

type ListenerFn = Arc<dyn Fn(&[Message]) + Send + Sync>;

struct Inner {
    messages: Vec<Message>,
    listeners: Vec<(u64, ListenerFn)>,
    next_listener_id: u64,
}

pub struct MessageStore {
    inner: Arc<Mutex<Inner>>,
    notifying: AtomicBool,
    pending: AtomicBool,
}

/// Handle returned by [`MessageStore::subscribe`]; dropping it keeps the
/// listener registered, call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    inner: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl MessageStore {
    pub fn new() -> Self {
        let store = Self {
            inner: Arc::new(Mutex::new(Inner {
                messages: Vec::new(),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            notifying: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        };
        store.add(NewMessage::new(Role::System, WELCOME_MESSAGE).with_source(MessageSource::System));
        store
    }

    /// Append a message, assigning a fresh id and the current time. Notifies
    /// subscribers synchronously and returns the created message so callers
    /// can reference it for later updates.
    pub fn add(&self, message: NewMessage) -> Message {
        let created = Message {
            id: Message::generate_id(),
            role: message.role,
            content: message.content,
            timestamp: Message::current_timestamp(),
            status: message.status,
            source: message.source,
        };
        {
            let mut inner = self.inner.lock().unwrap();
            inner.messages.push(created.clone());
        }
        self.notify();
        created
    }

    /// Merge fields into the message with the given id, preserving its
    /// position. Unknown ids are a no-op and fire no notification.
    pub fn update(&self, id: &str, update: &MessageUpdate) {
        let changed = {
            let mut inner = self.inner.lock().unwrap();
            match inner.messages.iter_mut().find(|m| m.id == id) {
                Some(message) => {
                    update.apply(message);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Defensive copy of the buffer in insertion order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner.lock().unwrap().messages.clone()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().messages.clear();
        self.notify();
    }

    /// Register a listener and immediately invoke it once, synchronously,
    /// with the current snapshot.
    pub fn subscribe(&self, listener: impl Fn(&[Message]) + Send + Sync + 'static) -> Subscription {
        let listener: ListenerFn = Arc::new(listener);
        let id = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, listener.clone()));
            id
        };

        // The initial callback runs under the same guard as a notification
        // cycle so a mutation made inside it is deferred, not recursive.
        let nested = self.notifying.swap(true, Ordering::SeqCst);
        listener(&self.snapshot());
        if !nested {
            self.drain_pending();
            self.notifying.store(false, Ordering::SeqCst);
        }

        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn notify(&self) {
        self.pending.store(true, Ordering::SeqCst);
        if self.notifying.swap(true, Ordering::SeqCst) {
            // A cycle is running; it will pick this mutation up.
            return;
        }
        self.drain_pending();
        self.notifying.store(false, Ordering::SeqCst);
    }

    fn drain_pending(&self) {
        while self.pending.swap(false, Ordering::SeqCst) {
            let (snapshot, listeners) = {
                let inner = self.inner.lock().unwrap();
                let listeners: Vec<ListenerFn> =
                    inner.listeners.iter().map(|(_, l)| l.clone()).collect();
                (inner.messages.clone(), listeners)
            };
            for listener in &listeners {
                listener(&snapshot);
            }
        }
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
