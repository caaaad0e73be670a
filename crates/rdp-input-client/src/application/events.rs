//! Client event bus.
//!
//! Observers register per event kind and get a [`SubscriptionId`] back, which
//! is the only way to unregister.  Delivery is synchronous and in
//! registration order.  A handler that returns an error is logged and
//! skipped; later handlers still run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// The kinds of event a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    Log,
}

/// An event published by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected { url: String },
    Disconnected,
    Error { message: String },
    Log { message: String },
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::Connected { .. } => EventKind::Connected,
            ClientEvent::Disconnected => EventKind::Disconnected,
            ClientEvent::Error { .. } => EventKind::Error,
            ClientEvent::Log { .. } => EventKind::Log,
        }
    }
}

/// Handle returned by [`EventBus::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&ClientEvent) -> anyhow::Result<()> + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Per-kind observer registry with synchronous fan-out.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&ClientEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Removes a subscription.  Returns `false` if `id` was not registered.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Delivers `event` to every handler registered for its kind.
    ///
    /// Handlers run without the registry lock held, so they may call
    /// [`EventBus::on`] or [`EventBus::off`] themselves.
    pub fn emit(&self, event: &ClientEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .lock()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in handlers {
            if let Err(e) = handler(event) {
                warn!("{kind:?} handler failed: {e:#}");
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|s| s.kind == kind).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
