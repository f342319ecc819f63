//! Per-event-kind listener lists.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::events::{EventKind, WalletEvent};

/// Callback invoked for every matching event.
pub type Handler = Arc<dyn Fn(&WalletEvent) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of listeners keyed by [`EventKind`].
///
/// Handlers run synchronously on the dispatching task, in the order they
/// subscribed. The lock is released before handlers run, so a handler may
/// itself subscribe or unsubscribe.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<(SubscriptionId, Handler)>>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&WalletEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered for
    /// `kind`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut guard = self.lock();
        let Some(list) = guard.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        before != list.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().get(&kind).map(Vec::len).unwrap_or_default()
    }

    /// Calls every listener of `event.kind()`.
    ///
    /// A panicking handler is logged and skipped; the remaining handlers
    /// still run.
    pub fn dispatch(&self, event: &WalletEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .lock()
            .get(&kind)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                tracing::error!(event = %kind, "wallet event handler panicked");
            }
        }
    }
}
