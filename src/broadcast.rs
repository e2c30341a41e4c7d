use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Single-writer, many-reader handoff of the latest value.
///
/// The cell holds one pending [`Marker`]. `publish` resolves it and installs
/// a fresh one; readers that grabbed the old marker see exactly that value,
/// however late they look. It is not a queue: a slow reader that comes back
/// after several publishes waits for the next one and never sees a backlog.
pub struct Broadcast<T> {
    pending: Mutex<Arc<Slot<T>>>,
}

struct Slot<T> {
    value: OnceLock<Arc<T>>,
    notify: Notify,
}

impl<T> Slot<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self { value: OnceLock::new(), notify: Notify::new() })
    }
}

/// A reader's handle on one publish cycle.
pub struct Marker<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Marker<T> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<T> Broadcast<T> {
    pub fn new() -> Self {
        Self { pending: Mutex::new(Slot::new()) }
    }

    /// Resolve the pending marker with `value` and start the next cycle.
    /// Never blocks on readers.
    pub fn publish(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let slot = std::mem::replace(&mut *self.pending.lock(), Slot::new());
        let _ = slot.value.set(value.clone());
        slot.notify.notify_waiters();
        value
    }

    /// The marker the next `publish` will resolve.
    pub fn marker(&self) -> Marker<T> {
        Marker { slot: self.pending.lock().clone() }
    }

    /// Wait for the next published value.
    pub async fn next(&self) -> Arc<T> {
        self.marker().wait().await
    }
}

impl<T> std::default::Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Marker<T> {
    /// Resolves once this marker's cycle is published. Dropping the future
    /// only stops this reader; the marker stays valid for everyone else.
    pub async fn wait(&self) -> Arc<T> {
        loop {
            let notified = self.slot.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(value) = self.slot.value.get() {
                return value.clone();
            }
            notified.await;
        }
    }

    pub fn try_get(&self) -> Option<Arc<T>> {
        self.slot.value.get().cloned()
    }
}
