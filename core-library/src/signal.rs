//! Synchronous observer registry
//!
//! A `Signal` is the in-process counterpart of the runtime event bus: slots
//! are invoked immediately, on the emitting thread, in registration order.
//! The view layer relies on that to invalidate its ordering before the
//! mutating call returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned by [`Signal::connect`], used to disconnect the slot later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Slot<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Signal<T> {
    next_id: AtomicU64,
    slots: Mutex<Vec<(SubscriptionId, Slot<T>)>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Register a slot. It stays connected until [`Signal::disconnect`].
    pub fn connect<F>(&self, slot: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(slot)));
        id
    }

    /// Remove a slot. Returns `false` if the id was unknown.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        slots.len() != before
    }

    /// Invoke every connected slot with `value`.
    ///
    /// The slot list is snapshotted first, so a slot may connect or
    /// disconnect others without deadlocking.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Slot<T>> = self.lock().iter().map(|(_, slot)| slot.clone()).collect();
        for slot in snapshot {
            slot(value);
        }
    }

    pub fn slot_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Slot<T>)>> {
        // Slots never run under this lock, so poisoning carries no torn state.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slot_count", &self.slot_count())
            .finish()
    }
}
