//! Single-writer observable state container.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::trace;

use crate::subscription::{StateChangeEvent, StateSubscription};

/// Capacity of the transition broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Holds the current value of some view state and notifies subscribers of
/// every transition.
///
/// Writes are synchronous so they can also happen from `Drop` implementations.
pub struct ObservableState<T> {
    /// Latest value.
    current: watch::Sender<T>,

    /// Sender for broadcasting transitions.
    events: broadcast::Sender<StateChangeEvent<T>>,

    /// Transition counter.
    sequence: AtomicU64,
}

impl<T> ObservableState<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a container holding `initial`.
    pub fn new(initial: T) -> Self {
        let (current, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current,
            events,
            sequence: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Inspect the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.borrow())
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, next: T) -> StateChangeEvent<T> {
        let previous = self.current.send_replace(next.clone());
        self.publish(previous, next)
    }

    /// Replace the value only if `predicate` holds for the current one.
    ///
    /// The check and the write happen under the same lock.
    pub fn replace_if<P>(&self, predicate: P, next: T) -> Option<StateChangeEvent<T>>
    where
        P: FnOnce(&T) -> bool,
    {
        let mut previous = None;
        let stored = next.clone();
        self.current.send_if_modified(|value| {
            if predicate(value) {
                previous = Some(std::mem::replace(value, stored));
                true
            } else {
                false
            }
        });
        previous.map(|previous| self.publish(previous, next))
    }

    /// Subscribe to future transitions.
    pub fn subscribe(&self) -> StateSubscription<T> {
        StateSubscription::new(self.events.subscribe())
    }

    /// Latest-value receiver, for consumers that only care about the newest state.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.current.subscribe()
    }

    /// Number of transitions so far.
    pub fn version(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn publish(&self, previous: T, current: T) -> StateChangeEvent<T> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = StateChangeEvent {
            sequence,
            previous,
            current,
            timestamp: Utc::now(),
        };
        // No subscribers is fine
        match self.events.send(event.clone()) {
            Ok(subscribers) => trace!(sequence, subscribers, "State change published"),
            Err(_) => trace!(sequence, "State change published with no subscribers"),
        }
        event
    }
}

impl<T> Default for ObservableState<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}
