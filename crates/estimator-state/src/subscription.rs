//! State subscription system.

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;
use uuid::Uuid;

/// A state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChangeEvent<T> {
    /// Monotonic sequence number of the transition within its container.
    pub sequence: u64,

    /// Value before the transition.
    pub previous: T,

    /// Value after the transition.
    pub current: T,

    /// Timestamp of the change.
    pub timestamp: DateTime<Utc>,
}

/// A subscription to state transitions.
///
/// Events published before the subscription was created are not replayed; use
/// [`crate::ObservableState::get`] for the value at subscription time.
pub struct StateSubscription<T> {
    /// Unique ID for this subscription.
    pub id: Uuid,

    /// Receiver for events.
    receiver: broadcast::Receiver<StateChangeEvent<T>>,
}

impl<T: Clone + Send + 'static> StateSubscription<T> {
    pub(crate) fn new(receiver: broadcast::Receiver<StateChangeEvent<T>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            receiver,
        }
    }

    /// Wait for the next transition.
    ///
    /// Returns `None` once the owning container is dropped. A slow subscriber
    /// that falls behind skips the missed transitions and keeps going.
    pub async fn next(&mut self) -> Option<StateChangeEvent<T>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(subscription = %self.id, missed, "State subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next transition if one is already queued.
    pub fn try_next(&mut self) -> Option<StateChangeEvent<T>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Convert into a stream of transitions.
    pub fn into_stream(self) -> impl Stream<Item = StateChangeEvent<T>> {
        let id = self.id;
        BroadcastStream::new(self.receiver).filter_map(move |item| async move {
            match item {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!(subscription = %id, missed, "State subscriber lagged");
                    None
                }
            }
        })
    }
}
