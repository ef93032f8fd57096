use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use roomlink_api::models::Reading;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::Stream;
use uuid::Uuid;

pub type SubscriptionId = Uuid;

type Registry = RwLock<HashMap<SubscriptionId, mpsc::Sender<Reading>>>;

/// One dashboard's delivery channel.
///
/// Dropping the subscription removes it from the registry, so a client that
/// goes away is released even when nothing is being published.
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::Receiver<Reading>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Reading> {
        self.receiver.recv().await
    }
}

impl Stream for Subscription {
    type Item = Reading;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Reading>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let id = self.id;

        if let Ok(mut subscribers) = registry.try_write() {
            if subscribers.remove(&id).is_some() {
                tracing::debug!("subscriber {} dropped", id);
            }
            return;
        }

        // Lock is busy; without a runtime the next publish prunes the slot.
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(async move {
                if registry.write().await.remove(&id).is_some() {
                    tracing::debug!("subscriber {} dropped", id);
                }
            });
        }
    }
}

/// Outcome of a single publish.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers found disconnected and removed
    pub pruned: usize,
}

/// Registry of subscribers, each with its own bounded queue.
///
/// Publishing never waits on a subscriber: a full queue loses the reading for
/// that subscriber only.
pub struct Fanout {
    subscribers: Arc<Registry>,
    capacity: usize,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.capacity);

        self.subscribers.write().await.insert(id, sender);
        tracing::debug!("subscriber {} registered", id);

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Removing an unknown id is a no-op.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!("subscriber {} removed", id);
        }

        removed
    }

    pub async fn publish(&self, reading: &Reading) -> PublishReport {
        let mut report = PublishReport::default();
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, sender) in subscribers.iter() {
                match sender.try_send(reading.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        report.dropped += 1;
                        tracing::debug!("subscriber {} is lagging, reading dropped", id);
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                // The slot may already be gone through unsubscribe.
                if subscribers.remove(&id).is_some() {
                    report.pruned += 1;
                    tracing::debug!("subscriber {} disconnected, pruned", id);
                }
            }
        }

        report
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
