//! Subscriber registry with bounded, non-blocking fan-out
//!
//! Each subscriber owns a bounded `mpsc` queue. [`SubscriberRegistry::broadcast`]
//! never waits on a subscriber:
//!
//! - a full queue drops the new message for that subscriber only (drop-newest)
//! - a closed queue is a delivery failure and the subscriber is pruned
//!
//! Structural changes (add, remove, prune) take the write lock; broadcasts
//! share the read lock. Because delivery is `try_send`, no lock is ever held
//! across a suspension point. A subscriber's sender is dropped only after it
//! has been removed under the write lock, so a removed subscriber can never
//! receive another message.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity of a registered subscriber queue
pub type SubscriberId = Uuid;

/// Per-broadcast delivery accounting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers that accepted the message
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers removed because their queue was closed
    pub pruned: usize,
}

/// Thread-safe set of subscriber queues for messages of type `T`
pub struct SubscriberRegistry<T> {
    name: &'static str,
    capacity: usize,
    subscribers: RwLock<Vec<(SubscriberId, mpsc::Sender<T>)>>,
}

impl<T> SubscriberRegistry<T>
where
    T: Clone + Send + 'static,
{
    /// Create a registry whose subscriber queues hold `capacity` messages
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Queue capacity used by [`subscribe`](Self::subscribe)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register an existing queue
    pub fn add(&self, sender: mpsc::Sender<T>) -> SubscriberId {
        let id = Uuid::new_v4();
        let count = {
            let mut subscribers = self.write();
            subscribers.push((id, sender));
            subscribers.len()
        };
        debug!(registry = self.name, subscriber_id = %id, subscribers = count, "Subscriber added");
        id
    }

    /// Deregister a queue. Removing an unknown id is a no-op.
    ///
    /// The removed sender is dropped after the write lock is released, which
    /// closes the queue once no broadcast can reach it.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = {
            let mut subscribers = self.write();
            subscribers
                .iter()
                .position(|(sid, _)| *sid == id)
                .map(|index| subscribers.remove(index))
        };

        match removed {
            Some(_sender) => {
                debug!(registry = self.name, subscriber_id = %id, "Subscriber removed");
                true
            }
            None => false,
        }
    }

    /// Deliver `message` to every registered queue without blocking
    pub fn broadcast(&self, message: &T) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        let mut closed = Vec::new();

        {
            let subscribers = self.read();
            for (id, sender) in subscribers.iter() {
                // reserve first so a full queue costs no clone
                match sender.try_reserve() {
                    Ok(permit) => {
                        permit.send(message.clone());
                        outcome.delivered += 1;
                    }
                    Err(TrySendError::Full(_)) => {
                        outcome.dropped += 1;
                        debug!(registry = self.name, subscriber_id = %id, "Subscriber queue full, message dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.write();
            let before = subscribers.len();
            subscribers.retain(|(id, _)| !closed.contains(id));
            outcome.pruned = before - subscribers.len();
            warn!(
                registry = self.name,
                pruned = outcome.pruned,
                "Pruned subscribers with closed queues"
            );
        }

        outcome
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(SubscriberId, mpsc::Sender<T>)>> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(SubscriberId, mpsc::Sender<T>)>> {
        self.subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> SubscriberRegistry<T>
where
    T: Clone + Send + 'static,
{
    /// Create a queue, register it, and return a guard that deregisters on drop
    pub fn subscribe(self: &Arc<Self>) -> Subscription<T> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = self.add(sender);
        Subscription {
            id,
            registry: Arc::downgrade(self),
            receiver,
        }
    }
}

/// A live registration in a [`SubscriberRegistry`]
///
/// Dropping the subscription removes it from the registry before its queue
/// is released.
pub struct Subscription<T>
where
    T: Clone + Send + 'static,
{
    id: SubscriberId,
    registry: Weak<SubscriberRegistry<T>>,
    receiver: mpsc::Receiver<T>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + 'static,
{
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next broadcast message.
    ///
    /// Returns `None` once the subscription has been removed from its
    /// registry and the queue is drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take a queued message without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T>
where
    T: Clone + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
