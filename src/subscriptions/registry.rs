//! Subscriber registry: the single point of serialization between
//! registration churn and broadcast iteration.

use crate::error::{HubError, Result};
use crate::types::{Event, SubscriberId};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::RegistryStats;

/// A subscriber's private delivery channel.
///
/// The registry owns the sending side. The session that registered it is
/// the only reader.
pub struct DeliveryChannel {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl DeliveryChannel {
    fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Offer an event without blocking. Returns false if the event was dropped
    /// because the channel is saturated.
    pub fn try_deliver(&self, event: &Event) -> bool {
        match self.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Number of events waiting to be read.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Channel capacity (0 for a rendezvous channel).
    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }
}

struct Inner {
    entries: HashMap<SubscriberId, DeliveryChannel>,
    registered: u64,
    deregistered: u64,
}

/// Concurrency-safe map from subscriber id to delivery channel.
///
/// Every operation, iteration included, takes the same non-reentrant lock.
/// The lock is never held across a blocking send or a wait.
pub struct Registry {
    inner: Mutex<Inner>,
    /// Counter for issuing subscriber ids.
    next_id: AtomicU64,
    /// Capacity of channels created by `add`.
    channel_capacity: usize,
}

impl Registry {
    /// Create a registry whose delivery channels are rendezvous channels.
    pub fn new() -> Self {
        Self::with_channel_capacity(0)
    }

    /// Create a registry whose delivery channels buffer up to `capacity` events.
    pub fn with_channel_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                registered: 0,
                deregistered: 0,
            }),
            next_id: AtomicU64::new(1),
            channel_capacity: capacity,
        }
    }

    /// Issue a fresh subscriber id.
    pub fn next_id(&self) -> SubscriberId {
        SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Register `id` with a fresh delivery channel.
    ///
    /// Ids must be unique. Re-adding a live id replaces its entry and closes
    /// the previous channel.
    pub fn add(&self, id: SubscriberId) {
        let channel = DeliveryChannel::new(self.channel_capacity);
        let mut inner = self.inner.lock();
        inner.registered += 1;
        if inner.entries.insert(id, channel).is_some() {
            tracing::warn!(subscriber = %id, "duplicate subscriber registration replaced existing entry");
        } else {
            tracing::debug!(subscriber = %id, "subscriber registered");
        }
    }

    /// Get the receiving side of `id`'s delivery channel.
    pub fn get(&self, id: SubscriberId) -> Option<Receiver<Event>> {
        self.inner
            .lock()
            .entries
            .get(&id)
            .map(|channel| channel.receiver.clone())
    }

    /// Close `id`'s delivery channel and remove it.
    pub fn del(&self, id: SubscriberId) -> Result<()> {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner.entries.remove(&id);
            if removed.is_some() {
                inner.deregistered += 1;
            }
            removed
        };

        // Dropping the entry drops the only sender, which closes the channel.
        match removed {
            Some(_) => {
                tracing::debug!(subscriber = %id, "subscriber deregistered");
                Ok(())
            }
            None => Err(HubError::NotRegistered(id)),
        }
    }

    /// Visit every entry under a single critical section.
    ///
    /// The lock is held for the whole visit and is not reentrant: a visitor
    /// that calls back into the registry (`add`, `del`, `get`, ...) deadlocks.
    /// Callers must keep visitors to [`DeliveryChannel`] operations.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(SubscriberId, &DeliveryChannel),
    {
        let inner = self.inner.lock();
        for (id, channel) in inner.entries.iter() {
            visit(*id, channel);
        }
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.lock().entries.contains_key(&id)
    }

    /// Currently registered ids, sorted.
    pub fn ids(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<_> = self.inner.lock().entries.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.lock();
        RegistryStats {
            active: inner.entries.len(),
            registered: inner.registered,
            deregistered: inner.deregistered,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
