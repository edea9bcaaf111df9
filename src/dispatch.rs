//! Dispatch loop: offers each source event to every registered subscriber.

use crate::error::{HubError, Result};
use crate::subscriptions::Registry;
use crate::types::Event;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Result of dispatching a single event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Subscribers that accepted the event.
    pub delivered: usize,
    /// Subscribers whose channel was saturated.
    pub dropped: usize,
}

/// Cumulative dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub events: u64,
    pub delivered: u64,
    pub dropped: u64,
}

/// Broadcasts events into subscribers' delivery channels without ever
/// blocking on them.
pub struct Dispatcher {
    registry: Arc<Registry>,
    events: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            events: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Offer `event` to every registered subscriber.
    ///
    /// A subscriber whose channel is full misses the event. That is policy,
    /// not failure: it is counted and nothing else.
    pub fn dispatch(&self, event: &Event) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        self.registry.for_each(|_, channel| {
            if channel.try_deliver(event) {
                outcome.delivered += 1;
            } else {
                outcome.dropped += 1;
            }
        });

        self.events.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
        self.dropped
            .fetch_add(outcome.dropped as u64, Ordering::Relaxed);
        outcome
    }

    /// Drain `source` one event at a time until it closes.
    ///
    /// There is a single source and no restart, so a closed source is fatal.
    pub fn run(&self, source: Receiver<Event>) -> Result<()> {
        for event in source.iter() {
            self.dispatch(&event);
        }
        tracing::error!("event source closed, dispatch loop stopping");
        Err(HubError::SourceClosed)
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            events: self.events.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

/// Run `dispatcher` against `source` on a dedicated thread.
pub fn spawn_dispatcher(
    dispatcher: Arc<Dispatcher>,
    source: Receiver<Event>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = thread::Builder::new()
        .name("livetail-dispatch".to_string())
        .spawn(move || dispatcher.run(source))?;
    Ok(handle)
}
