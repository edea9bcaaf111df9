//! # Livetail
//!
//! A single-process broadcast hub: one event source fanned out to any number
//! of concurrently connected streaming subscribers.
//!
//! ## Core Concepts
//!
//! - **Registry**: Subscriber id to delivery channel, behind one lock
//! - **Dispatcher**: Offers each event to every subscriber, never blocking
//! - **Session**: One per connection; registers, streams, deregisters once
//! - **Transport**: Where a session writes events (e.g. server-sent events)
//!
//! Delivery is live-tail only. A subscriber that is not ready when an event
//! is dispatched misses it; nothing is replayed.
//!
//! ## Example
//!
//! ```ignore
//! use livetail::{cancellation, Hub, HubConfig, SseTransport};
//!
//! let hub = Hub::with_clock(HubConfig::default())?;
//!
//! // Per connection, from the HTTP layer:
//! let (cancel, signal) = cancellation();
//! let end = hub.serve(SseTransport::new(response_body), signal)?;
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod hub;
pub mod source;
pub mod subscriptions;
pub mod transport;
pub mod types;

// Re-exports
pub use config::HubConfig;
pub use dispatch::{spawn_dispatcher, DispatchOutcome, DispatchStats, Dispatcher};
pub use error::{HubError, Result};
pub use hub::{Hub, HubStats};
pub use source::{spawn_source, ClockSource};
pub use subscriptions::{
    cancellation, spawn_session, CancelHandle, CancelSignal, DeliveryChannel, Registry,
    RegistryStats, Session, SessionEnd, SessionHandle, SessionState,
};
pub use transport::{SseTransport, Transport, SSE_HEADERS};
pub use types::*;
