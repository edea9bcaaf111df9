//! Subscription types shared by the registry and sessions.

use serde::{Deserialize, Serialize};

/// Point-in-time registry counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Subscribers currently registered.
    pub active: usize,
    /// Total `add` calls.
    pub registered: u64,
    /// Total successful `del` calls.
    pub deregistered: u64,
}

/// Lifecycle of a subscriber session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Registering,
    Streaming,
    Terminated,
}

/// Why a session stopped streaming.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SessionEnd {
    /// The connection's cancellation signal fired.
    Cancelled,
    /// Forwarding an event to the transport failed.
    TransportFailed { error: String },
    /// The delivery channel was closed underneath the session.
    Closed,
}
