//! Error types for the broadcast hub.

use crate::types::SubscriberId;
use thiserror::Error;

/// Main error type for hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Subscriber not registered: {0}")]
    NotRegistered(SubscriberId),

    #[error("Delivery channel unavailable for subscriber {0}")]
    ChannelUnavailable(SubscriberId),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Event source closed")]
    SourceClosed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Thread panicked: {0}")]
    ThreadPanicked(String),
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        HubError::Serialization(e.to_string())
    }
}

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
