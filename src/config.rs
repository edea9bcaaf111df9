//! Hub configuration.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hub configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Capacity of each subscriber's delivery channel.
    /// Default: 0 (rendezvous; an event is only delivered to a subscriber
    /// that is waiting for it).
    pub channel_capacity: usize,

    /// Capacity of the channel between the event source and the dispatcher.
    /// Default: 0
    pub source_capacity: usize,

    /// Cadence of the clock source in milliseconds.
    /// Default: 1000
    pub tick_interval_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 0,
            source_capacity: 0,
            tick_interval_ms: 1000,
        }
    }
}

impl HubConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let config: HubConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(HubError::InvalidConfig(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
