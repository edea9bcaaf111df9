//! Core types shared by the registry, dispatcher and sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Unique identifier for a connected subscriber.
///
/// Issued by [`Registry::next_id`](crate::Registry::next_id) and never reused
/// within the lifetime of that registry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque event payload.
///
/// Cloning is cheap: every subscriber receiving the same event shares one
/// allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Event(Arc<str>);

impl Event {
    /// Create an event from a string payload.
    pub fn new(payload: impl Into<Arc<str>>) -> Self {
        Event(payload.into())
    }

    /// Create an event whose payload is the JSON encoding of `value`.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        let payload = serde_json::to_string(value)?;
        Ok(Event::new(payload))
    }

    /// The payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({:?})", &*self.0)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Event {
    fn from(s: &str) -> Self {
        Event::new(s)
    }
}

impl From<String> for Event {
    fn from(s: String) -> Self {
        Event::new(s)
    }
}

impl PartialEq<&str> for Event {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_clone_shares_payload() {
        let event = Event::from("tick");
        let copy = event.clone();
        assert!(Arc::ptr_eq(&event.0, &copy.0));
        assert_eq!(copy, "tick");
    }

    #[test]
    fn test_event_json() {
        let event = Event::json(&json!({"seq": 1, "kind": "tick"})).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(event.as_str()).unwrap();
        assert_eq!(parsed["seq"], 1);
        assert_eq!(parsed["kind"], "tick");
    }

    #[test]
    fn test_subscriber_id_display() {
        assert_eq!(SubscriberId(42).to_string(), "42");
        assert_eq!(format!("{:?}", SubscriberId(7)), "SubscriberId(7)");
    }
}
