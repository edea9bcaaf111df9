//! Event sources.
//!
//! Any `IntoIterator<Item = Event>` is a source. [`spawn_source`] pumps it on
//! its own thread into the channel the dispatcher drains.

use crate::error::Result;
use crate::types::Event;
use chrono::{Local, SecondsFormat};
use crossbeam_channel::{bounded, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Emits the current local time, immediately and then once per interval.
///
/// Infinite and non-restartable.
#[derive(Clone, Debug)]
pub struct ClockSource {
    interval: Duration,
    started: bool,
}

impl ClockSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Iterator for ClockSource {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.started {
            thread::sleep(self.interval);
        }
        self.started = true;
        Some(Event::from(
            Local::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        ))
    }
}

/// Pump `source` into a bounded channel on a dedicated thread.
///
/// The thread ends when the source runs dry or the receiver is dropped.
pub fn spawn_source<I>(source: I, capacity: usize) -> Result<(Receiver<Event>, JoinHandle<()>)>
where
    I: IntoIterator<Item = Event>,
    I::IntoIter: Send + 'static,
{
    let (tx, rx) = bounded(capacity);
    let events = source.into_iter();
    let handle = thread::Builder::new()
        .name("livetail-source".to_string())
        .spawn(move || {
            for event in events {
                if tx.send(event).is_err() {
                    tracing::debug!("event source consumer gone");
                    return;
                }
            }
            tracing::warn!("event source exhausted");
        })?;
    Ok((rx, handle))
}
