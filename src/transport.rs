//! Transport boundary: where a session hands each event to its connection.
//!
//! The hub never frames or buffers events itself. A [`Transport`] receives one
//! event at a time and must report write failures so the session can end.
//! [`SseTransport`] implements the `text/event-stream` wire format over any
//! [`Write`]; the HTTP layer owning the socket is expected to send
//! [`SSE_HEADERS`] before the first event.

use crate::error::Result;
use crate::types::Event;
use std::io::Write;

/// Response headers for an event-stream connection.
pub const SSE_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "text/event-stream"),
    ("Cache-Control", "no-store"),
];

/// Forwards delivered events to a subscriber's connection.
pub trait Transport {
    /// Send one event as one discrete message. An error ends the session.
    fn send(&mut self, event: &Event) -> Result<()>;
}

impl<F> Transport for F
where
    F: FnMut(&Event) -> Result<()>,
{
    fn send(&mut self, event: &Event) -> Result<()> {
        self(event)
    }
}

/// Server-sent events framing over a byte stream.
///
/// Each payload line becomes a `data:` field and a blank line ends the
/// message. The writer is flushed after every message.
pub struct SseTransport<W: Write> {
    writer: W,
    messages_sent: u64,
}

impl<W: Write> SseTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            messages_sent: 0,
        }
    }

    /// Encode an event as a complete event-stream message.
    pub fn encode(event: &Event) -> String {
        let mut frame = String::with_capacity(event.len() + 8);
        // Clients end a line at CRLF, LF or a lone CR.
        let payload = event.as_str().replace("\r\n", "\n");
        for line in payload.split(|c: char| c == '\n' || c == '\r') {
            frame.push_str("data: ");
            frame.push_str(line);
            frame.push('\n');
        }
        frame.push('\n');
        frame
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for SseTransport<W> {
    fn send(&mut self, event: &Event) -> Result<()> {
        let frame = Self::encode(event);
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;
        self.messages_sent += 1;
        Ok(())
    }
}
