//! Per-connection subscriber session.

use crate::error::{HubError, Result};
use crate::transport::Transport;
use crate::types::{Event, SubscriberId};
use crossbeam_channel::{select, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::cancel::{cancellation, CancelHandle, CancelSignal};
use super::registry::Registry;
use super::types::{SessionEnd, SessionState};

type StateCell = Arc<Mutex<SessionState>>;

/// Holds a registry entry for the life of a session.
///
/// Dropping it deregisters exactly once, whichever way the session exits.
struct Registration {
    registry: Arc<Registry>,
    id: SubscriberId,
    state: StateCell,
}

impl Registration {
    fn acquire(registry: Arc<Registry>, id: SubscriberId, state: StateCell) -> Self {
        registry.add(id);
        Self {
            registry,
            id,
            state,
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Err(e) = self.registry.del(self.id) {
            tracing::warn!(subscriber = %self.id, error = %e, "deregistration failed");
        }
        *self.state.lock() = SessionState::Terminated;
    }
}

/// One connected subscriber: registers, forwards delivered events to its
/// transport until cancelled or the transport fails, then deregisters.
pub struct Session<T: Transport> {
    registry: Arc<Registry>,
    id: SubscriberId,
    signal: CancelSignal,
    transport: T,
    state: StateCell,
}

impl<T: Transport> Session<T> {
    /// Create a session with a freshly issued id.
    pub fn new(registry: Arc<Registry>, signal: CancelSignal, transport: T) -> Self {
        let id = registry.next_id();
        Self {
            registry,
            id,
            signal,
            transport,
            state: Arc::new(Mutex::new(SessionState::Registering)),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Run the session to completion on the current thread.
    ///
    /// Transport failures and cancellation end the session normally; only a
    /// missing delivery channel right after registration is an error.
    pub fn run(mut self) -> Result<SessionEnd> {
        let registration =
            Registration::acquire(Arc::clone(&self.registry), self.id, Arc::clone(&self.state));

        let channel = self
            .registry
            .get(self.id)
            .ok_or(HubError::ChannelUnavailable(self.id))?;

        *self.state.lock() = SessionState::Streaming;
        let end = self.stream(&channel);

        drop(registration);
        tracing::debug!(subscriber = %self.id, ?end, "session ended");
        Ok(end)
    }

    fn stream(&mut self, channel: &Receiver<Event>) -> SessionEnd {
        let cancelled = self.signal.receiver.clone();
        loop {
            select! {
                recv(cancelled) -> _ => return SessionEnd::Cancelled,
                recv(channel) -> msg => match msg {
                    Ok(event) => {
                        if let Err(e) = self.transport.send(&event) {
                            return SessionEnd::TransportFailed { error: e.to_string() };
                        }
                    }
                    Err(_) => return SessionEnd::Closed,
                },
            }
        }
    }
}

/// Handle to a session running on its own thread.
pub struct SessionHandle {
    id: SubscriberId,
    cancel: CancelHandle,
    state: StateCell,
    thread: JoinHandle<Result<SessionEnd>>,
}

impl SessionHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Fire the session's cancellation signal.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the session to end.
    pub fn join(self) -> Result<SessionEnd> {
        // Keep the cancel handle alive until the thread is joined so that
        // joining an uncancelled session does not cancel it.
        let SessionHandle { cancel, thread, .. } = self;
        let result = thread
            .join()
            .map_err(|_| HubError::ThreadPanicked("subscriber session".to_string()))?;
        drop(cancel);
        result
    }

    /// Cancel the session and wait for it to end.
    pub fn shutdown(self) -> Result<SessionEnd> {
        self.cancel();
        self.join()
    }
}

/// Spawn a session on a dedicated thread.
pub fn spawn_session<T>(registry: Arc<Registry>, transport: T) -> Result<SessionHandle>
where
    T: Transport + Send + 'static,
{
    let (cancel, signal) = cancellation();
    let session = Session::new(registry, signal, transport);
    let id = session.id();
    let state = Arc::clone(&session.state);

    let thread = thread::Builder::new()
        .name(format!("livetail-session-{}", id))
        .spawn(move || session.run())?;

    Ok(SessionHandle {
        id,
        cancel,
        state,
        thread,
    })
}
