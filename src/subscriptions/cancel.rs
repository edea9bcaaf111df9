//! Connection cancellation signal.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use std::time::Duration;

/// Create a linked cancel handle and signal.
///
/// The signal fires when [`CancelHandle::cancel`] is called or when the
/// handle is dropped.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (trigger, receiver) = bounded(0);
    (
        CancelHandle {
            trigger: Mutex::new(Some(trigger)),
        },
        CancelSignal { receiver },
    )
}

/// Owning side of a cancellation pair, held by whoever owns the connection.
pub struct CancelHandle {
    trigger: Mutex<Option<Sender<()>>>,
}

impl CancelHandle {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        // Nothing is ever sent; dropping the only sender disconnects every
        // signal, which wakes any pending select immediately.
        self.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.trigger.lock().is_none()
    }
}

/// Observing side of a cancellation pair.
#[derive(Clone)]
pub struct CancelSignal {
    pub(crate) receiver: Receiver<()>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Block until cancelled or `timeout` elapses. Returns true if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}
