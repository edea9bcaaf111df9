//! Failure containment and session termination tests.

use livetail::{
    cancellation, Dispatcher, Event, Hub, HubConfig, HubError, Registry, Result, Session,
    SessionEnd, SessionState, SseTransport,
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not met within timeout");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Writer whose peer has hung up.
struct ClosedSocket;

impl Write for ClosedSocket {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- Transport Failures ---

#[test]
fn test_transport_failure_is_local_to_session() {
    init_tracing();
    let registry = Arc::new(Registry::with_channel_capacity(1));
    let dispatcher = Dispatcher::new(Arc::clone(&registry));

    let broken = livetail::spawn_session(Arc::clone(&registry), SseTransport::new(ClosedSocket))
        .unwrap();
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let healthy = livetail::spawn_session(Arc::clone(&registry), move |_: &Event| -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();
    wait_until(|| registry.len() == 2);

    dispatcher.dispatch(&Event::from("e1"));
    wait_until(|| broken.is_finished());

    let end = broken.join().unwrap();
    assert!(matches!(end, SessionEnd::TransportFailed { .. }));
    assert_eq!(registry.len(), 1);
    wait_until(|| received.load(Ordering::SeqCst) == 1);

    // The dispatcher keeps serving the remaining subscriber.
    dispatcher.dispatch(&Event::from("e2"));
    wait_until(|| received.load(Ordering::SeqCst) == 2);

    assert_eq!(healthy.shutdown().unwrap(), SessionEnd::Cancelled);
}

#[test]
fn test_transport_error_message_preserved() {
    let registry = Arc::new(Registry::with_channel_capacity(1));
    let dispatcher = Dispatcher::new(Arc::clone(&registry));
    let session = livetail::spawn_session(Arc::clone(&registry), SseTransport::new(ClosedSocket))
        .unwrap();
    wait_until(|| registry.contains(session.id()));

    dispatcher.dispatch(&Event::from("e1"));
    match session.join().unwrap() {
        SessionEnd::TransportFailed { error } => assert!(error.contains("connection closed")),
        other => panic!("Expected TransportFailed, got {:?}", other),
    }
}

// --- Deregistration ---

#[test]
fn test_deregistration_exactly_once_per_session() {
    init_tracing();
    let registry = Arc::new(Registry::with_channel_capacity(1));
    let dispatcher = Dispatcher::new(Arc::clone(&registry));

    let mut cancelled = Vec::new();
    let mut failing = Vec::new();
    for i in 0..10 {
        if i % 2 == 0 {
            cancelled.push(
                livetail::spawn_session(Arc::clone(&registry), |_: &Event| -> Result<()> {
                    Ok(())
                })
                .unwrap(),
            );
        } else {
            failing.push(
                livetail::spawn_session(Arc::clone(&registry), |_: &Event| -> Result<()> {
                    Err(HubError::Transport("reset".to_string()))
                })
                .unwrap(),
            );
        }
    }
    wait_until(|| registry.len() == 10);

    dispatcher.dispatch(&Event::from("kick"));
    for session in failing {
        wait_until(|| session.is_finished());
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(matches!(
            session.join().unwrap(),
            SessionEnd::TransportFailed { .. }
        ));
    }
    for session in cancelled {
        assert_eq!(session.shutdown().unwrap(), SessionEnd::Cancelled);
    }

    let stats = registry.stats();
    assert_eq!(stats.registered, 10);
    assert_eq!(stats.deregistered, 10);
    assert_eq!(stats.active, 0);
}

#[test]
fn test_panicking_transport_still_deregisters() {
    let registry = Arc::new(Registry::with_channel_capacity(1));
    let dispatcher = Dispatcher::new(Arc::clone(&registry));
    let session = livetail::spawn_session(Arc::clone(&registry), |_: &Event| -> Result<()> {
        panic!("transport bug");
    })
    .unwrap();
    wait_until(|| registry.contains(session.id()));

    dispatcher.dispatch(&Event::from("e1"));
    assert!(matches!(session.join(), Err(HubError::ThreadPanicked(_))));
    assert!(registry.is_empty());
    assert_eq!(registry.stats().deregistered, 1);
}

#[test]
fn test_serve_on_caller_thread() {
    let hub = Hub::start(HubConfig::default(), std::iter::empty()).unwrap();
    let (cancel, signal) = cancellation();
    cancel.cancel();

    let end = hub.serve(SseTransport::new(Vec::new()), signal).unwrap();
    assert_eq!(end, SessionEnd::Cancelled);
    assert_eq!(hub.stats().registry.deregistered, 1);
    assert!(matches!(hub.join(), Err(HubError::SourceClosed)));
}

#[test]
fn test_session_run_cancelled_from_other_thread() {
    let registry = Arc::new(Registry::new());
    let (cancel, signal) = cancellation();
    let session = Session::new(Arc::clone(&registry), signal, SseTransport::new(Vec::new()));
    let id = session.id();

    let canceller = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            wait_until(|| registry.contains(id));
            cancel.cancel();
        })
    };

    assert_eq!(session.run().unwrap(), SessionEnd::Cancelled);
    canceller.join().unwrap();
    assert!(!registry.contains(id));
}

// --- Registry Misuse ---

#[test]
fn test_del_unknown_subscriber() {
    let registry = Registry::new();
    let id = registry.next_id();
    assert!(matches!(registry.del(id), Err(HubError::NotRegistered(_))));
}
