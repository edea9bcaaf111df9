//! Subscriber registry and sessions.
//!
//! Each connected subscriber owns one [`Session`]. The session registers a
//! private delivery channel in the shared [`Registry`], forwards whatever the
//! dispatcher manages to deliver into it, and deregisters on the way out:
//! - Cancellation through the connection's [`CancelSignal`]
//! - Transport write failure
//! - The delivery channel closing underneath it
//!
//! Delivery channels are bounded. The dispatcher never waits on them, so a
//! subscriber that is not ready simply misses events.
//!
//! # Example
//!
//! ```ignore
//! let registry = Arc::new(Registry::with_channel_capacity(1));
//! let (cancel, signal) = cancellation();
//!
//! let session = Session::new(registry.clone(), signal, SseTransport::new(stream));
//! match session.run()? {
//!     SessionEnd::Cancelled => println!("client went away"),
//!     SessionEnd::TransportFailed { error } => println!("write failed: {}", error),
//!     SessionEnd::Closed => println!("channel closed"),
//! }
//! ```

mod cancel;
mod registry;
mod session;
mod types;

pub use cancel::{cancellation, CancelHandle, CancelSignal};
pub use registry::{DeliveryChannel, Registry};
pub use session::{spawn_session, Session, SessionHandle};
pub use types::{RegistryStats, SessionEnd, SessionState};
