//! Hub struct tying the source, dispatcher and sessions together.

use crate::config::HubConfig;
use crate::dispatch::{spawn_dispatcher, DispatchStats, Dispatcher};
use crate::error::{HubError, Result};
use crate::source::{spawn_source, ClockSource};
use crate::subscriptions::{
    spawn_session, CancelSignal, Registry, RegistryStats, Session, SessionEnd, SessionHandle,
};
use crate::transport::Transport;
use crate::types::Event;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Combined hub counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    pub registry: RegistryStats,
    pub dispatch: DispatchStats,
}

/// A running broadcast hub.
///
/// Owns one source thread and one dispatch thread for its whole life, and
/// hands out sessions for incoming connections:
/// - [`Hub::subscribe`] runs a session on its own thread
/// - [`Hub::serve`] runs a session on the caller's thread
pub struct Hub {
    config: HubConfig,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
    dispatch_thread: JoinHandle<Result<()>>,
    source_thread: JoinHandle<()>,
}

impl Hub {
    /// Start a hub broadcasting events from `source`.
    pub fn start<I>(config: HubConfig, source: I) -> Result<Self>
    where
        I: IntoIterator<Item = Event>,
        I::IntoIter: Send + 'static,
    {
        config.validate()?;

        let registry = Arc::new(Registry::with_channel_capacity(config.channel_capacity));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));

        let (events, source_thread) = spawn_source(source, config.source_capacity)?;
        let dispatch_thread = spawn_dispatcher(Arc::clone(&dispatcher), events)?;

        tracing::info!(
            channel_capacity = config.channel_capacity,
            source_capacity = config.source_capacity,
            "broadcast hub started"
        );

        Ok(Self {
            config,
            registry,
            dispatcher,
            dispatch_thread,
            source_thread,
        })
    }

    /// Start a hub broadcasting a clock tick at the configured interval.
    pub fn with_clock(config: HubConfig) -> Result<Self> {
        let clock = ClockSource::new(config.tick_interval());
        Self::start(config, clock)
    }

    /// Connect a subscriber whose session runs on its own thread.
    pub fn subscribe<T>(&self, transport: T) -> Result<SessionHandle>
    where
        T: Transport + Send + 'static,
    {
        spawn_session(Arc::clone(&self.registry), transport)
    }

    /// Run a subscriber session on the current thread until `signal` fires
    /// or the transport fails.
    pub fn serve<T: Transport>(&self, transport: T, signal: CancelSignal) -> Result<SessionEnd> {
        Session::new(Arc::clone(&self.registry), signal, transport).run()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            registry: self.registry.stats(),
            dispatch: self.dispatcher.stats(),
        }
    }

    /// Block until the dispatch loop stops.
    ///
    /// The dispatch loop only stops when the source ends, so this returns
    /// [`HubError::SourceClosed`] for a finite source and never returns for an
    /// infinite one.
    pub fn join(self) -> Result<()> {
        let result = self
            .dispatch_thread
            .join()
            .map_err(|_| HubError::ThreadPanicked("dispatch loop".to_string()))?;
        self.source_thread
            .join()
            .map_err(|_| HubError::ThreadPanicked("event source".to_string()))?;
        result
    }
}
