use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use seatalk_messages::Registry;
use seatalk_transport::{BusBridge, BusStream};
use tracing::info;

use crate::bus::{Bus, BusConfig};
use crate::error::Result;

/// Accepts bus sessions on a bridge socket.
///
/// Every accepted connection becomes a [`Bus`] sharing the listener's
/// registry.
pub struct BusListener {
    bridge: BusBridge,
    registry: Arc<Registry>,
    config: BusConfig,
    accepted: AtomicU64,
}

impl BusListener {
    /// Bind to a Unix domain socket path.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let bridge = BusBridge::bind(path)?;
        Ok(Self {
            bridge,
            registry: Arc::new(Registry::builtin()),
            config: BusConfig::default(),
            accepted: AtomicU64::new(0),
        })
    }

    /// Share a registry with accepted sessions.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Override session config for accepted sessions.
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Accept the next connection.
    pub fn accept(&self) -> Result<Bus<BusStream, BusStream>> {
        let stream = self.bridge.accept()?;
        let n = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
        info!(session = n, path = %self.path().display(), "accepted bus session");
        Bus::from_stream(stream, Arc::clone(&self.registry), self.config.clone())
    }

    /// Number of sessions accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Bound socket path.
    pub fn path(&self) -> &Path {
        self.bridge.path()
    }
}
