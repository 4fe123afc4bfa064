//! Publish sinks
//!
//! The poller only knows `ReadingSink`. `BroadcastSink` is the transport used
//! by the relay binary: it fans readings out over the EventBus (and from there
//! to SSE clients) and keeps the last reading per pollutant for late joiners.

use airq_common::events::{AirqEvent, EventBus};
use airq_common::{Pollutant, Reading};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// A sink failed to accept or deliver one reading
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Publish failed: {0}")]
pub struct PublishError(pub String);

/// Destination for published readings
#[async_trait]
pub trait ReadingSink: Send + Sync {
    /// Deliver one reading to all current listeners
    async fn publish(&self, reading: &Reading) -> Result<(), PublishError>;
}

/// EventBus-backed sink with a last-known-reading snapshot
pub struct BroadcastSink {
    bus: Arc<EventBus>,
    latest: RwLock<HashMap<Pollutant, Reading>>,
}

impl BroadcastSink {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Last reading per pollutant, in PM2.5 / Ozone / PM10 order
    pub async fn latest(&self) -> Vec<Reading> {
        let latest = self.latest.read().await;
        Pollutant::ALL
            .iter()
            .filter_map(|p| latest.get(p).cloned())
            .collect()
    }
}

#[async_trait]
impl ReadingSink for BroadcastSink {
    async fn publish(&self, reading: &Reading) -> Result<(), PublishError> {
        self.latest
            .write()
            .await
            .insert(reading.pollutant, reading.clone());

        // No connected listeners is normal for a live feed
        match self.bus.emit(AirqEvent::reading_published(reading)) {
            Ok(count) => debug!("Broadcast {} reading to {} clients", reading.pollutant, count),
            Err(_) => debug!("No clients connected for {} reading", reading.pollutant),
        }
        Ok(())
    }
}
