//! Event types for the airq event system
//!
//! Provides the shared event definitions and the EventBus that fans published
//! readings out to every live subscriber.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::reading::{Pollutant, Reading};

/// airq event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AirqEvent {
    /// A reading was extracted from the feed and republished
    ///
    /// Triggers:
    /// - SSE: Update dashboards (value, quality, location, agency)
    ReadingPublished {
        /// Pollutant category
        pollutant: Pollutant,
        /// Air Quality Index
        aqi: i64,
        /// Quality label
        quality: String,
        /// Place name
        location: String,
        /// Reporting agency
        agency: String,
        /// Publication instant of the feed item
        observed_at: DateTime<Utc>,
        /// When the reading was published
        timestamp: DateTime<Utc>,
    },

    /// One poll cycle finished
    ///
    /// Diagnostic summary; sent whether or not anything was published.
    PollCycleCompleted {
        /// Feeds fetched successfully
        feeds_fetched: usize,
        /// Feeds whose fetch failed
        fetch_failures: usize,
        /// Feeds whose body was not a usable document
        malformed_documents: usize,
        /// Readings handed to the sink successfully
        published: usize,
        /// Readings the sink rejected
        publish_failures: usize,
        /// Candidates dropped for an unknown pollutant phrase
        unclassified: usize,
        /// Delay before the next cycle (milliseconds)
        next_delay_ms: u64,
        /// When the cycle completed
        timestamp: DateTime<Utc>,
    },

    /// A feed could not be fetched
    FeedFetchFailed {
        /// Feed URL
        url: String,
        /// Error description
        error: String,
        /// When the failure was observed
        timestamp: DateTime<Utc>,
    },
}

impl AirqEvent {
    /// Build a `ReadingPublished` event stamped with the current time
    pub fn reading_published(reading: &Reading) -> Self {
        AirqEvent::ReadingPublished {
            pollutant: reading.pollutant,
            aqi: reading.aqi,
            quality: reading.quality.clone(),
            location: reading.location.clone(),
            agency: reading.agency.clone(),
            observed_at: reading.observed_at,
            timestamp: crate::time::now(),
        }
    }

    /// Get event type as string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            AirqEvent::ReadingPublished { .. } => "ReadingPublished",
            AirqEvent::PollCycleCompleted { .. } => "PollCycleCompleted",
            AirqEvent::FeedFetchFailed { .. } => "FeedFetchFailed",
        }
    }
}

// ============================================================================
// EventBus Implementation
// ============================================================================

/// Broadcast bus for AirqEvent
///
/// Thin wrapper over `tokio::sync::broadcast`: every subscriber receives
/// every event emitted after it subscribed. Slow subscribers lag and lose the
/// oldest events rather than blocking the emitter.
///
/// # Examples
///
/// ```
/// use airq_common::events::EventBus;
///
/// let event_bus = EventBus::new(100);
/// let _rx = event_bus.subscribe();
/// assert_eq!(event_bus.subscriber_count(), 1);
/// ```
pub struct EventBus {
    tx: broadcast::Sender<AirqEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AirqEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: AirqEvent) -> Result<usize, broadcast::error::SendError<AirqEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: AirqEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_reading() -> Reading {
        Reading {
            location: "Antelope Vly, CA".to_string(),
            pollutant: Pollutant::Ozone,
            aqi: 42,
            quality: "Good".to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            agency: "Antelope Valley AQMD".to_string(),
        }
    }

    #[test]
    fn test_reading_published_carries_reading_fields() {
        let event = AirqEvent::reading_published(&sample_reading());
        assert_eq!(event.event_type(), "ReadingPublished");

        match event {
            AirqEvent::ReadingPublished {
                pollutant,
                aqi,
                quality,
                location,
                agency,
                ..
            } => {
                assert_eq!(pollutant, Pollutant::Ozone);
                assert_eq!(aqi, 42);
                assert_eq!(quality, "Good");
                assert_eq!(location, "Antelope Vly, CA");
                assert_eq!(agency, "Antelope Valley AQMD");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_event_serialization_tagged() {
        let event = AirqEvent::reading_published(&sample_reading());
        let json = serde_json::to_string(&event).expect("Event serialization should succeed");
        assert!(json.contains("\"type\":\"ReadingPublished\""));
        assert!(json.contains("\"pollutant\":\"Ozone\""));
        assert!(json.contains("\"aqi\":42"));
    }

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_emit_without_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(AirqEvent::reading_published(&sample_reading())).is_err());
        // Lossy variant never fails
        bus.emit_lossy(AirqEvent::reading_published(&sample_reading()));
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let delivered = bus
            .emit(AirqEvent::reading_published(&sample_reading()))
            .expect("emit should succeed");
        assert_eq!(delivered, 2);

        assert_eq!(rx1.try_recv().unwrap().event_type(), "ReadingPublished");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "ReadingPublished");
    }
}
