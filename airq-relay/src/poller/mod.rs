//! Feed poller
//!
//! Single sequential worker: fetch every configured feed, extract, publish,
//! sleep, repeat. Failures are absorbed per feed and per reading; the only way
//! out of [`Poller::run`] is the cancellation token.
//!
//! Phases: Idle → Fetching → Extracting → Publishing → Sleeping → Fetching …,
//! with Cancelled reachable at the start of a cycle or during the sleep.

mod backoff;

pub use backoff::Backoff;

use airq_common::events::{AirqEvent, EventBus};
use airq_common::time::duration_to_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::extractor;
use crate::fetcher::FeedSource;
use crate::sink::ReadingSink;

/// Poller settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Feeds fetched each cycle, in order
    pub feed_urls: Vec<String>,
    /// Delay after a cycle without fetch failures
    pub poll_interval: Duration,
    /// Delay after the first cycle with a fetch failure
    pub error_backoff: Duration,
    /// Ceiling for consecutive failing cycles
    pub max_error_backoff: Duration,
}

/// Where the poller currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Extracting,
    Publishing,
    Sleeping,
    Cancelled,
}

/// Outcome of one fetch-extract-publish pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub feeds_fetched: usize,
    pub fetch_failures: usize,
    pub malformed_documents: usize,
    pub published: usize,
    pub publish_failures: usize,
    pub unclassified: usize,
    /// Delay chosen before the next cycle
    pub next_delay: Duration,
}

pub struct Poller {
    config: PollerConfig,
    source: Arc<dyn FeedSource>,
    sink: Arc<dyn ReadingSink>,
    event_bus: Option<Arc<EventBus>>,
    backoff: Backoff,
    phase: PollPhase,
    cycles: u64,
}

impl Poller {
    pub fn new(config: PollerConfig, source: Arc<dyn FeedSource>, sink: Arc<dyn ReadingSink>) -> Self {
        let backoff = Backoff::new(config.error_backoff, config.max_error_backoff);
        Self {
            config,
            source,
            sink,
            event_bus: None,
            backoff,
            phase: PollPhase::Idle,
            cycles: 0,
        }
    }

    /// Also emit diagnostic events (cycle summaries, fetch failures) on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Completed cycles so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one fetch-extract-publish pass over all configured feeds
    ///
    /// Never fails: fetch errors, malformed documents and publish errors are
    /// logged and counted in the report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for url in self.config.feed_urls.clone() {
            self.phase = PollPhase::Fetching;
            let body = match self.source.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url = %url, error = %e, "Feed fetch failed");
                    report.fetch_failures += 1;
                    self.emit(AirqEvent::FeedFetchFailed {
                        url: url.clone(),
                        error: e.to_string(),
                        timestamp: airq_common::time::now(),
                    });
                    continue;
                }
            };
            report.feeds_fetched += 1;

            self.phase = PollPhase::Extracting;
            let extraction = match extractor::extract(&body) {
                Ok(extraction) => extraction,
                Err(e) => {
                    warn!(url = %url, error = %e, "Discarding feed document");
                    report.malformed_documents += 1;
                    continue;
                }
            };
            for phrase in &extraction.unclassified {
                debug!(url = %url, phrase = %phrase, "Dropped unclassifiable pollutant");
            }
            report.unclassified += extraction.unclassified.len();

            self.phase = PollPhase::Publishing;
            for reading in &extraction.readings {
                match self.sink.publish(reading).await {
                    Ok(()) => {
                        info!(
                            "{} = {} AQI ({}) at {}",
                            reading.pollutant, reading.aqi, reading.quality, reading.location
                        );
                        report.published += 1;
                    }
                    Err(e) => {
                        warn!(pollutant = %reading.pollutant, error = %e, "Reading publish failed");
                        report.publish_failures += 1;
                    }
                }
            }
        }

        report.next_delay = if report.fetch_failures > 0 {
            self.backoff.on_failure()
        } else {
            self.backoff.reset();
            self.config.poll_interval
        };

        self.cycles += 1;
        debug!(cycle = self.cycles, ?report, "Poll cycle complete");
        self.emit(AirqEvent::PollCycleCompleted {
            feeds_fetched: report.feeds_fetched,
            fetch_failures: report.fetch_failures,
            malformed_documents: report.malformed_documents,
            published: report.published,
            publish_failures: report.publish_failures,
            unclassified: report.unclassified,
            next_delay_ms: duration_to_millis(report.next_delay),
            timestamp: airq_common::time::now(),
        });

        report
    }

    /// Poll until `cancel` fires
    ///
    /// Cancellation is checked before each cycle and raced against the
    /// inter-cycle sleep, so shutdown waits at most for one in-flight cycle.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            "Poller started: {} feed(s), interval {:?}, error backoff {:?} (max {:?})",
            self.config.feed_urls.len(),
            self.config.poll_interval,
            self.config.error_backoff,
            self.config.max_error_backoff
        );
        if self.config.feed_urls.is_empty() {
            warn!("No feed URLs configured; poller will idle");
        }

        while !cancel.is_cancelled() {
            let report = self.run_cycle().await;

            self.phase = PollPhase::Sleeping;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(report.next_delay) => {}
            }
        }

        self.phase = PollPhase::Cancelled;
        info!("Poller stopped after {} cycles", self.cycles);
    }

    fn emit(&self, event: AirqEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
