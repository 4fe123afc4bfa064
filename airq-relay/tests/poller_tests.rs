//! Poller integration tests with scripted feed sources and recording sinks

mod helpers;

use airq_common::events::{AirqEvent, EventBus};
use airq_common::{Pollutant, UNKNOWN};
use airq_relay::poller::{PollPhase, Poller, PollerConfig};
use chrono::{TimeZone, Utc};
use helpers::{rss, RecordingSink, ScriptedSource, FEED_A, FEED_B};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(5000);
const ERROR_BACKOFF: Duration = Duration::from_millis(15000);
const MAX_ERROR_BACKOFF: Duration = Duration::from_millis(50000);

fn config(urls: &[&str]) -> PollerConfig {
    PollerConfig {
        feed_urls: urls.iter().map(|u| u.to_string()).collect(),
        poll_interval: POLL_INTERVAL,
        error_backoff: ERROR_BACKOFF,
        max_error_backoff: MAX_ERROR_BACKOFF,
    }
}

fn build_poller(urls: &[&str], source: ScriptedSource, sink: RecordingSink) -> (Poller, Arc<ScriptedSource>, Arc<RecordingSink>) {
    let source = Arc::new(source);
    let sink = Arc::new(sink);
    let poller = Poller::new(config(urls), source.clone(), sink.clone());
    (poller, source, sink)
}

const HEADLINE_FEED: &str = "<rss><channel><item><title>PM2.5 AQI of 17 for Lancaster, CA</title><pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate><description></description></item></channel></rss>";

#[tokio::test]
async fn test_headline_feed_publishes_exactly_one_reading() {
    let (mut poller, _, sink) = build_poller(
        &[FEED_A],
        ScriptedSource::new().respond(FEED_A, HEADLINE_FEED),
        RecordingSink::new(),
    );

    let report = poller.run_cycle().await;

    let published = sink.published();
    assert_eq!(published.len(), 1);
    let reading = &published[0];
    assert_eq!(reading.pollutant, Pollutant::Pm25);
    assert_eq!(reading.aqi, 17);
    assert_eq!(reading.quality, "Good");
    assert_eq!(reading.location, UNKNOWN);
    assert_eq!(reading.agency, UNKNOWN);
    assert_eq!(
        reading.observed_at,
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    );

    assert_eq!(report.published, 1);
    assert_eq!(report.next_delay, POLL_INTERVAL);
}

#[tokio::test]
async fn test_fetch_error_publishes_nothing_and_backs_off() {
    let (mut poller, _, sink) = build_poller(&[FEED_A], ScriptedSource::new().fail(FEED_A), RecordingSink::new());

    let report = poller.run_cycle().await;

    assert!(sink.published().is_empty());
    assert_eq!(sink.attempts(), 0);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.next_delay, ERROR_BACKOFF);
    assert_ne!(report.next_delay, POLL_INTERVAL);
}

#[tokio::test]
async fn test_backoff_doubles_caps_and_resets() {
    let source = ScriptedSource::new()
        .fail(FEED_A)
        .fail(FEED_A)
        .fail(FEED_A)
        .respond(FEED_A, HEADLINE_FEED)
        .fail(FEED_A);
    let (mut poller, _, _) = build_poller(&[FEED_A], source, RecordingSink::new());

    let delays = [
        poller.run_cycle().await.next_delay,
        poller.run_cycle().await.next_delay,
        poller.run_cycle().await.next_delay,
        poller.run_cycle().await.next_delay,
        poller.run_cycle().await.next_delay,
    ];

    assert_eq!(
        delays,
        [
            ERROR_BACKOFF,
            Duration::from_millis(30000),
            MAX_ERROR_BACKOFF,
            POLL_INTERVAL,
            ERROR_BACKOFF,
        ]
    );
    assert_eq!(poller.cycles(), 5);
}

#[tokio::test]
async fn test_publish_failure_does_not_stop_remaining_readings() {
    let feed = rss(
        "<item><description>Good - 10 AQI - Ozone<br />\
         Good - 20 AQI - PM2.5<br />\
         Good - 30 AQI - PM10</description></item>",
    );
    let (mut poller, _, sink) = build_poller(
        &[FEED_A],
        ScriptedSource::new().respond(FEED_A, &feed),
        RecordingSink::failing_on(&[1]),
    );

    let report = poller.run_cycle().await;

    assert_eq!(sink.attempts(), 3);
    let aqis: Vec<i64> = sink.published().iter().map(|r| r.aqi).collect();
    assert_eq!(aqis, vec![10, 30]);
    assert_eq!(report.published, 2);
    assert_eq!(report.publish_failures, 1);
    // Publish failures are not fetch failures
    assert_eq!(report.next_delay, POLL_INTERVAL);
}

#[tokio::test]
async fn test_malformed_document_keeps_normal_cadence() {
    let (mut poller, _, sink) = build_poller(
        &[FEED_A],
        ScriptedSource::new().respond(FEED_A, "<html><body>Service Unavailable</body></html>"),
        RecordingSink::new(),
    );

    let report = poller.run_cycle().await;

    assert!(sink.published().is_empty());
    assert_eq!(report.malformed_documents, 1);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.next_delay, POLL_INTERVAL);
}

#[tokio::test]
async fn test_failing_feed_does_not_block_other_feeds() {
    let source = ScriptedSource::new()
        .fail(FEED_A)
        .respond(FEED_B, &rss("<item><description>Moderate - 70 AQI - Ozone</description></item>"));
    let (mut poller, source, sink) = build_poller(&[FEED_A, FEED_B], source, RecordingSink::new());

    let report = poller.run_cycle().await;

    assert_eq!(source.calls(), vec![FEED_A.to_string(), FEED_B.to_string()]);
    assert_eq!(sink.published().len(), 1);
    assert_eq!(sink.published()[0].aqi, 70);
    assert_eq!(report.feeds_fetched, 1);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.next_delay, ERROR_BACKOFF);
}

#[tokio::test]
async fn test_no_feeds_idles_at_normal_cadence() {
    let (mut poller, source, sink) = build_poller(&[], ScriptedSource::new(), RecordingSink::new());

    let report = poller.run_cycle().await;

    assert!(source.calls().is_empty());
    assert!(sink.published().is_empty());
    assert_eq!(report.next_delay, POLL_INTERVAL);
}

#[tokio::test]
async fn test_cycle_summary_emitted_on_event_bus() {
    let bus = Arc::new(EventBus::new(16));
    let mut rx = bus.subscribe();
    let (poller, _, _) = build_poller(&[FEED_A], ScriptedSource::new().fail(FEED_A), RecordingSink::new());
    let mut poller = poller.with_event_bus(Arc::clone(&bus));

    poller.run_cycle().await;

    match rx.try_recv().unwrap() {
        AirqEvent::FeedFetchFailed { url, .. } => assert_eq!(url, FEED_A),
        other => panic!("expected FeedFetchFailed, got {:?}", other),
    }
    match rx.try_recv().unwrap() {
        AirqEvent::PollCycleCompleted {
            fetch_failures,
            next_delay_ms,
            ..
        } => {
            assert_eq!(fetch_failures, 1);
            assert_eq!(next_delay_ms, 15000);
        }
        other => panic!("expected PollCycleCompleted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_run_stops_promptly_when_cancelled() {
    let (mut poller, _, sink) = build_poller(
        &[FEED_A],
        ScriptedSource::new().respond(FEED_A, HEADLINE_FEED),
        RecordingSink::new(),
    );
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            poller.run(cancel).await;
            poller
        })
    };

    // First cycle completes, then the poller sleeps for POLL_INTERVAL
    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let poller = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("poller should stop well before the poll interval elapses")
        .unwrap();

    assert_eq!(poller.phase(), PollPhase::Cancelled);
    assert_eq!(poller.cycles(), 1);
    assert_eq!(sink.published().len(), 1);
}

#[tokio::test]
async fn test_run_with_cancelled_token_never_fetches() {
    let (mut poller, source, _) = build_poller(&[FEED_A], ScriptedSource::new(), RecordingSink::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    poller.run(cancel).await;

    assert!(source.calls().is_empty());
    assert_eq!(poller.cycles(), 0);
    assert_eq!(poller.phase(), PollPhase::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_run_waits_error_backoff_after_failed_fetch() {
    let source = ScriptedSource::new()
        .fail(FEED_A)
        .respond(FEED_A, HEADLINE_FEED);
    let (mut poller, source, sink) = build_poller(&[FEED_A], source, RecordingSink::new());
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { poller.run(cancel).await })
    };

    // Past the normal cadence: still waiting out the backoff
    tokio::time::sleep(POLL_INTERVAL + Duration::from_millis(1)).await;
    assert_eq!(source.calls().len(), 1);
    assert!(sink.published().is_empty());

    // Past the backoff: second cycle has run
    tokio::time::sleep(ERROR_BACKOFF - POLL_INTERVAL).await;
    assert_eq!(source.calls().len(), 2);
    assert_eq!(sink.published().len(), 1);

    cancel.cancel();
    handle.await.unwrap();
}
