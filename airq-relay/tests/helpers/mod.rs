//! Test doubles for poller integration tests
//!
//! - ScriptedSource: per-URL queue of canned fetch results
//! - RecordingSink: records published readings, can fail chosen calls

#![allow(dead_code)]

use airq_common::Reading;
use airq_relay::fetcher::{FeedSource, FetchError};
use airq_relay::sink::{PublishError, ReadingSink};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub const FEED_A: &str = "http://feeds.test/a.xml";
pub const FEED_B: &str = "http://feeds.test/b.xml";

/// Feed source returning scripted results in order, per URL
///
/// An exhausted script answers with a network error.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, FetchError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.to_string()));
        self
    }

    pub fn fail(self, url: &str) -> Self {
        self.push(
            url,
            Err(FetchError::Status {
                status: 503,
                url: url.to_string(),
            }),
        );
        self
    }

    fn push(&self, url: &str, result: Result<String, FetchError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(result);
    }

    /// URLs fetched so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(FetchError::Network(format!("no scripted response for {}", url))))
    }
}

/// Sink recording every accepted reading
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Reading>>,
    attempts: Mutex<usize>,
    fail_on: HashSet<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given publish attempts (0-based, counted across cycles)
    pub fn failing_on(attempts: &[usize]) -> Self {
        Self {
            fail_on: attempts.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Reading> {
        self.published.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ReadingSink for RecordingSink {
    async fn publish(&self, reading: &Reading) -> Result<(), PublishError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let current = *attempts;
            *attempts += 1;
            current
        };

        if self.fail_on.contains(&attempt) {
            return Err(PublishError(format!("scripted failure on attempt {}", attempt)));
        }

        self.published.lock().unwrap().push(reading.clone());
        Ok(())
    }
}

/// Wrap items in an RSS 2.0 document
pub fn rss(items: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Air Quality</title>{}</channel></rss>",
        items
    )
}
