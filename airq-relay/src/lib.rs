//! # airq relay library
//!
//! Polls air-quality RSS/Atom feeds, extracts per-pollutant AQI readings and
//! republishes them to live subscribers over SSE.
//!
//! **Architecture:** `FeedSource` → extractor → `ReadingSink`, driven by a
//! single sequential `Poller` with error backoff.

pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod poller;
pub mod sink;

pub use error::{Error, Result};
