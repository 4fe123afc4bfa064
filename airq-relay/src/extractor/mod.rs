//! Feed extractor
//!
//! Turns raw feed text into normalized readings. Pure: no I/O, no blocking.
//!
//! Per item:
//! 1. Location from the description, else from a title that is not a
//!    measurement headline; "Unknown" otherwise
//! 2. Agency from an `Agency:` label in the description; "Unknown" otherwise
//! 3. Shape A triplets (`Good - 42 AQI - Ozone`) from the description
//! 4. Only when step 3 found nothing: Shape B headline
//!    (`PM2.5 AQI of 42 for X, CA`) from the title, quality derived from AQI
//! 5. Pollutant phrases outside {PM2.5, PM10, Ozone} are dropped and reported
//!    in `Extraction::unclassified`

pub mod feed;
pub mod matchers;

use airq_common::{Pollutant, QualityLevel, Reading, UNKNOWN};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use feed::FeedItem;
use matchers::Candidate;

/// Extractor errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Feed bytes are not a usable feed document
    #[error("Malformed feed document: {0}")]
    MalformedDocument(String),
}

/// Result of extracting one feed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Readings in feed item order, then match order within an item
    pub readings: Vec<Reading>,
    /// Pollutant phrases that matched a pattern but no known category
    pub unclassified: Vec<String>,
    /// Number of items in the document
    pub items: usize,
}

/// Extract readings, using the current time for items without a usable date
pub fn extract(raw_feed_text: &str) -> Result<Extraction, ExtractError> {
    extract_at(raw_feed_text, airq_common::time::now())
}

/// Extract readings with an explicit fallback timestamp
pub fn extract_at(raw_feed_text: &str, now: DateTime<Utc>) -> Result<Extraction, ExtractError> {
    let items = feed::parse_feed_items(raw_feed_text)?;

    let mut extraction = Extraction {
        items: items.len(),
        ..Extraction::default()
    };

    for item in &items {
        extract_item(item, now, &mut extraction);
    }

    debug!(
        "Extracted {} readings from {} items ({} unclassified)",
        extraction.readings.len(),
        extraction.items,
        extraction.unclassified.len()
    );
    Ok(extraction)
}

fn extract_item(item: &FeedItem, now: DateTime<Utc>, out: &mut Extraction) {
    let description = item.description.as_deref().unwrap_or("");
    let title = item.title.as_deref().unwrap_or("");

    if description.trim().is_empty() && title.trim().is_empty() {
        return;
    }

    let headline = matchers::match_shape_b(title);

    let location = matchers::find_location(description)
        .or_else(|| {
            if headline.is_none() {
                matchers::find_location(title)
            } else {
                None
            }
        })
        .unwrap_or_else(|| UNKNOWN.to_string());
    let agency = matchers::find_agency(description).unwrap_or_else(|| UNKNOWN.to_string());
    let observed_at = parse_pub_date(item.pub_date.as_deref()).unwrap_or(now);

    let triplets = matchers::match_shape_a(description);
    let candidates: Vec<Candidate<'_>> = if triplets.is_empty() {
        headline.into_iter().collect()
    } else {
        triplets
    };

    for candidate in candidates {
        let Some(pollutant) = Pollutant::classify_phrase(candidate.phrase) else {
            debug!("Unknown pollutant type: {}", candidate.phrase);
            out.unclassified.push(candidate.phrase.to_string());
            continue;
        };

        let aqi = match candidate.aqi.parse::<i64>() {
            Ok(aqi) => aqi,
            Err(e) => {
                debug!("Dropping candidate with unparseable AQI {:?}: {}", candidate.aqi, e);
                continue;
            }
        };

        let quality = match candidate.quality {
            Some(word) => word.to_string(),
            None => QualityLevel::from_aqi(aqi).label().to_string(),
        };

        out.readings.push(Reading {
            location: location.clone(),
            pollutant,
            aqi,
            quality,
            observed_at,
            agency: agency.clone(),
        });
    }
}

/// Parse an item date: RFC 2822 (RSS `pubDate`), then RFC 3339 (Atom)
pub fn parse_pub_date(text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
