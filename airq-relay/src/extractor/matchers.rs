//! Text pattern matchers for feed item fields
//!
//! Each matcher is independent and returns what it found (or nothing). The
//! extractor decides the order they are tried in.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<Quality> - <n> AQI - ` head of a Shape A triplet; the phrase follows it.
/// Multi-word quality labels are listed before the single-word fallback.
static SHAPE_A_HEAD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Unhealthy for Sensitive Groups|Very Unhealthy|\w+)\s*-\s*(\d+)\s*AQI\s*-\s*")
        .unwrap()
});

/// `<pollutant label> AQI of <n> for <location>` (whole title)
static SHAPE_B_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+AQI\s+of\s+(\d+)\s+for\s+(.+?)\s*$").unwrap()
});

/// `Location: <value>`, tolerating tags between label and value
static LOCATION_LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Location:\s*(?:<[^>]*>\s*)*([^<\r\n]+)").unwrap()
});

/// `<place>, <two-letter region code>`
static PLACE_REGION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^,<>:\r\n]+),\s*([A-Z]{2})\b").unwrap());

/// `Agency: <value>`, tolerating tags between label and value
static AGENCY_LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Agency:\s*(?:<[^>]*>\s*)*([^<\r\n]+)").unwrap()
});

/// Pollutant/AQI candidate lifted from text, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Quality word from the source text (Shape A only)
    pub quality: Option<&'a str>,
    /// Digits of the AQI value
    pub aqi: &'a str,
    /// Raw pollutant phrase or label
    pub phrase: &'a str,
}

/// All Shape A triplets in `text`, in order of occurrence
///
/// A phrase runs from the end of its head to the next head, markup or line
/// end, whichever comes first, so several triplets may share one line.
pub fn match_shape_a(text: &str) -> Vec<Candidate<'_>> {
    let heads: Vec<_> = SHAPE_A_HEAD_PATTERN.captures_iter(text).collect();

    heads
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let head = caps.get(0)?;
            let span_end = heads
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |next| next.start());
            let span = &text[head.end()..span_end];
            let phrase_end = span.find(|c: char| matches!(c, '<' | '\r' | '\n')).unwrap_or(span.len());
            let phrase = span[..phrase_end]
                .trim()
                .trim_end_matches(|c: char| c == ',' || c == ';')
                .trim_end();
            if phrase.is_empty() {
                return None;
            }

            Some(Candidate {
                quality: Some(caps.get(1)?.as_str().trim()),
                aqi: caps.get(2)?.as_str(),
                phrase,
            })
        })
        .collect()
}

/// Shape B headline, if `title` is one
pub fn match_shape_b(title: &str) -> Option<Candidate<'_>> {
    let caps = SHAPE_B_PATTERN.captures(title)?;
    Some(Candidate {
        quality: None,
        aqi: caps.get(2)?.as_str(),
        phrase: caps.get(1)?.as_str().trim(),
    })
}

/// Location named in `text`: labeled field first, then `<place>, <XX>`
pub fn find_location(text: &str) -> Option<String> {
    if let Some(value) = labeled_value(&LOCATION_LABEL_PATTERN, text) {
        return Some(value);
    }

    let caps = PLACE_REGION_PATTERN.captures(text)?;
    let place = caps.get(1)?.as_str().trim();
    let region = caps.get(2)?.as_str();
    if place.is_empty() {
        return None;
    }
    Some(format!("{}, {}", place, region))
}

/// Agency named by an `Agency:` label in `text`
pub fn find_agency(text: &str) -> Option<String> {
    labeled_value(&AGENCY_LABEL_PATTERN, text)
}

fn labeled_value(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
