//! Air-quality reading model
//!
//! A `Reading` is one pollutant measurement lifted out of a feed item. Readings
//! carry no identity: they are produced by the extractor, handed to a sink and
//! dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for location and agency when the feed text does not name them
pub const UNKNOWN: &str = "Unknown";

/// Pollutant category
///
/// Downstream consumers key strictly on these three categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pollutant {
    /// Fine particulate matter (2.5 microns)
    #[serde(rename = "PM2.5")]
    Pm25,
    /// Coarse particulate matter (10 microns)
    #[serde(rename = "PM10")]
    Pm10,
    /// Ground-level ozone
    #[serde(rename = "Ozone")]
    Ozone,
}

impl Pollutant {
    /// All known categories in display order
    pub const ALL: [Pollutant; 3] = [Pollutant::Pm25, Pollutant::Ozone, Pollutant::Pm10];

    /// Map a free-text pollutant phrase onto a known category
    ///
    /// Case-insensitive containment, checked in order: ozone, then PM2.5
    /// ("2.5 microns" / "pm2.5"), then PM10 ("10 microns" / "pm10").
    /// Returns `None` for anything else.
    pub fn classify_phrase(phrase: &str) -> Option<Pollutant> {
        let phrase = phrase.to_lowercase();

        if phrase.contains("ozone") {
            Some(Pollutant::Ozone)
        } else if phrase.contains("2.5 microns") || phrase.contains("pm2.5") {
            Some(Pollutant::Pm25)
        } else if phrase.contains("10 microns") || phrase.contains("pm10") {
            Some(Pollutant::Pm10)
        } else {
            None
        }
    }

    /// Canonical label ("PM2.5", "PM10", "Ozone")
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::Ozone => "Ozone",
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// AQI severity band
///
/// Variants are declared in ascending severity so `Ord` follows severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityLevel {
    /// 0-50
    #[serde(rename = "Good")]
    Good,
    /// 51-100
    #[serde(rename = "Moderate")]
    Moderate,
    /// 101-150
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    /// 151-200
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    /// 201-300
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    /// Above 300
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl QualityLevel {
    /// Classify an AQI value
    ///
    /// Total over the integer domain: negative values fall in `Good`,
    /// anything above 300 is `Hazardous`. Range validation is left to
    /// consumers.
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=50 => QualityLevel::Good,
            51..=100 => QualityLevel::Moderate,
            101..=150 => QualityLevel::UnhealthyForSensitiveGroups,
            151..=200 => QualityLevel::Unhealthy,
            201..=300 => QualityLevel::VeryUnhealthy,
            _ => QualityLevel::Hazardous,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::Good => "Good",
            QualityLevel::Moderate => "Moderate",
            QualityLevel::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            QualityLevel::Unhealthy => "Unhealthy",
            QualityLevel::VeryUnhealthy => "Very Unhealthy",
            QualityLevel::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized pollutant reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Place name, e.g. "Antelope Vly, CA"
    pub location: String,
    /// Pollutant category
    pub pollutant: Pollutant,
    /// Air Quality Index (not range-checked)
    pub aqi: i64,
    /// Quality label, either copied from the feed or derived from `aqi`
    pub quality: String,
    /// Publication instant of the feed item
    pub observed_at: DateTime<Utc>,
    /// Reporting agency
    pub agency: String,
}

impl Reading {
    /// Severity band derived from the numeric AQI, regardless of `quality`
    pub fn derived_quality(&self) -> QualityLevel {
        QualityLevel::from_aqi(self.aqi)
    }
}
