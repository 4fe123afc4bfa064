//! # airq common library
//!
//! Shared code for the air-quality relay:
//! - Reading model and AQI quality classification
//! - Event types (AirqEvent enum) and EventBus
//! - Configuration loading
//! - SSE stream helpers
//! - Utility functions

pub mod config;
pub mod error;
pub mod events;
pub mod reading;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
pub use reading::{Pollutant, QualityLevel, Reading, UNKNOWN};
