//! Error types for radio engine setup.

use chrono::Weekday;
use std::path::PathBuf;
use thiserror::Error;

/// Static configuration rejected at load, save or `initialize` time.
///
/// Nothing at runtime produces one of these: tuning, ticking and content
/// selection all degrade to silence or stale state instead.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Station list is empty")]
    NoStations,

    #[error("Station '{station}' has invalid frequency {frequency}")]
    InvalidFrequency { station: String, frequency: f32 },

    #[error("Station '{station}', {day}: slot '{program}' starts at {start} (expected 0 <= start < 24)")]
    InvalidSlotStart {
        station: String,
        day: Weekday,
        program: String,
        start: f64,
    },

    #[error("Station '{station}', {day}: slot '{program}' has non-positive duration {duration}")]
    InvalidSlotDuration {
        station: String,
        day: Weekday,
        program: String,
        duration: f64,
    },

    #[error("Invalid falloff curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid engine setting: {0}")]
    InvalidSetting(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}
