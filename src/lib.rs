//! radio_dial — In-world radio receiver engine.
//!
//! Tuning, reception simulation, weekly programme scheduling and content
//! selection live here. Audio decoding is delegated to an `AudioOutput`.
//! The CLI consumes this crate.

pub mod arbiter;
pub mod clip;
pub mod clock;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod noise;
pub mod output;
pub mod scheduler;
pub mod signal;
pub mod station;
pub mod status;
pub mod tuner;
