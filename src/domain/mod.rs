//! Domain models for magscan
//!
//! This module contains all domain types with validation.
//! Types are validated on construction (fail-fast pattern).

pub mod detector;
pub mod reading;
pub mod sample;

pub use detector::{AlertState, Baseline, ScanState, Threshold, MIN_THRESHOLD};
pub use reading::Reading;
pub use sample::{Magnitude, SensorSample};
