//! Published reading
//!
//! The value pushed to display consumers for every processed sample.

use super::detector::{AlertState, Baseline, Threshold};
use super::sample::Magnitude;
use serde::Serialize;

/// One processed sample as seen by the display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Position on the chart x axis, increments per reading
    pub index: u64,
    /// Raw field magnitude
    pub magnitude: Magnitude,
    /// max(0, magnitude - baseline)
    pub adjusted: f64,
    pub baseline: Baseline,
    pub threshold: Threshold,
    pub state: AlertState,
}

impl Reading {
    /// Fraction of the threshold reached, for gauges
    pub fn threshold_ratio(&self) -> f64 {
        self.adjusted / self.threshold.value()
    }
}
