//! Detector domain types
//!
//! Provides validated types for calibration baseline, alert threshold,
//! alert state and scan state.

use super::sample::Magnitude;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest threshold the user can select
pub const MIN_THRESHOLD: f64 = 1.0;

/// Calibration offset subtracted from the raw magnitude
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Baseline(f64);

impl Baseline {
    /// No offset
    pub const ZERO: Baseline = Baseline(0.0);

    /// Create a baseline from a raw value
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// max(0, magnitude - baseline)
    pub fn adjust(&self, magnitude: Magnitude) -> f64 {
        (magnitude.as_microtesla() - self.0).max(0.0)
    }
}

impl From<Magnitude> for Baseline {
    fn from(m: Magnitude) -> Self {
        Self(m.as_microtesla())
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} µT", self.0)
    }
}

/// Alert boundary compared against the adjusted magnitude
///
/// Always finite and at least [`MIN_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Create a new threshold with validation
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value < MIN_THRESHOLD {
            return Err(DomainError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    /// Create a threshold, clamping values below the minimum
    ///
    /// Non-finite input falls back to the minimum.
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.max(MIN_THRESHOLD))
        } else {
            Self(MIN_THRESHOLD)
        }
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Threshold moved by `delta`, never below the minimum
    ///
    /// A step that would leave the finite range keeps the current value.
    pub fn stepped(&self, delta: f64) -> Self {
        let next = self.0 + delta;
        if next.is_finite() {
            Self::clamped(next)
        } else {
            *self
        }
    }

    /// Strict comparison: equal values do not exceed
    pub fn is_exceeded_by(&self, adjusted: f64) -> bool {
        adjusted > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(20.0)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} µT", self.0)
    }
}

/// Whether the adjusted magnitude is above the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    #[default]
    Idle,
    Alert,
}

impl AlertState {
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert)
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Alert => write!(f, "ALERT"),
        }
    }
}

/// Whether samples are being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    #[default]
    Scanning,
    Paused,
}

impl ScanState {
    /// The other state
    pub fn toggled(&self) -> Self {
        match self {
            Self::Scanning => Self::Paused,
            Self::Paused => Self::Scanning,
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self, Self::Scanning)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_adjust_above() {
        let baseline = Baseline::new(2.0);
        assert_eq!(baseline.adjust(Magnitude::new(5.0)), 3.0);
    }

    #[test]
    fn test_baseline_adjust_floors_at_zero() {
        let baseline = Baseline::new(50.0);
        assert_eq!(baseline.adjust(Magnitude::new(12.5)), 0.0);
    }

    #[test]
    fn test_baseline_from_magnitude() {
        let m = Magnitude::new(47.25);
        let baseline = Baseline::from(m);
        assert_eq!(baseline.value(), 47.25);
        assert_eq!(baseline.adjust(m), 0.0);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(Threshold::new(1.0).is_ok());
        assert!(Threshold::new(250.0).is_ok());
        assert_eq!(
            Threshold::new(0.99),
            Err(DomainError::InvalidThreshold(0.99))
        );
        assert!(Threshold::new(f64::NAN).is_err());
        assert!(Threshold::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(Threshold::clamped(-5.0).value(), MIN_THRESHOLD);
        assert_eq!(Threshold::clamped(f64::NAN).value(), MIN_THRESHOLD);
        assert_eq!(Threshold::clamped(12.0).value(), 12.0);
    }

    #[test]
    fn test_threshold_stepped() {
        let t = Threshold::new(2.0).unwrap();
        assert_eq!(t.stepped(5.0).value(), 7.0);
        assert_eq!(t.stepped(-5.0).value(), MIN_THRESHOLD);
    }

    #[test]
    fn test_threshold_stepped_past_max_keeps_value() {
        let t = Threshold::new(f64::MAX).unwrap();
        assert_eq!(t.stepped(f64::MAX).value(), f64::MAX);
        assert_eq!(t.stepped(1.0).value(), f64::MAX);
        assert_eq!(t.stepped(-f64::MAX).value(), MIN_THRESHOLD);
    }

    #[test]
    fn test_threshold_is_strict() {
        let t = Threshold::new(4.0).unwrap();
        assert!(!t.is_exceeded_by(4.0));
        assert!(t.is_exceeded_by(4.000001));
    }

    #[test]
    fn test_threshold_deserialize_rejects_small() {
        #[derive(Deserialize)]
        struct Holder {
            threshold: Threshold,
        }
        let ok: Holder = toml::from_str("threshold = 15.0").unwrap();
        assert_eq!(ok.threshold.value(), 15.0);
        assert!(toml::from_str::<Holder>("threshold = 0.5").is_err());
    }

    #[test]
    fn test_scan_state_toggle() {
        assert_eq!(ScanState::default(), ScanState::Scanning);
        assert_eq!(ScanState::Scanning.toggled(), ScanState::Paused);
        assert_eq!(ScanState::Paused.toggled(), ScanState::Scanning);
    }

    #[test]
    fn test_alert_state_display() {
        assert_eq!(AlertState::Alert.to_string(), "ALERT");
        assert_eq!(AlertState::Idle.to_string(), "IDLE");
    }
}
