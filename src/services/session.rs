//! Detector session
//!
//! Holds all per-session state: baseline, threshold, scan state, the last
//! alert timestamp and the chart index counter.

use crate::domain::{AlertState, Baseline, Magnitude, Reading, ScanState, SensorSample, Threshold};
use crate::error::ServiceError;
use crate::services::evaluator::{Evaluation, ThresholdEvaluator};

use serde::Serialize;
use std::time::Instant;

/// Result of processing one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Update {
    pub reading: Reading,
    /// Fire the alert side effect for this reading
    pub trigger: bool,
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    pub samples: u64,
    /// Idle -> Alert transitions
    pub alerts: u64,
    /// Side effects allowed through the cooldown
    pub triggers: u64,
}

/// Calibration and threshold state for one scanning session
#[derive(Debug, Clone)]
pub struct DetectorSession {
    evaluator: ThresholdEvaluator,
    baseline: Baseline,
    threshold: Threshold,
    scan_state: ScanState,
    alert_state: AlertState,
    last_magnitude: Magnitude,
    last_alert: Option<Instant>,
    next_index: u64,
    stats: SessionStats,
}

impl DetectorSession {
    /// Create a new session in the scanning state
    pub fn new(threshold: Threshold, evaluator: ThresholdEvaluator) -> Self {
        Self {
            evaluator,
            baseline: Baseline::ZERO,
            threshold,
            scan_state: ScanState::Scanning,
            alert_state: AlertState::Idle,
            last_magnitude: Magnitude::ZERO,
            last_alert: None,
            next_index: 0,
            stats: SessionStats::default(),
        }
    }

    /// Process a raw sample
    ///
    /// Returns `None` while paused; a sample already in flight when the
    /// source was unsubscribed is dropped here.
    pub fn process_sample(&mut self, sample: SensorSample, now: Instant) -> Option<Update> {
        self.process_magnitude(sample.magnitude(), now)
    }

    /// Process an already computed magnitude
    pub fn process_magnitude(&mut self, magnitude: Magnitude, now: Instant) -> Option<Update> {
        if !self.scan_state.is_scanning() {
            return None;
        }

        self.last_magnitude = magnitude;

        let Evaluation {
            adjusted,
            state,
            trigger,
        } = self
            .evaluator
            .evaluate(magnitude, self.baseline, self.threshold, self.last_alert, now);

        if trigger {
            self.last_alert = Some(now);
            self.stats.triggers += 1;
        }
        if state.is_alert() && !self.alert_state.is_alert() {
            self.stats.alerts += 1;
        }
        self.alert_state = state;
        self.stats.samples += 1;

        let reading = Reading {
            index: self.next_index,
            magnitude,
            adjusted,
            baseline: self.baseline,
            threshold: self.threshold,
            state,
        };
        self.next_index += 1;

        Some(Update { reading, trigger })
    }

    /// Use the last seen magnitude as the new baseline
    pub fn calibrate(&mut self) -> Result<Baseline, ServiceError> {
        self.ensure_scanning()?;
        self.baseline = Baseline::from(self.last_magnitude);
        log::info!("Calibrated baseline to {}", self.baseline);
        Ok(self.baseline)
    }

    /// Set the threshold, rejecting values below the minimum
    pub fn set_threshold(&mut self, value: f64) -> Result<Threshold, ServiceError> {
        self.ensure_scanning()?;
        self.threshold = Threshold::new(value)?;
        log::info!("Threshold set to {}", self.threshold);
        Ok(self.threshold)
    }

    /// Move the threshold by `delta`, clamped at the minimum
    pub fn step_threshold(&mut self, delta: f64) -> Result<Threshold, ServiceError> {
        self.ensure_scanning()?;
        self.threshold = self.threshold.stepped(delta);
        log::info!("Threshold set to {}", self.threshold);
        Ok(self.threshold)
    }

    /// Flip between scanning and paused
    pub fn toggle(&mut self) -> ScanState {
        self.scan_state = self.scan_state.toggled();
        if !self.scan_state.is_scanning() {
            self.alert_state = AlertState::Idle;
        }
        log::info!("Scanner {}", self.scan_state);
        self.scan_state
    }

    /// Host regained the foreground
    ///
    /// A session that had already processed samples is put back into the
    /// scanning state. Returns true if the state changed.
    pub fn on_foreground(&mut self) -> bool {
        if self.stats.samples > 0 && !self.scan_state.is_scanning() {
            self.scan_state = ScanState::Scanning;
            log::info!("Resumed scanning on foreground");
            return true;
        }
        false
    }

    fn ensure_scanning(&self) -> Result<(), ServiceError> {
        if self.scan_state.is_scanning() {
            Ok(())
        } else {
            Err(ServiceError::Paused)
        }
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan_state
    }

    pub fn alert_state(&self) -> AlertState {
        self.alert_state
    }

    pub fn last_magnitude(&self) -> Magnitude {
        self.last_magnitude
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

impl Default for DetectorSession {
    fn default() -> Self {
        Self::new(Threshold::default(), ThresholdEvaluator::default())
    }
}
