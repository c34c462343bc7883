//! Threshold evaluator
//!
//! Decides alert state and whether an alert side effect may fire.

use crate::domain::{AlertState, Baseline, Magnitude, Threshold};

use std::time::{Duration, Instant};

/// Minimum time between consecutive alert side effects
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

/// Outcome of evaluating one magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// max(0, magnitude - baseline)
    pub adjusted: f64,
    pub state: AlertState,
    /// The caller should fire the haptic and record `now` as the last alert
    pub trigger: bool,
}

/// Stateless threshold evaluator with a cooldown window
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    cooldown: Duration,
}

impl ThresholdEvaluator {
    /// Create an evaluator with the given cooldown
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Evaluate a magnitude against baseline and threshold
    ///
    /// `last_alert` is `None` when no side effect has fired yet this session.
    pub fn evaluate(
        &self,
        magnitude: Magnitude,
        baseline: Baseline,
        threshold: Threshold,
        last_alert: Option<Instant>,
        now: Instant,
    ) -> Evaluation {
        let adjusted = baseline.adjust(magnitude);

        let state = if threshold.is_exceeded_by(adjusted) {
            AlertState::Alert
        } else {
            AlertState::Idle
        };

        let trigger = state.is_alert() && self.cooldown_elapsed(last_alert, now);

        Evaluation {
            adjusted,
            state,
            trigger,
        }
    }

    fn cooldown_elapsed(&self, last_alert: Option<Instant>, now: Instant) -> bool {
        match last_alert {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        }
    }
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
