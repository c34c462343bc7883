//! Mock implementations for testing
//!
//! Provides a scripted sample source and a recording haptic trigger for
//! testing without real hardware.

use crate::domain::SensorSample;
use crate::error::SensorError;
use crate::haptics::HapticTrigger;
use crate::sensor::{SampleCallback, SampleSource, SensorInfo, SourceEvent, SourceKind};

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted sample source
///
/// `subscribe` delivers every remaining sample synchronously, then
/// `Ended` unless configured to stay open.
#[derive(Debug)]
pub struct MockSource {
    samples: Vec<SensorSample>,
    position: usize,
    /// Samples delivered per subscribe call; `None` delivers everything
    batch: Option<usize>,
    unavailable: bool,
    end_when_drained: bool,
    subscribed: bool,
    subscribe_calls: Arc<AtomicUsize>,
}

impl MockSource {
    /// Create a new mock source with the given samples
    pub fn new(samples: Vec<SensorSample>) -> Self {
        Self {
            samples,
            position: 0,
            batch: None,
            unavailable: false,
            end_when_drained: true,
            subscribed: false,
            subscribe_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose subscribe always fails as unavailable
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }

    /// Builder: deliver at most `n` samples per subscribe
    pub fn with_batch(mut self, n: usize) -> Self {
        self.batch = Some(n);
        self
    }

    /// Builder: never send `Ended`
    pub fn keep_open(mut self) -> Self {
        self.end_when_drained = false;
        self
    }

    /// Shared counter of subscribe calls
    pub fn subscribe_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.subscribe_calls)
    }
}

impl SampleSource for MockSource {
    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: "Mock Magnetometer".to_string(),
            kind: SourceKind::Mock,
            location: "mock".to_string(),
        }
    }

    fn subscribe(&mut self, mut callback: SampleCallback) -> Result<(), SensorError> {
        if self.unavailable {
            return Err(SensorError::Unavailable("mock sensor missing".to_string()));
        }
        if self.subscribed {
            return Err(SensorError::AlreadySubscribed);
        }
        self.subscribed = true;
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);

        let end = match self.batch {
            Some(n) => (self.position + n).min(self.samples.len()),
            None => self.samples.len(),
        };
        for sample in &self.samples[self.position..end] {
            callback(SourceEvent::Sample(*sample));
        }
        self.position = end;

        if self.position == self.samples.len() && self.end_when_drained {
            callback(SourceEvent::Ended);
        }
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

/// Haptic trigger that records pulses
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptic {
    pulses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingHaptic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pulses received
    pub fn count(&self) -> usize {
        self.pulses.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.pulses.lock().unwrap_or_else(|e| e.into_inner()).last().copied()
    }
}

impl HapticTrigger for RecordingHaptic {
    fn pulse(&self, duration: Duration) -> io::Result<()> {
        self.pulses.lock().unwrap_or_else(|e| e.into_inner()).push(duration);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
