//! Trait definitions for magnetometer sources
//!
//! These traits abstract over the platform sensor to enable testing with
//! scripted sources.

use crate::domain::SensorSample;
use crate::error::SensorError;

use serde::Serialize;
use std::fmt;

/// What a source pushes to its subscriber
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEvent {
    /// A new raw reading
    Sample(SensorSample),
    /// The source has no more samples (end of a recording)
    Ended,
}

/// Callback invoked from the source's delivery thread
pub type SampleCallback = Box<dyn FnMut(SourceEvent) + Send + 'static>;

/// Kind of sample source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Iio,
    Replay,
    Mock,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iio => write!(f, "iio"),
            Self::Replay => write!(f, "replay"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Description of a source for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorInfo {
    pub name: String,
    pub kind: SourceKind,
    /// sysfs directory or file the samples come from
    pub location: String,
}

/// Push source of magnetometer samples
///
/// Samples are delivered asynchronously at a cadence chosen by the source.
/// Unsubscribing stops delivery; a sample already in flight may still
/// arrive and the consumer is expected to drop it.
pub trait SampleSource: Send {
    /// Describe this source
    fn info(&self) -> SensorInfo;

    /// Start delivering samples to `callback`
    fn subscribe(&mut self, callback: SampleCallback) -> Result<(), SensorError>;

    /// Stop delivering samples
    ///
    /// Does nothing when not subscribed.
    fn unsubscribe(&mut self);

    /// Whether samples are currently being delivered
    fn is_subscribed(&self) -> bool;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn info(&self) -> SensorInfo {
        (**self).info()
    }

    fn subscribe(&mut self, callback: SampleCallback) -> Result<(), SensorError> {
        (**self).subscribe(callback)
    }

    fn unsubscribe(&mut self) {
        (**self).unsubscribe()
    }

    fn is_subscribed(&self) -> bool {
        (**self).is_subscribed()
    }
}
