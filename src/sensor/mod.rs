//! Magnetometer sources
//!
//! Provides trait-based abstractions over the sample source for testability.

pub mod iio;
mod poller;
pub mod replay;
pub mod traits;

pub use iio::{discover, IioDevice, IioMagnetometer, DEFAULT_IIO_ROOT};
pub use replay::ReplaySource;
pub use traits::{SampleCallback, SampleSource, SensorInfo, SourceEvent, SourceKind};

use crate::config::{SensorConfig, SourceSelection};
use crate::error::SensorError;

use std::time::Duration;

/// Open the source described by the sensor configuration
///
/// A missing IIO magnetometer is not fatal: the returned source reports
/// itself unavailable on subscribe and the scan runs without data.
pub fn open_source(config: &SensorConfig) -> Result<Box<dyn SampleSource>, SensorError> {
    let interval = Duration::from_millis(config.poll_interval_ms);

    match config.source {
        SourceSelection::Iio => {
            match IioMagnetometer::find(&config.iio_root, config.device.as_deref(), interval) {
                Ok(mag) => Ok(Box::new(mag)),
                Err(SensorError::Unavailable(reason)) => Ok(Box::new(MissingSensor::new(reason))),
                Err(e) => Err(e),
            }
        }
        SourceSelection::Replay => {
            let path = config.replay_file.as_ref().ok_or_else(|| {
                SensorError::Unavailable("replay source needs a recording file".to_string())
            })?;
            let source = ReplaySource::open(path, interval, config.replay_loop)?;
            Ok(Box::new(source))
        }
    }
}

/// Stand-in for a magnetometer that could not be found
#[derive(Debug, Clone)]
pub struct MissingSensor {
    reason: String,
}

impl MissingSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SampleSource for MissingSensor {
    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: "No magnetometer".to_string(),
            kind: SourceKind::Iio,
            location: "-".to_string(),
        }
    }

    fn subscribe(&mut self, _callback: SampleCallback) -> Result<(), SensorError> {
        Err(SensorError::Unavailable(self.reason.clone()))
    }

    fn unsubscribe(&mut self) {}

    fn is_subscribed(&self) -> bool {
        false
    }
}
