//! Recorded sample replay
//!
//! Plays back `x,y,z` lines from a file at a fixed interval. Components may
//! be separated by commas or whitespace; blank lines and `#` comments are
//! ignored.

use super::poller::{Poll, Poller};
use super::traits::{SampleCallback, SampleSource, SensorInfo, SourceKind};
use crate::domain::SensorSample;
use crate::error::SensorError;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Replays a fixed list of samples
pub struct ReplaySource {
    name: String,
    location: PathBuf,
    samples: Arc<Vec<SensorSample>>,
    interval: Duration,
    looping: bool,
    /// Next sample to deliver, kept across pause/resume
    position: Arc<AtomicUsize>,
    poller: Option<Poller>,
}

impl ReplaySource {
    /// Load a recording from disk
    pub fn open<P: AsRef<Path>>(
        path: P,
        interval: Duration,
        looping: bool,
    ) -> Result<Self, SensorError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SensorError::Unavailable(format!("recording {} not found", path.display()))
            } else {
                SensorError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let samples = parse_samples(&contents)?;
        log::debug!("Loaded {} samples from {}", samples.len(), path.display());

        let mut source = Self::from_samples(samples, interval, looping);
        source.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "replay".to_string());
        source.location = path.to_path_buf();
        Ok(source)
    }

    /// Replay samples already in memory
    pub fn from_samples(samples: Vec<SensorSample>, interval: Duration, looping: bool) -> Self {
        Self {
            name: "replay".to_string(),
            location: PathBuf::from("<memory>"),
            samples: Arc::new(samples),
            interval,
            looping,
            position: Arc::new(AtomicUsize::new(0)),
            poller: None,
        }
    }

    /// Number of samples in the recording
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Parse recording text into samples
pub fn parse_samples(contents: &str) -> Result<Vec<SensorSample>, SensorError> {
    let mut samples = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() != 3 {
            return Err(SensorError::Parse {
                line: idx + 1,
                message: format!("expected 3 components, found {}", parts.len()),
            });
        }

        let mut values = [0.0f32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse::<f32>().map_err(|e| SensorError::Parse {
                line: idx + 1,
                message: format!("'{}': {}", part, e),
            })?;
            if !value.is_finite() {
                return Err(SensorError::Parse {
                    line: idx + 1,
                    message: format!("'{}' is not finite", part),
                });
            }
        }

        samples.push(SensorSample::from(values));
    }

    Ok(samples)
}

impl SampleSource for ReplaySource {
    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: self.name.clone(),
            kind: SourceKind::Replay,
            location: self.location.display().to_string(),
        }
    }

    fn subscribe(&mut self, callback: SampleCallback) -> Result<(), SensorError> {
        if self.poller.is_some() {
            return Err(SensorError::AlreadySubscribed);
        }

        let samples = Arc::clone(&self.samples);
        let position = Arc::clone(&self.position);
        let looping = self.looping;

        let poller = Poller::spawn(
            "replay",
            self.interval,
            move || {
                let mut idx = position.load(Ordering::Relaxed);
                if idx >= samples.len() {
                    if !looping || samples.is_empty() {
                        return Poll::Finished;
                    }
                    idx = 0;
                }
                position.store(idx + 1, Ordering::Relaxed);
                Poll::Sample(samples[idx])
            },
            callback,
        )
        .map_err(|e| SensorError::Read {
            path: self.location.display().to_string(),
            message: e.to_string(),
        })?;

        log::info!("Replaying {} ({} samples)", self.name, self.samples.len());
        self.poller = Some(poller);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            log::info!("Stopped replay of {}", self.name);
        }
    }

    fn is_subscribed(&self) -> bool {
        self.poller.is_some()
    }
}
