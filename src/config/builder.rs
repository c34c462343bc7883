//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile, SourceSelection};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; without one the default locations are
    /// searched and a missing file is not an error.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override the sample source
    pub fn with_source(mut self, source: Option<SourceSelection>) -> Self {
        if let Some(s) = source {
            self.config.sensor.source = s;
        }
        self
    }

    /// Override the IIO device selector
    pub fn with_device(mut self, device: Option<String>) -> Self {
        if let Some(d) = device {
            self.config.sensor.device = Some(d);
        }
        self
    }

    /// Override the recording path; implies the replay source
    pub fn with_replay_file(mut self, file: Option<PathBuf>) -> Self {
        if let Some(f) = file {
            self.config.sensor.replay_file = Some(f);
            self.config.sensor.source = SourceSelection::Replay;
        }
        self
    }

    /// Override replay looping
    pub fn with_replay_loop(mut self, looping: Option<bool>) -> Self {
        if let Some(l) = looping {
            self.config.sensor.replay_loop = l;
        }
        self
    }

    /// Override with CLI poll interval
    pub fn with_interval_ms(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.sensor.poll_interval_ms = i;
        }
        self
    }

    /// Override with CLI threshold
    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        if let Some(t) = threshold {
            self.config.detector.threshold = t;
        }
        self
    }

    /// Override with CLI cooldown
    pub fn with_cooldown_ms(mut self, cooldown: Option<u64>) -> Self {
        if let Some(c) = cooldown {
            self.config.detector.cooldown_ms = c;
        }
        self
    }

    /// Override calibrate-on-start
    pub fn with_calibrate(mut self, calibrate: Option<bool>) -> Self {
        if let Some(c) = calibrate {
            self.config.detector.calibrate_on_start = c;
        }
        self
    }

    /// Override haptics enabled
    pub fn with_haptic_enabled(mut self, enabled: Option<bool>) -> Self {
        if let Some(e) = enabled {
            self.config.haptic.enabled = e;
        }
        self
    }

    /// Override the external vibration command
    pub fn with_haptic_command(mut self, command: Option<String>) -> Self {
        if let Some(c) = command {
            self.config.haptic.command = Some(c);
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
