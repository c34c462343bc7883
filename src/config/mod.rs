//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging. Configuration
//! only supplies startup defaults; nothing is written back during a session.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::display::DEFAULT_HISTORY_LEN;
use crate::domain::{Threshold, MIN_THRESHOLD};
use crate::error::ConfigError;
use crate::haptics::{CommandHaptic, HapticManager, TerminalBell};
use crate::sensor::DEFAULT_IIO_ROOT;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Sample source settings
    pub sensor: SensorConfig,
    /// Threshold and cooldown settings
    pub detector: DetectorConfig,
    /// Haptic feedback settings
    pub haptic: HapticConfig,
    /// Live display settings
    pub display: DisplayConfig,
}

impl Config {
    /// Check value ranges the type system does not cover
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.detector.threshold.is_finite() || self.detector.threshold < MIN_THRESHOLD {
            return Err(ConfigError::InvalidValue {
                key: "detector.threshold".to_string(),
                message: format!(
                    "{} is below the minimum of {}",
                    self.detector.threshold, MIN_THRESHOLD
                ),
            });
        }
        if !self.detector.threshold_step.is_finite() || self.detector.threshold_step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "detector.threshold_step".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.sensor.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sensor.poll_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.display.history == 0 {
            return Err(ConfigError::InvalidValue {
                key: "display.history".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.sensor.source == SourceSelection::Replay && self.sensor.replay_file.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "sensor.replay_file".to_string(),
                message: "required when source = \"replay\"".to_string(),
            });
        }
        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Which sample source to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelection {
    /// Linux IIO sysfs magnetometer
    #[default]
    Iio,
    /// Recorded samples from a file
    Replay,
}

/// Sample source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub source: SourceSelection,
    /// IIO device name or directory; first magnetometer when unset
    pub device: Option<String>,
    /// Root of the IIO device tree
    pub iio_root: PathBuf,
    /// Delay between samples in milliseconds
    pub poll_interval_ms: u64,
    /// Recording to replay
    pub replay_file: Option<PathBuf>,
    /// Restart the recording when it ends
    pub replay_loop: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: SourceSelection::Iio,
            device: None,
            iio_root: PathBuf::from(DEFAULT_IIO_ROOT),
            poll_interval_ms: 50,
            replay_file: None,
            replay_loop: false,
        }
    }
}

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Initial alert threshold in microtesla
    pub threshold: f64,
    /// Amount the interactive +/- controls move the threshold
    pub threshold_step: f64,
    /// Minimum time between haptic pulses in milliseconds
    pub cooldown_ms: u64,
    /// Calibrate on the first sample
    pub calibrate_on_start: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default().value(),
            threshold_step: 1.0,
            cooldown_ms: 500,
            calibrate_on_start: false,
        }
    }
}

impl DetectorConfig {
    /// Convert to a Threshold domain object
    pub fn to_threshold(&self) -> Result<Threshold, crate::error::DomainError> {
        Threshold::new(self.threshold)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Haptic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    pub enabled: bool,
    /// Ring the terminal bell
    pub bell: bool,
    /// External vibration command; `{ms}` expands to the pulse length
    pub command: Option<String>,
    /// Pulse length in milliseconds
    pub pulse_ms: u64,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
            command: None,
            pulse_ms: 100,
        }
    }
}

impl HapticConfig {
    /// Build the configured triggers
    pub fn to_manager(&self) -> HapticManager {
        let mut manager = HapticManager::new(Duration::from_millis(self.pulse_ms));
        if !self.enabled {
            return manager;
        }
        if self.bell {
            manager.add_trigger(Box::new(TerminalBell));
        }
        if let Some(cmd) = self.command.as_deref().and_then(CommandHaptic::from_command_line) {
            manager.add_trigger(Box::new(cmd));
        }
        manager
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Points kept in the chart window
    pub history: usize,
    /// Chart points rendered per line
    pub sparkline_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY_LEN,
            sparkline_width: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sensor.source, SourceSelection::Iio);
        assert_eq!(config.detector.cooldown_ms, 500);
        assert_eq!(config.display.history, DEFAULT_HISTORY_LEN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [sensor]
            source = "replay"
            replay_file = "walk.csv"

            [detector]
            threshold = 35.5
            "#,
        )
        .unwrap();

        assert_eq!(config.sensor.source, SourceSelection::Replay);
        assert_eq!(config.detector.threshold, 35.5);
        assert_eq!(config.detector.cooldown_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_threshold() {
        let mut config = Config::default();
        config.detector.threshold = 0.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "detector.threshold"
        ));
    }

    #[test]
    fn test_validate_replay_needs_file() {
        let mut config = Config::default();
        config.sensor.source = SourceSelection::Replay;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_haptic_manager_from_config() {
        let mut config = HapticConfig::default();
        assert_eq!(config.to_manager().trigger_count(), 1);

        config.command = Some("termux-vibrate -d {ms}".to_string());
        assert_eq!(config.to_manager().trigger_count(), 2);

        config.enabled = false;
        assert_eq!(config.to_manager().trigger_count(), 0);
    }
}
