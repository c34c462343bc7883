//! Integration tests for magscan with recorded sessions
//!
//! Drives full scan sessions from replay files through the public API.

use magscan::cli::args::OutputFormat;
use magscan::commands::scan::scan_session;
use magscan::config::Config;
use magscan::display::TerminalDisplay;
use magscan::haptics::{HapticManager, HapticTrigger};
use magscan::sensor::{ReplaySource, SampleSource};

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Haptic trigger that counts pulses
#[derive(Clone, Default)]
struct CountingHaptic(Arc<Mutex<usize>>);

impl CountingHaptic {
    fn count(&self) -> usize {
        *self.0.lock().unwrap()
    }
}

impl HapticTrigger for CountingHaptic {
    fn pulse(&self, _duration: Duration) -> io::Result<()> {
        *self.0.lock().unwrap() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Haptic trigger that always fails
struct BrokenHaptic;

impl HapticTrigger for BrokenHaptic {
    fn pulse(&self, _duration: Duration) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no vibrator"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Writer shared with the display thread
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const WALK: &str = "\
# x, y, z in microtesla
30, 40, 0
30, 40, 0
0 0 60   # coin under the phone
0 0 60
30 40 0
30 40 0
";

fn write_recording(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("walk.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

fn config(threshold: f64) -> Config {
    let mut config = Config::default();
    config.detector.threshold = threshold;
    config
}

fn haptics(trigger: impl HapticTrigger + 'static) -> HapticManager {
    let mut manager = HapticManager::new(Duration::from_millis(50));
    manager.add_trigger(Box::new(trigger));
    manager
}

#[test]
fn test_replay_session_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, WALK);
    let mut source = ReplaySource::open(&path, Duration::from_millis(1), false).unwrap();
    assert_eq!(source.len(), 6);

    let out = SharedBuffer::default();
    let display = TerminalDisplay::new(out.clone(), OutputFormat::Compact, 16);
    let haptic = CountingHaptic::default();

    let summary = scan_session(
        &config(55.0),
        None,
        &mut source,
        display,
        haptics(haptic.clone()),
        None::<Cursor<Vec<u8>>>,
        false,
    )
    .unwrap();

    assert_eq!(summary.source, "walk.csv");
    assert_eq!(summary.stats.samples, 6);
    assert_eq!(summary.stats.alerts, 1);
    // The second 60 µT reading falls inside the cooldown
    assert_eq!(summary.stats.triggers, 1);
    assert_eq!(haptic.count(), 1);
    assert!(!source.is_subscribed());

    let lines = out.lines();
    assert_eq!(lines.last().map(String::as_str), Some("5 50.000 IDLE"));
    assert_eq!(lines.len() as u64 + summary.skipped_frames, 6);
}

#[test]
fn test_replay_with_calibration_controls() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, WALK);
    let mut source = ReplaySource::open(&path, Duration::from_millis(1), false).unwrap();

    let mut cfg = config(4.0);
    cfg.detector.calibrate_on_start = true;

    let summary = scan_session(
        &cfg,
        None,
        &mut source,
        TerminalDisplay::new(io::sink(), OutputFormat::Table, 16),
        haptics(CountingHaptic::default()),
        None::<Cursor<Vec<u8>>>,
        false,
    )
    .unwrap();

    assert_eq!(summary.baseline, 50.0);
    // 50 before calibration, then the 60 µT bump
    assert_eq!(summary.stats.alerts, 2);
}

#[test]
fn test_looping_replay_stops_at_sample_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, "1 2 2\n");
    let mut source = ReplaySource::open(&path, Duration::from_millis(1), true).unwrap();

    let summary = scan_session(
        &config(4.0),
        Some(25),
        &mut source,
        TerminalDisplay::new(io::sink(), OutputFormat::Json, 8),
        haptics(CountingHaptic::default()),
        None::<Cursor<Vec<u8>>>,
        false,
    )
    .unwrap();

    assert_eq!(summary.stats.samples, 25);
    assert_eq!(summary.stats.alerts, 0);
}

#[test]
fn test_haptic_failure_does_not_stop_scan() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, WALK);
    let mut source = ReplaySource::open(&path, Duration::from_millis(1), false).unwrap();

    let summary = scan_session(
        &config(55.0),
        None,
        &mut source,
        TerminalDisplay::new(io::sink(), OutputFormat::Table, 16),
        haptics(BrokenHaptic),
        None::<Cursor<Vec<u8>>>,
        false,
    )
    .unwrap();

    assert_eq!(summary.stats.samples, 6);
    assert_eq!(summary.stats.triggers, 1);
}

#[test]
fn test_bad_recording_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, "1 2\n");
    assert!(ReplaySource::open(&path, Duration::from_millis(1), false).is_err());
}

#[test]
fn test_alert_state_reported_in_json() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, "0 0 60\n");
    let mut source = ReplaySource::open(&path, Duration::from_millis(1), false).unwrap();

    let out = SharedBuffer::default();
    scan_session(
        &config(55.0),
        None,
        &mut source,
        TerminalDisplay::new(out.clone(), OutputFormat::Json, 4),
        haptics(CountingHaptic::default()),
        None::<Cursor<Vec<u8>>>,
        false,
    )
    .unwrap();

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["state"], serde_json::json!("alert"));
    assert_eq!(value["adjusted"], serde_json::json!(60.0));
}
