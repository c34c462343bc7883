//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{AlertState, Reading, ScanState};
use crate::sensor::SensorInfo;
use crate::services::SessionStats;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_output(&mut handle, data, format)
}

/// Format output into any writer
pub fn write_output<W: Write, T: Serialize + TableDisplay>(
    out: &mut W,
    data: &T,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(out, "{}", data.to_compact())?;
        }
    }
    out.flush()
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// One live reading with its chart line
#[derive(Debug, Clone, Serialize)]
pub struct ReadingLine {
    #[serde(flatten)]
    pub reading: Reading,
    #[serde(skip)]
    pub sparkline: String,
}

impl TableDisplay for ReadingLine {
    fn to_table(&self) -> String {
        let r = &self.reading;
        let marker = match r.state {
            AlertState::Alert => "!!",
            AlertState::Idle => "  ",
        };
        format!(
            "{} #{:<6} {:>9.2} µT {:>5.0}%  (raw {:>8.2}, base {:>8.2}, thr {:>6.1})  {}",
            marker,
            r.index,
            r.adjusted,
            r.threshold_ratio() * 100.0,
            r.magnitude.as_microtesla(),
            r.baseline.value(),
            r.threshold.value(),
            self.sparkline
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "{} {:.3} {}",
            self.reading.index, self.reading.adjusted, self.reading.state
        )
    }
}

/// Sensor list for display
#[derive(Debug, Clone, Serialize)]
pub struct SensorList {
    pub sensors: Vec<SensorInfo>,
}

impl TableDisplay for SensorList {
    fn to_table(&self) -> String {
        if self.sensors.is_empty() {
            return "No magnetometers found".to_string();
        }

        let mut output = format!("Magnetometers Found: {}\n\n", self.sensors.len());
        for (idx, sensor) in self.sensors.iter().enumerate() {
            output.push_str(&format!(
                "[{}] {} ({}, {})\n",
                idx, sensor.name, sensor.kind, sensor.location
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.sensors
            .iter()
            .map(|s| s.name.clone())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Magnitude of one sample
#[derive(Debug, Clone, Serialize)]
pub struct MagnitudeReport {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub magnitude: f64,
}

impl TableDisplay for MagnitudeReport {
    fn to_table(&self) -> String {
        format!(
            "Sample: ({}, {}, {})\nMagnitude: {:.4} µT",
            self.x, self.y, self.z, self.magnitude
        )
    }

    fn to_compact(&self) -> String {
        format!("{:.4}", self.magnitude)
    }
}

/// One threshold evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub magnitude: f64,
    pub baseline: f64,
    pub threshold: f64,
    pub adjusted: f64,
    pub state: AlertState,
}

impl TableDisplay for EvaluationReport {
    fn to_table(&self) -> String {
        format!(
            "Magnitude: {:.4} µT\nBaseline: {:.4} µT\nAdjusted: {:.4} µT\nThreshold: {:.4} µT\nState: {}",
            self.magnitude, self.baseline, self.adjusted, self.threshold, self.state
        )
    }

    fn to_compact(&self) -> String {
        format!("{:.4} {}", self.adjusted, self.state)
    }
}

/// Printed when a scan ends
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub source: String,
    pub scan_state: ScanState,
    pub baseline: f64,
    pub threshold: f64,
    #[serde(flatten)]
    pub stats: SessionStats,
    /// Readings the display skipped because newer ones arrived first
    pub skipped_frames: u64,
}

impl TableDisplay for SessionSummary {
    fn to_table(&self) -> String {
        format!(
            "Source: {}\n  Samples: {}\n  Alerts: {}\n  Haptic pulses: {}\n  Baseline: {:.2} µT\n  Threshold: {:.1} µT\n  Skipped frames: {}",
            self.source,
            self.stats.samples,
            self.stats.alerts,
            self.stats.triggers,
            self.baseline,
            self.threshold,
            self.skipped_frames
        )
    }
}
