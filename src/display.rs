//! Live display of published readings
//!
//! A display thread consumes the latest-value stream and renders each
//! reading together with a rolling chart window.

use crate::cli::args::OutputFormat;
use crate::cli::output::{write_output, ReadingLine};
use crate::domain::Reading;
use crate::stream::Subscriber;

use std::collections::VecDeque;
use std::io::{self, Write};
use std::thread::{self, JoinHandle};

/// Default number of points kept for the chart
pub const DEFAULT_HISTORY_LEN: usize = 100;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rolling window of adjusted magnitudes
#[derive(Debug, Clone)]
pub struct ChartWindow {
    data: VecDeque<f64>,
    capacity: usize,
}

impl ChartWindow {
    /// Create an empty window holding at most `capacity` points
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest when full
    pub fn push(&mut self, value: f64) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    pub fn data(&self) -> &VecDeque<f64> {
        &self.data
    }

    pub fn latest(&self) -> Option<f64> {
        self.data.back().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest value in the window
    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    /// Smallest value in the window
    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    /// Render the newest `width` points, scaled so `ceiling` is a full bar
    pub fn sparkline(&self, width: usize, ceiling: f64) -> String {
        let skip = self.data.len().saturating_sub(width);
        let top = self.max().unwrap_or(0.0).max(ceiling);

        self.data
            .iter()
            .skip(skip)
            .map(|&v| {
                if top <= 0.0 {
                    return SPARK_LEVELS[0];
                }
                let level = ((v / top) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            })
            .collect()
    }
}

impl Default for ChartWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

/// Consumer of published readings
pub trait DisplaySink: Send {
    /// Render one reading
    fn show(&mut self, reading: &Reading) -> io::Result<()>;
}

/// Writes one line per reading in the selected output format
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    format: OutputFormat,
    window: ChartWindow,
    sparkline_width: usize,
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, format: OutputFormat, history: usize) -> Self {
        Self {
            out,
            format,
            window: ChartWindow::new(history),
            sparkline_width: 32,
        }
    }

    /// Builder: number of chart points rendered per line
    pub fn with_sparkline_width(mut self, width: usize) -> Self {
        self.sparkline_width = width;
        self
    }

    pub fn window(&self) -> &ChartWindow {
        &self.window
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalDisplay<io::Stdout> {
    /// Display on standard output
    pub fn stdout(format: OutputFormat, history: usize) -> Self {
        Self::new(io::stdout(), format, history)
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn show(&mut self, reading: &Reading) -> io::Result<()> {
        self.window.push(reading.adjusted);

        let line = ReadingLine {
            reading: *reading,
            sparkline: self
                .window
                .sparkline(self.sparkline_width, reading.threshold.value()),
        };
        write_output(&mut self.out, &line, self.format)
    }
}

/// Render readings on a background thread until the stream closes
///
/// Returns the sink so callers can inspect it after the run.
pub fn spawn_display<D>(subscriber: Subscriber<Reading>, mut sink: D) -> io::Result<JoinHandle<D>>
where
    D: DisplaySink + 'static,
{
    thread::Builder::new()
        .name("magscan-display".to_string())
        .spawn(move || {
            while let Some(reading) = subscriber.recv() {
                if let Err(e) = sink.show(&reading) {
                    // Closed stdout (e.g. piped into `head`) ends the display only
                    log::debug!("Display write failed: {}", e);
                    break;
                }
            }
            sink
        })
}
