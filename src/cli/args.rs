//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::config::SourceSelection;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Magnetometer metal detector
///
/// Watches the magnetic field magnitude and alerts when it rises above a
/// calibrated baseline by more than a threshold.
#[derive(Parser, Debug)]
#[command(name = "magscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MAGSCAN_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the magnetic field and alert on metal
    Scan(ScanArgs),

    /// List detected magnetometers
    Sensors(SensorsArgs),

    /// Compute the magnitude of one sample
    Magnitude {
        /// X component in microtesla
        #[arg(allow_negative_numbers = true)]
        x: f32,
        /// Y component in microtesla
        #[arg(allow_negative_numbers = true)]
        y: f32,
        /// Z component in microtesla
        #[arg(allow_negative_numbers = true)]
        z: f32,
    },

    /// Evaluate one magnitude against a baseline and threshold
    Evaluate(EvaluateArgs),

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the scan command
#[derive(Parser, Debug, Default)]
pub struct ScanArgs {
    /// Sample source
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// IIO device name or directory
    #[arg(long)]
    pub device: Option<String>,

    /// Recording to replay (implies --source replay)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Restart the recording when it ends
    #[arg(long = "loop")]
    pub replay_loop: bool,

    /// Delay between samples in milliseconds
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Alert threshold in microtesla (minimum 1)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Minimum time between haptic pulses in milliseconds
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Calibrate on the first sample
    #[arg(long)]
    pub calibrate: bool,

    /// Stop after this many readings
    #[arg(short = 'n', long)]
    pub max_samples: Option<u64>,

    /// Disable haptic feedback
    #[arg(long)]
    pub no_haptic: bool,

    /// External vibration command; `{ms}` expands to the pulse length
    #[arg(long)]
    pub haptic_command: Option<String>,

    /// Do not read interactive controls from stdin
    #[arg(long)]
    pub no_controls: bool,
}

/// Arguments for the sensors command
#[derive(Parser, Debug)]
pub struct SensorsArgs {
    /// Root of the IIO device tree
    #[arg(long)]
    pub iio_root: Option<PathBuf>,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Field magnitude in microtesla
    #[arg(short, long)]
    pub magnitude: f64,

    /// Calibrated baseline in microtesla
    #[arg(short, long, default_value = "0")]
    pub baseline: f64,

    /// Alert threshold in microtesla
    #[arg(short, long)]
    pub threshold: f64,
}

/// Sample source argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SourceArg {
    /// Linux IIO sysfs magnetometer
    Iio,
    /// Recorded samples from a file
    Replay,
}

impl From<SourceArg> for SourceSelection {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Iio => SourceSelection::Iio,
            SourceArg::Replay => SourceSelection::Replay,
        }
    }
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
