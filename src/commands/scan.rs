//! Scan command implementation
//!
//! Runs the detector loop against a live or recorded magnetometer.

use crate::cli::args::{OutputFormat, ScanArgs};
use crate::cli::output::{print_output, SessionSummary};
use crate::config::{Config, ConfigBuilder};
use crate::display::{spawn_display, DisplaySink, TerminalDisplay};
use crate::error::Result;
use crate::haptics::HapticManager;
use crate::sensor::{open_source, SampleSource};
use crate::services::{
    install_interrupt_handler, spawn_control_reader, Monitor, MonitorConfig, CONTROLS_HELP,
};
use crate::stream;

use std::io::{self, BufRead, BufReader};

/// Execute the scan command
pub fn run_scan(
    args: &ScanArgs,
    format: OutputFormat,
    config_path: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let config = build_config(args, config_path, verbose)?;
    let mut source = open_source(&config.sensor)?;
    let info = source.info();

    if config.general.verbose {
        log::info!("Starting scan");
        log::info!("  Source: {} ({})", info.name, info.location);
        log::info!("  Threshold: {} µT", config.detector.threshold);
        log::info!("  Cooldown: {:?}", config.detector.cooldown());
    }

    let display = TerminalDisplay::stdout(format, config.display.history)
        .with_sparkline_width(config.display.sparkline_width);

    let controls = if args.no_controls {
        None
    } else {
        eprintln!("{}", CONTROLS_HELP);
        Some(BufReader::new(io::stdin()))
    };

    let summary = scan_session(
        &config,
        args.max_samples,
        &mut source,
        display,
        config.haptic.to_manager(),
        controls,
        true,
    )?;

    print_output(&summary, format)?;
    Ok(())
}

/// Merge the config file with the scan flags
pub fn build_config(
    args: &ScanArgs,
    config_path: Option<&str>,
    verbose: bool,
) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_verbose(verbose.then_some(true))
        .with_source(args.source.map(Into::into))
        .with_device(args.device.clone())
        .with_replay_file(args.file.clone())
        .with_replay_loop(args.replay_loop.then_some(true))
        .with_interval_ms(args.interval_ms)
        .with_threshold(args.threshold)
        .with_cooldown_ms(args.cooldown_ms)
        .with_calibrate(args.calibrate.then_some(true))
        .with_haptic_enabled(args.no_haptic.then_some(false))
        .with_haptic_command(args.haptic_command.clone())
        .build()?;
    Ok(config)
}

/// Run one scan session to completion
///
/// Readings go to `sink` on a display thread; `controls`, when given, is
/// read line by line on its own thread. With `interrupts` set, Ctrl-C ends
/// the session like `q`. Returns the session summary once the display has
/// drained.
pub fn scan_session<S, D, R>(
    config: &Config,
    max_samples: Option<u64>,
    source: &mut S,
    sink: D,
    haptics: HapticManager,
    controls: Option<R>,
    interrupts: bool,
) -> Result<SessionSummary>
where
    S: SampleSource + ?Sized,
    D: DisplaySink + 'static,
    R: BufRead + Send + 'static,
{
    let mut monitor_config = MonitorConfig::from_config(config)?;
    monitor_config.max_samples = max_samples;

    let (publisher, subscriber) = stream::latest();
    let display = spawn_display(subscriber, sink)?;
    let mut monitor = Monitor::new(monitor_config, haptics, publisher);

    if let (Some(reader), Some(tx)) = (controls, monitor.sender()) {
        // Left detached: a terminal read cannot be interrupted
        spawn_control_reader(reader, tx)?;
    }

    if let (true, Some(tx)) = (interrupts, monitor.sender()) {
        if let Err(e) = install_interrupt_handler(tx) {
            log::warn!("Ctrl-C handler not installed: {}", e);
        }
    }

    let result = monitor.run(source);

    let summary = SessionSummary {
        source: source.info().name,
        scan_state: monitor.session().scan_state(),
        baseline: monitor.session().baseline().value(),
        threshold: monitor.session().threshold().value(),
        stats: monitor.session().stats(),
        skipped_frames: monitor.skipped_frames(),
    };

    // Dropping the monitor closes the stream and lets the display finish
    drop(monitor);
    if display.join().is_err() {
        log::warn!("Display thread panicked");
    }

    result?;
    Ok(summary)
}
