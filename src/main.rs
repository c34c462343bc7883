//! magscan - magnetometer metal detector
//!
//! A command-line tool that watches the magnetic field magnitude and alerts
//! when metal brings it above a calibrated baseline.

use clap::Parser;
use magscan::cli::args::{generate_completions, Cli, Commands};
use magscan::commands::{run_config, run_evaluate, run_magnitude, run_scan, run_sensors};
use magscan::error::{AppError, SensorError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Scan(args) => run_scan(args, cli.format, config_path, cli.verbose),

        Commands::Sensors(args) => run_sensors(args, cli.format, config_path),

        Commands::Magnitude { x, y, z } => run_magnitude(*x, *y, *z, cli.format),

        Commands::Evaluate(args) => run_evaluate(args, cli.format),

        Commands::Config => run_config(cli.format, config_path),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Sensor(SensorError::Unavailable(_)) => {
            eprintln!();
            eprintln!("Hint: No IIO magnetometer was found under /sys/bus/iio/devices.");
            eprintln!("      Run 'magscan sensors' to list devices, or replay a");
            eprintln!("      recording with 'magscan scan --file <path>'.");
        }
        AppError::Sensor(SensorError::Read { .. }) => {
            eprintln!();
            eprintln!("Hint: Reading sysfs attributes may need elevated permissions.");
        }
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Hint: Run 'magscan config' to print the effective configuration.");
        }
        _ => {}
    }
}
