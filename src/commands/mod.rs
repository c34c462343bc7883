//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod calc;
pub mod scan;
pub mod sensors;
pub mod show_config;

pub use calc::{run_evaluate, run_magnitude};
pub use scan::run_scan;
pub use sensors::run_sensors;
pub use show_config::run_config;
