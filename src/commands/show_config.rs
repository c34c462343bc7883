//! Config command implementation
//!
//! Prints the effective configuration after file loading.

use crate::cli::args::OutputFormat;
use crate::config::{ConfigBuilder, ConfigFile};
use crate::error::Result;

use std::io::{self, Write};

/// Execute the config command
pub fn run_config(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path)?.build()?;

    let text = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&config).map_err(crate::error::ConfigError::from)?
        }
        OutputFormat::Table | OutputFormat::Compact => ConfigFile::to_toml(&config)?,
    };

    let mut out = io::stdout().lock();
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}
