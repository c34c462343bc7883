//! Sensors command implementation
//!
//! Lists magnetometers found under the IIO device tree.

use crate::cli::args::{OutputFormat, SensorsArgs};
use crate::cli::output::{print_output, SensorList};
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::sensor::{discover, IioDevice, SensorInfo, SourceKind};

use std::path::Path;

/// Execute the sensors command
pub fn run_sensors(
    args: &SensorsArgs,
    format: OutputFormat,
    config_path: Option<&str>,
) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path)?.build()?;
    let root = args
        .iio_root
        .as_deref()
        .unwrap_or(config.sensor.iio_root.as_path());

    let list = list_sensors(root)?;
    print_output(&list, format)?;
    Ok(())
}

/// Collect the magnetometers under `root`
pub fn list_sensors(root: &Path) -> Result<SensorList> {
    log::debug!("Scanning {} for magnetometers", root.display());
    let sensors = discover(root)?.iter().map(sensor_info).collect();
    Ok(SensorList { sensors })
}

fn sensor_info(device: &IioDevice) -> SensorInfo {
    SensorInfo {
        name: device.name.clone(),
        kind: SourceKind::Iio,
        location: device.path.display().to_string(),
    }
}
