//! Linux Industrial I/O magnetometer
//!
//! Reads `in_magn_{x,y,z}_raw` from sysfs. IIO reports magnetic fields in
//! gauss after applying `(raw + offset) * scale`; samples are converted to
//! microtesla.

use super::poller::{Poll, Poller};
use super::traits::{SampleCallback, SampleSource, SensorInfo, SourceKind};
use crate::domain::SensorSample;
use crate::error::SensorError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default sysfs location of IIO devices
pub const DEFAULT_IIO_ROOT: &str = "/sys/bus/iio/devices";

const MICROTESLA_PER_GAUSS: f64 = 100.0;
const AXES: [&str; 3] = ["x", "y", "z"];

/// A magnetometer found under the IIO root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IioDevice {
    /// Driver-reported name (`name` attribute)
    pub name: String,
    /// Device directory, e.g. `/sys/bus/iio/devices/iio:device0`
    pub path: PathBuf,
}

impl IioDevice {
    /// True if `selector` names this device by driver name or directory name
    pub fn matches(&self, selector: &str) -> bool {
        self.name == selector
            || self.path.file_name().and_then(|n| n.to_str()) == Some(selector)
            || self.path == Path::new(selector)
    }
}

/// List magnetometers under `root`
///
/// A missing root yields an empty list.
pub fn discover<P: AsRef<Path>>(root: P) -> Result<Vec<IioDevice>, SensorError> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(root).map_err(|e| read_error(root, e))?;

    let mut devices: Vec<IioDevice> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.join("in_magn_x_raw").exists())
        .map(|path| {
            let name = fs::read_to_string(path.join("name"))
                .map(|s| s.trim().to_string())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| {
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });
            IioDevice { name, path }
        })
        .collect();

    devices.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(devices)
}

#[derive(Debug, Clone)]
struct Axis {
    raw: PathBuf,
    offset: f64,
    scale: f64,
}

impl Axis {
    fn read(&self) -> Result<f64, SensorError> {
        let raw = read_f64(&self.raw)?;
        Ok((raw + self.offset) * self.scale * MICROTESLA_PER_GAUSS)
    }
}

/// Polled IIO magnetometer
pub struct IioMagnetometer {
    device: IioDevice,
    axes: [Axis; 3],
    interval: Duration,
    poller: Option<Poller>,
}

impl IioMagnetometer {
    /// Open a discovered device, reading its scale and offset attributes
    pub fn open(device: IioDevice, interval: Duration) -> Result<Self, SensorError> {
        let shared_scale = read_optional(&device.path.join("in_magn_scale"))?;
        let shared_offset = read_optional(&device.path.join("in_magn_offset"))?;

        let mut axes = Vec::with_capacity(3);
        for axis in AXES {
            let raw = device.path.join(format!("in_magn_{}_raw", axis));
            if !raw.exists() {
                return Err(SensorError::Unavailable(format!(
                    "{} has no {} axis",
                    device.name, axis
                )));
            }
            let scale = read_optional(&device.path.join(format!("in_magn_{}_scale", axis)))?
                .or(shared_scale)
                .unwrap_or(1.0);
            let offset = read_optional(&device.path.join(format!("in_magn_{}_offset", axis)))?
                .or(shared_offset)
                .unwrap_or(0.0);
            axes.push(Axis { raw, offset, scale });
        }

        let axes: [Axis; 3] = axes
            .try_into()
            .map_err(|_| SensorError::Unavailable(device.name.clone()))?;

        log::debug!(
            "Opened IIO magnetometer {} at {}",
            device.name,
            device.path.display()
        );

        Ok(Self {
            device,
            axes,
            interval,
            poller: None,
        })
    }

    /// Find and open a magnetometer under `root`
    ///
    /// With no selector the first device is used.
    pub fn find<P: AsRef<Path>>(
        root: P,
        selector: Option<&str>,
        interval: Duration,
    ) -> Result<Self, SensorError> {
        let devices = discover(root.as_ref())?;

        let device = match selector {
            Some(sel) => devices.into_iter().find(|d| d.matches(sel)).ok_or_else(|| {
                SensorError::Unavailable(format!("no IIO magnetometer matching '{}'", sel))
            })?,
            None => devices.into_iter().next().ok_or_else(|| {
                SensorError::Unavailable(format!(
                    "no IIO magnetometer under {}",
                    root.as_ref().display()
                ))
            })?,
        };

        Self::open(device, interval)
    }

    /// Read one sample synchronously
    pub fn read_sample(&self) -> Result<SensorSample, SensorError> {
        read_axes(&self.axes)
    }

    pub fn device(&self) -> &IioDevice {
        &self.device
    }
}

fn read_axes(axes: &[Axis; 3]) -> Result<SensorSample, SensorError> {
    Ok(SensorSample::new(
        axes[0].read()? as f32,
        axes[1].read()? as f32,
        axes[2].read()? as f32,
    ))
}

impl SampleSource for IioMagnetometer {
    fn info(&self) -> SensorInfo {
        SensorInfo {
            name: self.device.name.clone(),
            kind: SourceKind::Iio,
            location: self.device.path.display().to_string(),
        }
    }

    fn subscribe(&mut self, callback: SampleCallback) -> Result<(), SensorError> {
        if self.poller.is_some() {
            return Err(SensorError::AlreadySubscribed);
        }

        let axes = self.axes.clone();
        let name = self.device.name.clone();
        let mut failing = false;

        let poller = Poller::spawn(
            "iio",
            self.interval,
            move || match read_axes(&axes) {
                Ok(sample) => {
                    failing = false;
                    Poll::Sample(sample)
                }
                Err(e) => {
                    if !failing {
                        log::warn!("{}: {}", name, e);
                        failing = true;
                    }
                    Poll::Skip
                }
            },
            callback,
        )
        .map_err(|e| read_error(&self.device.path, e))?;

        log::info!("Subscribed to {}", self.device.name);
        self.poller = Some(poller);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            log::info!("Unsubscribed from {}", self.device.name);
        }
    }

    fn is_subscribed(&self) -> bool {
        self.poller.is_some()
    }
}

fn read_error(path: &Path, e: impl std::fmt::Display) -> SensorError {
    SensorError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn read_f64(path: &Path) -> Result<f64, SensorError> {
    let text = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    text.trim().parse::<f64>().map_err(|e| read_error(path, e))
}

fn read_optional(path: &Path) -> Result<Option<f64>, SensorError> {
    if path.exists() {
        read_f64(path).map(Some)
    } else {
        Ok(None)
    }
}
