//! Magnetometer sample types
//!
//! Raw tri-axial samples and the derived field magnitude.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw magnetometer reading in microtesla
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SensorSample {
    /// Create a new sample
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the sample
    pub fn magnitude(&self) -> Magnitude {
        Magnitude::from_components(self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for SensorSample {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Field strength in microtesla
///
/// Computed in double precision from single precision components.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Magnitude(f64);

impl Magnitude {
    /// Zero field
    pub const ZERO: Magnitude = Magnitude(0.0);

    /// Wrap an already computed magnitude
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// sqrt(x² + y² + z²)
    pub fn from_components(x: f32, y: f32, z: f32) -> Self {
        let (x, y, z) = (x as f64, y as f64, z as f64);
        Self((x * x + y * y + z * z).sqrt())
    }

    /// Get the value in microtesla
    #[inline]
    pub const fn as_microtesla(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} µT", self.0)
    }
}

impl From<f64> for Magnitude {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Magnitude> for f64 {
    fn from(m: Magnitude) -> Self {
        m.0
    }
}
