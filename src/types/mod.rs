pub mod geometry;

pub use geometry::*;

use serde::{Deserialize, Serialize};

/// Angular and range limits of one laser sweep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanGeometry {
    pub range_min: f64,
    pub range_max: f64,
    pub angle_min: f64,
    pub angle_max: f64,
    pub angle_increment: f64,
}

impl ScanGeometry {
    /// Beam count implied by the angular limits, before any capacity check.
    /// May be non-finite for a zero increment.
    pub fn beam_count(&self) -> f64 {
        ((self.angle_max - self.angle_min) / self.angle_increment).trunc()
    }
}

/// A laser scan as it arrives from the driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawScan {
    #[serde(flatten)]
    pub geometry: ScanGeometry,
    pub ranges: Vec<f64>,
}
