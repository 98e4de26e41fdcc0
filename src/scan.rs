//! Scan ingestion: raw polar ranges to validated range/angle/Cartesian arrays.

use crate::error::{DatmoError, Result};
use crate::types::{polar_to_cartesian, Point, RawScan, ScanGeometry};

/// One validated sweep. `ranges`, `angles` and `points` always share a length.
#[derive(Clone, Debug)]
pub struct Scan {
    pub geometry: ScanGeometry,
    pub ranges: Vec<f64>,
    pub angles: Vec<f64>,
    pub points: Vec<Point>,
}

impl Scan {
    /// Convert a raw scan, clamping every reading outside the open interval
    /// `(range_min, range_max)` to `range_max`. Missing or NaN samples count as
    /// out of range.
    ///
    /// Fails only when the geometry implies more than `capacity` beams.
    pub fn ingest(raw: &RawScan, capacity: usize) -> Result<Self> {
        let geometry = raw.geometry;
        let requested = geometry.beam_count();
        if !requested.is_finite() || requested > capacity as f64 {
            return Err(DatmoError::BeamOverflow {
                requested,
                capacity,
            });
        }
        let nb_beams = requested.max(0.0) as usize;

        if raw.ranges.len() < nb_beams {
            log::warn!(
                "scan carries {} ranges for {} beams, padding with range_max",
                raw.ranges.len(),
                nb_beams
            );
        }

        let mut ranges = Vec::with_capacity(nb_beams);
        let mut angles = Vec::with_capacity(nb_beams);
        let mut points = Vec::with_capacity(nb_beams);

        for i in 0..nb_beams {
            let angle = geometry.angle_min + i as f64 * geometry.angle_increment;
            let range = match raw.ranges.get(i) {
                Some(&r) if r > geometry.range_min && r < geometry.range_max => r,
                _ => geometry.range_max,
            };
            ranges.push(range);
            angles.push(angle);
            points.push(polar_to_cartesian(range, angle));
        }

        Ok(Scan {
            geometry,
            ranges,
            angles,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
