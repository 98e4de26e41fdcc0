//! Deterministic synthetic scenes for replay and tests
//!
//! A laser at the centre of a circular room watches a two-legged walker pacing
//! back and forth along the x axis. Ranges are ray-cast exactly, so every run
//! of the same `SceneConfig` produces the same frames.

use std::ops::Range;

use crate::session::{Frame, Session};
use crate::types::{Point, RawScan, ScanGeometry};

/// Seconds between two simulated scans.
pub const SCAN_PERIOD: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub geometry: ScanGeometry,
    pub room_radius: f64,
    pub leg_radius: f64,
    /// Distance between the two leg centres.
    pub leg_spacing: f64,
    /// Walker path along x: paces between `near` and `far`, `step` per frame.
    pub near: f64,
    pub far: f64,
    pub step: f64,
    /// Frame at which the walker enters; `None` leaves the room empty.
    pub walker_enters: Option<usize>,
    /// Frames during which the platform reports itself moving.
    pub robot_moving: Option<Range<usize>>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            geometry: ScanGeometry {
                range_min: 0.02,
                range_max: 5.6,
                angle_min: -2.09235,
                angle_max: 2.09235,
                angle_increment: 0.0057856,
            },
            room_radius: 4.0,
            leg_radius: 0.06,
            leg_spacing: 0.3,
            near: 0.6,
            far: 1.8,
            step: 0.2,
            walker_enters: Some(0),
            robot_moving: None,
        }
    }
}

pub struct SimScene {
    config: SceneConfig,
}

impl SimScene {
    pub fn new(config: SceneConfig) -> Self {
        SimScene { config }
    }

    /// Body centre of the walker, between its legs.
    pub fn walker_at(&self, frame: usize) -> Option<Point> {
        let enters = self.config.walker_enters?;
        if frame < enters {
            return None;
        }
        let span = self.config.far - self.config.near;
        if span <= 0.0 {
            return Some(Point::new(self.config.near, 0.0));
        }
        let travelled = self.config.step * (frame - enters) as f64;
        let t = travelled % (2.0 * span);
        let offset = if t <= span { t } else { 2.0 * span - t };
        Some(Point::new(self.config.near + offset, 0.0))
    }

    /// Leg centres, right (negative y) first.
    pub fn legs_at(&self, frame: usize) -> Option<[Point; 2]> {
        let body = self.walker_at(frame)?;
        let half = self.config.leg_spacing / 2.0;
        Some([
            Point::new(body.x, body.y - half),
            Point::new(body.x, body.y + half),
        ])
    }

    pub fn robot_moving_at(&self, frame: usize) -> bool {
        self.config
            .robot_moving
            .as_ref()
            .map(|r| r.contains(&frame))
            .unwrap_or(false)
    }

    pub fn scan_at(&self, frame: usize) -> RawScan {
        let geometry = self.config.geometry;
        let nb_beams = geometry.beam_count().max(0.0) as usize;
        let legs = self.legs_at(frame);

        let ranges = (0..nb_beams)
            .map(|i| {
                let angle = geometry.angle_min + i as f64 * geometry.angle_increment;
                let mut range = self.config.room_radius;
                for leg in legs.iter().flatten() {
                    if let Some(hit) = ray_circle(angle, leg, self.config.leg_radius) {
                        range = range.min(hit);
                    }
                }
                range
            })
            .collect();

        RawScan { geometry, ranges }
    }

    /// `frames` consecutive frames, each carrying both a scan and a motion flag.
    pub fn session(&self, frames: usize) -> Session {
        Session {
            frames: (0..frames)
                .map(|frame| Frame {
                    timestamp: frame as f64 * SCAN_PERIOD,
                    scan: Some(self.scan_at(frame)),
                    robot_moving: Some(self.robot_moving_at(frame)),
                })
                .collect(),
        }
    }
}

/// Distance along a ray from the origin to the first crossing of a circle.
fn ray_circle(angle: f64, center: &Point, radius: f64) -> Option<f64> {
    let (dx, dy) = (angle.cos(), angle.sin());
    let b = dx * center.x + dy * center.y;
    let c = center.coords.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = b - disc.sqrt();
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}
