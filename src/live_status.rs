use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::pipeline::DatmoPipeline;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LiveStatus {
    pub timestamp: f64,
    pub cycles: u64,
    pub scans_received: u64,
    pub motion_flags_received: u64,
    pub scans_dropped: u64,
    // Last cycle
    pub robot_moving: bool,
    pub nb_beams: usize,
    pub dynamic_beams: usize,
    pub clusters: usize,
    pub legs: usize,
    pub persons: usize,
    // Tracker
    pub tracking: bool,
    pub target_x: f64,
    pub target_y: f64,
    pub target_frequency: i32,
    pub target_uncertainty: f64,
    pub positions_published: u64,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self {
            timestamp: current_timestamp(),
            ..Self::default()
        }
    }

    pub fn from_pipeline(pipeline: &DatmoPipeline) -> Self {
        let mut status = Self::new();
        status.cycles = pipeline.cycles();
        status.scans_received = pipeline.scan_input().update_count();
        status.motion_flags_received = pipeline.motion_input().update_count();
        status.scans_dropped = pipeline.scan_input().dropped_count();
        status.robot_moving = pipeline.motion_input().get().copied().unwrap_or(false);
        status.nb_beams = pipeline.last_scan().map(|s| s.len()).unwrap_or(0);
        status.dynamic_beams = pipeline.dynamic_mask().count();
        status.clusters = pipeline.clusters().len();
        status.legs = pipeline.legs().len();
        status.persons = pipeline.persons().len();
        status.positions_published = pipeline.positions_published();

        if let Some(target) = pipeline.tracker().target() {
            status.tracking = true;
            status.target_x = target.position.x;
            status.target_y = target.position.y;
            status.target_frequency = target.frequency;
            status.target_uncertainty = target.uncertainty;
        }
        status
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
