// pipeline.rs: per-cycle person detection and tracking
//
// Owns every piece of cross-cycle state: the background table, the dynamic
// mask, the tracker, the latched inputs and the previous platform-motion flag.
// Inputs are fed as they arrive; `tick()` runs the whole chain once both a
// fresh scan and a fresh motion flag are available:
//
//   scan → background motion → clustering → legs → persons → tracker

use serde::Serialize;

use crate::background::{BackgroundModel, DynamicMask};
use crate::classifier::{detect_legs, detect_persons, LegCandidate, PersonCandidate};
use crate::clustering::{cluster_scan, Cluster};
use crate::config::DatmoConfig;
use crate::error::Result;
use crate::input::InputLatch;
use crate::scan::Scan;
use crate::session::Frame;
use crate::tracker::{SingleTargetTracker, TrackedTarget, TrackerEvent};
use crate::types::{Point, RawScan};

// ─── Cycle outcome ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum WaitingFor {
    Scan { ever_received: bool },
    MotionFlag { ever_received: bool },
}

#[derive(Clone, Debug, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub robot_moving: bool,
    /// Background overwritten from this cycle's scan.
    pub resynchronized: bool,
    pub nb_beams: usize,
    pub dynamic_beams: usize,
    pub clusters: usize,
    pub legs: usize,
    pub persons: usize,
    pub moving_persons: usize,
    pub event: Option<TrackerEvent>,
    pub published: Option<Point>,
    pub target: Option<TrackedTarget>,
}

#[derive(Clone, Debug)]
pub enum CycleOutcome {
    Waiting(WaitingFor),
    Processed(CycleReport),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Processed(report) => Some(report),
            CycleOutcome::Waiting(_) => None,
        }
    }
}

// ─── The pipeline ────────────────────────────────────────────────────────────

pub struct DatmoPipeline {
    config: DatmoConfig,
    scan: InputLatch<Scan>,
    robot_moving: InputLatch<bool>,

    background: BackgroundModel,
    mask: DynamicMask,
    tracker: SingleTargetTracker,
    previous_robot_moving: bool,

    // Last cycle's stage outputs
    clusters: Vec<Cluster>,
    legs: Vec<LegCandidate>,
    persons: Vec<PersonCandidate>,

    cycles: u64,
    positions_published: u64,
}

impl DatmoPipeline {
    pub fn new(config: DatmoConfig) -> Self {
        DatmoPipeline {
            scan: InputLatch::new("laser scan"),
            robot_moving: InputLatch::new("robot motion flag"),
            background: BackgroundModel::new(config.motion_threshold),
            mask: DynamicMask::default(),
            tracker: SingleTargetTracker::new(&config),
            // The platform is assumed to have been moving before the first
            // cycle, so a stationary start counts as a stop
            previous_robot_moving: true,
            clusters: Vec::new(),
            legs: Vec::new(),
            persons: Vec::new(),
            cycles: 0,
            positions_published: 0,
            config,
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────────

    /// Ingest and latch a scan. Fails when the scan geometry overflows
    /// `max_beams`, which callers should treat as fatal.
    pub fn feed_scan(&mut self, raw: &RawScan) -> Result<()> {
        let scan = Scan::ingest(raw, self.config.max_beams)?;
        self.scan.update(scan);
        Ok(())
    }

    pub fn feed_robot_moving(&mut self, moving: bool) {
        self.robot_moving.update(moving);
    }

    /// Feed whatever a recorded frame carries, then tick.
    pub fn feed_frame(&mut self, frame: &Frame) -> Result<CycleOutcome> {
        if let Some(scan) = &frame.scan {
            self.feed_scan(scan)?;
        }
        if let Some(moving) = frame.robot_moving {
            self.feed_robot_moving(moving);
        }
        Ok(self.tick())
    }

    // ── Per-cycle ────────────────────────────────────────────────────────

    pub fn tick(&mut self) -> CycleOutcome {
        let scan = match self.scan.get() {
            Some(scan) if self.scan.is_fresh() => scan,
            _ => {
                return self.waiting(WaitingFor::Scan {
                    ever_received: self.scan.ever_received(),
                })
            }
        };
        let robot_moving = match self.robot_moving.get() {
            Some(&moving) if self.robot_moving.is_fresh() => moving,
            _ => {
                return self.waiting(WaitingFor::MotionFlag {
                    ever_received: self.robot_moving.ever_received(),
                })
            }
        };

        let resync = !robot_moving && self.previous_robot_moving;
        let initial_store = self.background.needs_store(scan);
        if initial_store {
            self.background.store(scan);
        }
        if robot_moving && !self.previous_robot_moving {
            log::info!("platform started moving");
        }

        self.background.detect(scan, &mut self.mask);
        self.clusters = cluster_scan(scan, &self.mask, self.config.cluster_threshold);
        self.legs = detect_legs(
            &self.clusters,
            self.config.leg_size_min,
            self.config.leg_size_max,
            self.config.dynamic_threshold,
        );
        self.persons = detect_persons(&self.legs, self.config.legs_distance_max);
        let event = self.tracker.update(&self.persons, resync);
        let dynamic_beams = self.mask.count();

        // Moving→stationary edge: detection above ran against the pre-stop
        // background, the next cycle starts over from this scan
        if resync {
            self.background.store(scan);
            self.mask.reset(scan.len());
            log::info!("platform stopped, background resynchronized");
        }
        let resynchronized = initial_store || resync;

        let published = event.as_ref().and_then(TrackerEvent::published);
        if published.is_some() {
            self.positions_published += 1;
        }

        self.cycles += 1;
        let report = CycleReport {
            cycle: self.cycles,
            robot_moving,
            resynchronized,
            nb_beams: scan.len(),
            dynamic_beams,
            clusters: self.clusters.len(),
            legs: self.legs.len(),
            persons: self.persons.len(),
            moving_persons: self.persons.iter().filter(|p| p.is_dynamic).count(),
            event,
            published,
            target: self.tracker.target().copied(),
        };
        log::debug!(
            "cycle {}: {} dynamic beams, {} clusters, {} legs, {} persons",
            report.cycle,
            report.dynamic_beams,
            report.clusters,
            report.legs,
            report.persons
        );

        self.previous_robot_moving = robot_moving;
        self.scan.consume();
        self.robot_moving.consume();
        CycleOutcome::Processed(report)
    }

    fn waiting(&self, reason: WaitingFor) -> CycleOutcome {
        let (name, ever_received) = match reason {
            WaitingFor::Scan { ever_received } => (&self.scan.name, ever_received),
            WaitingFor::MotionFlag { ever_received } => (&self.robot_moving.name, ever_received),
        };
        if ever_received {
            log::debug!("waiting for a fresh {}", name);
        } else {
            log::warn!("waiting for {}: nothing received yet", name);
        }
        CycleOutcome::Waiting(reason)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &DatmoConfig {
        &self.config
    }

    pub fn background(&self) -> &BackgroundModel {
        &self.background
    }

    /// Beams flagged during the last processed cycle.
    pub fn dynamic_mask(&self) -> &DynamicMask {
        &self.mask
    }

    pub fn last_scan(&self) -> Option<&Scan> {
        self.scan.get()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn legs(&self) -> &[LegCandidate] {
        &self.legs
    }

    pub fn persons(&self) -> &[PersonCandidate] {
        &self.persons
    }

    pub fn tracker(&self) -> &SingleTargetTracker {
        &self.tracker
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn positions_published(&self) -> u64 {
        self.positions_published
    }

    pub fn scan_input(&self) -> &InputLatch<Scan> {
        &self.scan
    }

    pub fn motion_input(&self) -> &InputLatch<bool> {
        &self.robot_moving
    }
}
