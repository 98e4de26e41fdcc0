//! Single-target person tracker
//!
//! Two states: `Idle` and `Tracking`. From `Idle`, the nearest *moving* person
//! closer to the sensor than `uncertainty_max` is acquired. While `Tracking`,
//! every person (moving or not) is a re-association candidate, gated by the
//! current `uncertainty` radius around the last known position.
//!
//! # Hysteresis
//! - Hit: `frequency += 1`, gate shrinks back to `uncertainty_min`
//! - Miss: `frequency -= 1`, gate widens by `uncertainty_inc`
//! - Lost once `frequency <= frequency_init` or `uncertainty >= uncertainty_max`
//!
//! On the moving→stationary edge of the platform the acquisition rule replaces
//! re-association for that cycle.

use serde::Serialize;

use crate::classifier::PersonCandidate;
use crate::config::DatmoConfig;
use crate::types::{distance, lost_sentinel, Point};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackedTarget {
    pub position: Point,
    pub frequency: i32,
    pub uncertainty: f64,
    /// Whether the last update matched a detection.
    pub associated: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TrackerState {
    #[default]
    Idle,
    Tracking(TrackedTarget),
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    Acquired { position: Point, range: f64 },
    Associated { position: Point, frequency: i32, uncertainty: f64 },
    Missed { position: Point, frequency: i32, uncertainty: f64 },
    Lost { last_position: Point, frequency: i32, uncertainty: f64 },
}

impl TrackerEvent {
    /// Position to hand downstream, if this event publishes one.
    pub fn published(&self) -> Option<Point> {
        match self {
            TrackerEvent::Acquired { position, .. } | TrackerEvent::Associated { position, .. } => {
                Some(*position)
            }
            TrackerEvent::Lost { .. } => Some(lost_sentinel()),
            TrackerEvent::Missed { .. } => None,
        }
    }
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct SingleTargetTracker {
    state: TrackerState,
    frequency_init: i32,
    uncertainty_min: f64,
    uncertainty_max: f64,
    uncertainty_inc: f64,
}

impl SingleTargetTracker {
    pub fn new(config: &DatmoConfig) -> Self {
        SingleTargetTracker {
            state: TrackerState::Idle,
            frequency_init: config.frequency_init,
            uncertainty_min: config.uncertainty_min,
            uncertainty_max: config.uncertainty_max,
            uncertainty_inc: config.uncertainty_inc,
        }
    }

    /// Run one cycle over this cycle's person candidates.
    ///
    /// `resync` is true on the cycle the platform came to a stop.
    pub fn update(&mut self, persons: &[PersonCandidate], resync: bool) -> Option<TrackerEvent> {
        let (next, event) = match self.state {
            TrackerState::Idle => self.on_idle(persons),
            TrackerState::Tracking(target) if resync => self.on_resync(target, persons),
            TrackerState::Tracking(target) => self.on_tracking(target, persons),
        };
        self.state = next;
        event
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn target(&self) -> Option<&TrackedTarget> {
        match &self.state {
            TrackerState::Tracking(target) => Some(target),
            TrackerState::Idle => None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking(_))
    }

    fn on_idle(&self, persons: &[PersonCandidate]) -> (TrackerState, Option<TrackerEvent>) {
        match self.acquire(persons) {
            Some((position, range)) => {
                log::info!(
                    "moving person acquired at ({:.2}, {:.2}), {:.2} m away",
                    position.x,
                    position.y,
                    range
                );
                (
                    TrackerState::Tracking(self.fresh_target(position)),
                    Some(TrackerEvent::Acquired { position, range }),
                )
            }
            None => (TrackerState::Idle, None),
        }
    }

    fn on_resync(
        &self,
        target: TrackedTarget,
        persons: &[PersonCandidate],
    ) -> (TrackerState, Option<TrackerEvent>) {
        match self.on_idle(persons) {
            (TrackerState::Idle, _) => {
                log::warn!("platform stopped, no moving person to re-acquire: target dropped");
                (TrackerState::Idle, Some(self.lost(&target)))
            }
            acquired => acquired,
        }
    }

    fn on_tracking(
        &self,
        mut target: TrackedTarget,
        persons: &[PersonCandidate],
    ) -> (TrackerState, Option<TrackerEvent>) {
        let event = match self.reassociate(&target, persons) {
            Some(position) => {
                target.frequency += 1;
                target.uncertainty = self.uncertainty_min;
                target.position = position;
                target.associated = true;
                TrackerEvent::Associated {
                    position,
                    frequency: target.frequency,
                    uncertainty: target.uncertainty,
                }
            }
            None => {
                target.frequency -= 1;
                target.uncertainty += self.uncertainty_inc;
                target.associated = false;
                log::debug!(
                    "tracked person missed at ({:.2}, {:.2}) with frequency = {} and uncertainty = {:.2}",
                    target.position.x,
                    target.position.y,
                    target.frequency,
                    target.uncertainty
                );
                TrackerEvent::Missed {
                    position: target.position,
                    frequency: target.frequency,
                    uncertainty: target.uncertainty,
                }
            }
        };

        if target.frequency <= self.frequency_init || target.uncertainty >= self.uncertainty_max {
            log::warn!(
                "tracked person lost at ({:.2}, {:.2}) with frequency = {} and uncertainty = {:.2}",
                target.position.x,
                target.position.y,
                target.frequency,
                target.uncertainty
            );
            return (TrackerState::Idle, Some(self.lost(&target)));
        }
        (TrackerState::Tracking(target), Some(event))
    }

    /// Nearest moving candidate to the sensor, inside `uncertainty_max`.
    fn acquire(&self, persons: &[PersonCandidate]) -> Option<(Point, f64)> {
        let origin = Point::origin();
        let mut best: Option<(Point, f64)> = None;
        let mut distance_min = self.uncertainty_max;

        for person in persons.iter().filter(|p| p.is_dynamic) {
            let dist = distance(&origin, &person.position);
            if dist < distance_min {
                distance_min = dist;
                best = Some((person.position, dist));
            }
        }
        best
    }

    /// Nearest candidate of any kind to the last position, inside the gate.
    fn reassociate(&self, target: &TrackedTarget, persons: &[PersonCandidate]) -> Option<Point> {
        let mut best = None;
        let mut distance_min = self.uncertainty_max;

        for person in persons {
            let dist = distance(&target.position, &person.position);
            if dist < distance_min && dist <= target.uncertainty {
                distance_min = dist;
                best = Some(person.position);
            }
        }
        best
    }

    fn fresh_target(&self, position: Point) -> TrackedTarget {
        TrackedTarget {
            position,
            frequency: self.frequency_init,
            uncertainty: self.uncertainty_min,
            associated: true,
        }
    }

    fn lost(&self, target: &TrackedTarget) -> TrackerEvent {
        TrackerEvent::Lost {
            last_position: target.position,
            frequency: target.frequency,
            uncertainty: target.uncertainty,
        }
    }
}
