//! Per-stage diagnostic markers
//!
//! Plain coloured point lists in the laser frame, one set per stage, for
//! whatever viewer the caller plugs in.

use serde::Serialize;

use crate::background::DynamicMask;
use crate::classifier::{LegCandidate, PersonCandidate};
use crate::clustering::Cluster;
use crate::pipeline::DatmoPipeline;
use crate::scan::Scan;
use crate::tracker::SingleTargetTracker;
use crate::types::{polar_to_cartesian, Point, ScanGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColoredPoint {
    pub point: Point,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Points,
    LineStrip,
}

#[derive(Clone, Debug, Serialize)]
pub struct MarkerSet {
    pub namespace: &'static str,
    pub kind: MarkerKind,
    pub points: Vec<ColoredPoint>,
}

impl MarkerSet {
    fn points(namespace: &'static str) -> Self {
        MarkerSet {
            namespace,
            kind: MarkerKind::Points,
            points: Vec::new(),
        }
    }

    fn push(&mut self, point: Point, color: Color) {
        self.points.push(ColoredPoint { point, color });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Every dynamic beam, in red.
pub fn motion_markers(scan: &Scan, mask: &DynamicMask) -> MarkerSet {
    let mut set = MarkerSet::points("motion");
    for beam in mask.iter().filter(|&b| b < scan.len()) {
        set.push(scan.points[beam], Color::RED);
    }
    set
}

/// Start (green), end (red) and middle of each cluster; the middle is yellow
/// for a moving cluster, white otherwise.
pub fn cluster_markers(scan: &Scan, clusters: &[Cluster], dynamic_threshold: f64) -> MarkerSet {
    let mut set = MarkerSet::points("clusters");
    for cluster in clusters {
        set.push(scan.points[cluster.start], Color::GREEN);
        set.push(scan.points[cluster.end], Color::RED);
        let middle = if cluster.dynamic_ratio >= dynamic_threshold {
            Color::YELLOW
        } else {
            Color::WHITE
        };
        set.push(cluster.middle, middle);
    }
    set
}

/// Every beam of every leg cluster: yellow when moving, white otherwise.
pub fn leg_markers(scan: &Scan, clusters: &[Cluster], legs: &[LegCandidate]) -> MarkerSet {
    let mut set = MarkerSet::points("legs");
    for leg in legs {
        let Some(cluster) = clusters.get(leg.cluster) else {
            continue;
        };
        let color = if leg.is_dynamic { Color::YELLOW } else { Color::WHITE };
        for beam in (cluster.start..=cluster.end).filter(|&b| b < scan.len()) {
            set.push(scan.points[beam], color);
        }
    }
    set
}

pub fn person_markers(persons: &[PersonCandidate]) -> MarkerSet {
    let mut set = MarkerSet::points("persons");
    for person in persons {
        let color = if person.is_dynamic { Color::GREEN } else { Color::RED };
        set.push(person.position, color);
    }
    set
}

/// Green when the target matched a detection this cycle, red when it is
/// coasting. Empty while idle.
pub fn tracked_person_markers(tracker: &SingleTargetTracker) -> MarkerSet {
    let mut set = MarkerSet::points("tracked_person");
    if let Some(target) = tracker.target() {
        let color = if target.associated { Color::GREEN } else { Color::RED };
        set.push(target.position, color);
    }
    set
}

/// Outline of the sensor's coverage: out along the first beam, round the arc
/// at `range_max`, back in along the last beam.
pub fn field_of_view(geometry: &ScanGeometry) -> MarkerSet {
    let mut set = MarkerSet {
        namespace: "field_of_view",
        kind: MarkerKind::LineStrip,
        points: Vec::new(),
    };

    set.push(polar_to_cartesian(geometry.range_min, geometry.angle_min), Color::WHITE);
    set.push(polar_to_cartesian(geometry.range_max, geometry.angle_min), Color::WHITE);

    let nb_beams = geometry.beam_count();
    if nb_beams.is_finite() && nb_beams > 0.0 {
        for i in 1..nb_beams as usize {
            let angle = geometry.angle_min + i as f64 * geometry.angle_increment;
            set.push(polar_to_cartesian(geometry.range_max, angle), Color::WHITE);
        }
    }

    set.push(polar_to_cartesian(geometry.range_max, geometry.angle_max), Color::WHITE);
    set.push(polar_to_cartesian(geometry.range_min, geometry.angle_max), Color::WHITE);
    set
}

/// All marker sets for the pipeline's last processed cycle.
pub fn collect(pipeline: &DatmoPipeline) -> Vec<MarkerSet> {
    let Some(scan) = pipeline.last_scan() else {
        return Vec::new();
    };
    let config = pipeline.config();
    vec![
        motion_markers(scan, pipeline.dynamic_mask()),
        cluster_markers(scan, pipeline.clusters(), config.dynamic_threshold),
        leg_markers(scan, pipeline.clusters(), pipeline.legs()),
        person_markers(pipeline.persons()),
        tracked_person_markers(pipeline.tracker()),
        field_of_view(&scan.geometry),
    ]
}
