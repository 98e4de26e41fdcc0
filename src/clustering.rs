//! Euclidean clustering of consecutive laser hits.

use serde::Serialize;

use crate::background::DynamicMask;
use crate::scan::Scan;
use crate::types::{distance, midpoint, Point};

/// A run of consecutive beams, `start..=end`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cluster {
    pub start: usize,
    pub end: usize,
    /// Chord length between the first and last hit.
    pub size: f64,
    /// Mean of the first and last hit, not a centroid.
    pub middle: Point,
    /// Percentage of the cluster's beams flagged dynamic.
    pub dynamic_ratio: f64,
}

impl Cluster {
    pub fn nb_beams(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Split the scan wherever two neighbouring hits are `cluster_threshold` or
/// more apart.
///
/// The final beam is never tested: it always closes the last cluster.
pub fn cluster_scan(scan: &Scan, mask: &DynamicMask, cluster_threshold: f64) -> Vec<Cluster> {
    let nb_beams = scan.len();
    if nb_beams == 0 {
        return Vec::new();
    }

    let mut bounds: Vec<(usize, usize)> = vec![(0, 0)];
    for hit in 1..nb_beams - 1 {
        if distance(&scan.points[hit - 1], &scan.points[hit]) < cluster_threshold {
            if let Some(last) = bounds.last_mut() {
                last.1 = hit;
            }
        } else {
            bounds.push((hit, hit));
        }
    }
    if let Some(last) = bounds.last_mut() {
        last.1 = nb_beams - 1;
    }

    let clusters: Vec<Cluster> = bounds
        .into_iter()
        .map(|(start, end)| describe(scan, mask, start, end))
        .collect();

    log::debug!("{} clusters over {} beams", clusters.len(), nb_beams);
    clusters
}

fn describe(scan: &Scan, mask: &DynamicMask, start: usize, end: usize) -> Cluster {
    let first = &scan.points[start];
    let last = &scan.points[end];
    let nb_beams = end - start + 1;
    let dynamic_ratio = mask.count_in(start, end) as f64 / nb_beams as f64 * 100.0;

    Cluster {
        start,
        end,
        size: distance(first, last),
        middle: midpoint(first, last),
        dynamic_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawScan, ScanGeometry};
    use approx::assert_relative_eq;

    /// Points along the x axis at the given coordinates, via a zero-width fan.
    fn scan_from_points(points: &[(f64, f64)]) -> Scan {
        let raw = RawScan {
            geometry: ScanGeometry {
                range_min: 0.0,
                range_max: 100.0,
                angle_min: 0.0,
                angle_max: points.len() as f64,
                angle_increment: 1.0,
            },
            ranges: vec![1.0; points.len()],
        };
        let mut scan = Scan::ingest(&raw, 1000).unwrap();
        scan.points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        scan
    }

    fn empty_mask(n: usize) -> DynamicMask {
        let mut mask = DynamicMask::default();
        mask.reset(n);
        mask
    }

    #[test]
    fn test_gap_splits_clusters() {
        let scan = scan_from_points(&[
            (0.0, 0.0),
            (0.1, 0.0),
            (0.2, 0.0),
            (1.0, 0.0),
            (1.1, 0.0),
            (1.2, 0.0),
        ]);
        let clusters = cluster_scan(&scan, &empty_mask(6), 0.2);

        assert_eq!(clusters.len(), 2);
        assert_eq!((clusters[0].start, clusters[0].end), (0, 2));
        assert_eq!((clusters[1].start, clusters[1].end), (3, 5));
        assert_relative_eq!(clusters[0].size, 0.2, epsilon = 1e-12);
        assert_relative_eq!(clusters[1].middle.x, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_last_beam_always_closes_last_cluster() {
        // The final hit is far from its neighbour but still joins
        let scan = scan_from_points(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (9.0, 9.0)]);
        let clusters = cluster_scan(&scan, &empty_mask(4), 0.2);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].end, 3);

        // Isolated hits before the end each get their own cluster
        let scan = scan_from_points(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.05, 0.0)]);
        let clusters = cluster_scan(&scan, &empty_mask(4), 0.2);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.last().unwrap().end, scan.len() - 1);
    }

    #[test]
    fn test_size_is_a_chord() {
        // A right-angle corner: perimeter 2.0, chord sqrt(2)
        let scan = scan_from_points(&[
            (0.0, 0.0),
            (0.1, 0.0),
            (1.0, 0.0),
            (1.0, 0.1),
            (1.0, 1.0),
            (1.0, 1.0),
        ]);
        let clusters = cluster_scan(&scan, &empty_mask(6), 1.0);

        assert_eq!(clusters.len(), 1);
        assert_relative_eq!(clusters[0].size, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(clusters[0].middle.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(clusters[0].middle.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_dynamic_ratio() {
        let scan = scan_from_points(&[
            (0.0, 0.0),
            (0.1, 0.0),
            (0.2, 0.0),
            (0.3, 0.0),
            (5.0, 0.0),
            (5.1, 0.0),
        ]);
        let mut mask = empty_mask(6);
        mask.mark(0);
        mask.mark(3);
        mask.mark(4);
        mask.mark(5);
        let clusters = cluster_scan(&scan, &mask, 0.2);

        assert_eq!(clusters.len(), 2);
        assert_relative_eq!(clusters[0].dynamic_ratio, 50.0);
        assert_relative_eq!(clusters[1].dynamic_ratio, 100.0);
    }

    #[test]
    fn test_tiny_scans() {
        let scan = scan_from_points(&[]);
        assert!(cluster_scan(&scan, &empty_mask(0), 0.2).is_empty());

        let scan = scan_from_points(&[(1.0, 0.0)]);
        let clusters = cluster_scan(&scan, &empty_mask(1), 0.2);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].nb_beams(), 1);
        assert_eq!(clusters[0].size, 0.0);

        let scan = scan_from_points(&[(1.0, 0.0), (4.0, 0.0)]);
        let clusters = cluster_scan(&scan, &empty_mask(2), 0.2);
        assert_eq!(clusters.len(), 1);
        assert_eq!((clusters[0].start, clusters[0].end), (0, 1));
    }
}
