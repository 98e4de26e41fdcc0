//! Leg and person detection on top of clusters.

use serde::Serialize;

use crate::clustering::Cluster;
use crate::types::{distance, midpoint, Point};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegCandidate {
    /// Index into the cycle's cluster list.
    pub cluster: usize,
    pub position: Point,
    pub size: f64,
    pub is_dynamic: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonCandidate {
    pub position: Point,
    /// Index into the cycle's leg list (even position).
    pub right_leg: usize,
    /// Index into the cycle's leg list (odd position).
    pub left_leg: usize,
    pub is_dynamic: bool,
}

/// A cluster is a leg when its chord lies strictly between the two bounds.
/// It is moving when at least `dynamic_threshold` percent of its beams are.
pub fn detect_legs(
    clusters: &[Cluster],
    leg_size_min: f64,
    leg_size_max: f64,
    dynamic_threshold: f64,
) -> Vec<LegCandidate> {
    clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.size > leg_size_min && c.size < leg_size_max)
        .map(|(index, c)| LegCandidate {
            cluster: index,
            position: c.middle,
            size: c.size,
            is_dynamic: c.dynamic_ratio >= dynamic_threshold,
        })
        .collect()
}

/// Pair legs into persons.
///
/// Legs at even positions are matched against the legs at odd positions that
/// follow them; the first one closer than `legs_distance_max` wins, even if a
/// later one is closer. A left leg may be claimed by several right legs.
pub fn detect_persons(legs: &[LegCandidate], legs_distance_max: f64) -> Vec<PersonCandidate> {
    let mut persons = Vec::new();
    let nb_legs = legs.len();

    for right in (0..nb_legs.saturating_sub(1)).step_by(2) {
        for left in (right + 1..nb_legs).step_by(2) {
            let right_leg = &legs[right];
            let left_leg = &legs[left];
            if distance(&right_leg.position, &left_leg.position) < legs_distance_max {
                persons.push(PersonCandidate {
                    position: midpoint(&right_leg.position, &left_leg.position),
                    right_leg: right,
                    left_leg: left,
                    is_dynamic: right_leg.is_dynamic || left_leg.is_dynamic,
                });
                break;
            }
        }
    }

    log::debug!("{} legs paired into {} persons", nb_legs, persons.len());
    persons
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cluster(size: f64, x: f64, dynamic_ratio: f64) -> Cluster {
        Cluster {
            start: 0,
            end: 1,
            size,
            middle: Point::new(x, 0.0),
            dynamic_ratio,
        }
    }

    fn leg(x: f64, y: f64, is_dynamic: bool) -> LegCandidate {
        LegCandidate {
            cluster: 0,
            position: Point::new(x, y),
            size: 0.1,
            is_dynamic,
        }
    }

    #[test]
    fn test_leg_bounds_are_strict() {
        let clusters = vec![
            cluster(0.05, 0.0, 0.0),
            cluster(0.0501, 1.0, 0.0),
            cluster(0.2499, 2.0, 0.0),
            cluster(0.25, 3.0, 0.0),
            cluster(1.5, 4.0, 0.0),
        ];
        let legs = detect_legs(&clusters, 0.05, 0.25, 75.0);

        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].cluster, 1);
        assert_eq!(legs[1].cluster, 2);
    }

    #[test]
    fn test_leg_dynamic_threshold_inclusive() {
        let clusters = vec![
            cluster(0.1, 0.0, 74.9),
            cluster(0.1, 1.0, 75.0),
            cluster(0.1, 2.0, 100.0),
        ];
        let legs = detect_legs(&clusters, 0.05, 0.25, 75.0);

        let flags: Vec<bool> = legs.iter().map(|l| l.is_dynamic).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn test_pairing_is_first_fit() {
        // leg0 is within range of both leg1 and leg3; leg3 is closer
        let legs = vec![
            leg(1.0, 0.0, false),
            leg(1.0, 0.5, false),
            leg(5.0, 5.0, false),
            leg(1.0, 0.1, false),
        ];
        let persons = detect_persons(&legs, 0.7);

        assert_eq!(persons.len(), 1);
        assert_eq!((persons[0].right_leg, persons[0].left_leg), (0, 1));
        assert_relative_eq!(persons[0].position.y, 0.25);
    }

    #[test]
    fn test_person_dynamic_if_either_leg_moves() {
        let legs = vec![
            leg(1.0, 0.0, true),
            leg(1.0, 0.3, false),
            leg(3.0, 0.0, false),
            leg(3.0, 0.3, false),
        ];
        let persons = detect_persons(&legs, 0.7);

        assert_eq!(persons.len(), 2);
        assert!(persons[0].is_dynamic);
        assert!(!persons[1].is_dynamic);
    }

    #[test]
    fn test_left_leg_can_be_shared() {
        let legs = vec![
            leg(1.0, 0.0, false),
            leg(9.0, 9.0, false),
            leg(1.0, 0.2, false),
            leg(1.0, 0.4, false),
        ];
        let persons = detect_persons(&legs, 0.7);

        // leg0 skips leg1 and takes leg3; leg2 also takes leg3
        assert_eq!(persons.len(), 2);
        assert_eq!((persons[0].right_leg, persons[0].left_leg), (0, 3));
        assert_eq!((persons[1].right_leg, persons[1].left_leg), (2, 3));
    }

    #[test]
    fn test_distance_bound_is_strict() {
        let legs = vec![leg(0.0, 0.0, false), leg(0.0, 0.5, false)];
        assert!(detect_persons(&legs, 0.5).is_empty());
        assert_eq!(detect_persons(&legs, 0.51).len(), 1);
    }

    #[test]
    fn test_odd_leg_counts() {
        assert!(detect_persons(&[], 0.7).is_empty());
        assert!(detect_persons(&[leg(0.0, 0.0, true)], 0.7).is_empty());

        let legs = vec![leg(0.0, 0.0, false), leg(0.0, 0.2, false), leg(0.0, 0.4, false)];
        let persons = detect_persons(&legs, 0.7);
        // leg2 has no odd-positioned leg after it
        assert_eq!(persons.len(), 1);
    }
}
