//! Residue-pair similarity scoring: the "lower-level" score compared inside SSAP's inner DP, and
//! the property pre-filter used to skip residue pairs that cannot plausibly correspond.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::protein::SecStruc;

/// Tunables for the distance-based pair score.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PairScoring {
    /// The score assigned to a zero-distance (perfect) match.
    pub max_score: f64,
    /// The score floor; distances beyond `max_score` from a match never score below this.
    pub floor: f64,
    /// Maximum summed wrapped-angle difference (degrees) the property pre-filter tolerates
    /// between two secondary-structure signatures before declaring them incompatible.
    pub max_property_angle_diff: f64,
}

impl Default for PairScoring {
    fn default() -> Self {
        Self {
            max_score: 20.0,
            floor: 0.0,
            max_property_angle_diff: 120.0,
        }
    }
}

/// The residue-pair similarity between view vector `a` (in structure A) and view vector `b`
/// (in structure B), a monotone-decreasing function of their Euclidean distance, clamped to
/// `scoring.floor`.
#[must_use]
pub fn pair_score(a: Vector3<f64>, b: Vector3<f64>, scoring: PairScoring) -> f64 {
    let distance = (a - b).norm();
    (scoring.max_score - distance).max(scoring.floor)
}

/// The residue-pair similarity used directly inside the inner DP cell function. Returns `0` for
/// a self-comparison (`i == j` within either structure), since that can never represent a valid
/// correspondence.
#[must_use]
pub fn residue_pair_score(
    i_is_j_in_a: bool,
    i_is_j_in_b: bool,
    a: Vector3<f64>,
    b: Vector3<f64>,
    scoring: PairScoring,
) -> f64 {
    if i_is_j_in_a || i_is_j_in_b {
        0.0
    } else {
        pair_score(a, b, scoring)
    }
}

/// The property pre-filter: `false` when the two secondary-structure signatures are too
/// dissimilar for `(res_a, res_b)` to be worth comparing in the full SSAP pass.
#[must_use]
pub fn properties_compatible(ss_a: &SecStruc, ss_b: &SecStruc, scoring: PairScoring) -> bool {
    ss_a.kind == ss_b.kind && ss_a.angle_distance(ss_b) <= scoring.max_property_angle_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_max() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let scoring = PairScoring::default();
        assert!((pair_score(v, v, scoring) - scoring.max_score).abs() < 1e-9);
    }

    #[test]
    fn score_is_floored_not_negative() {
        let scoring = PairScoring {
            max_score: 5.0,
            floor: 0.0,
            ..PairScoring::default()
        };
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(100.0, 0.0, 0.0);
        assert_eq!(pair_score(a, b, scoring), 0.0);
    }

    #[test]
    fn self_comparisons_always_score_zero() {
        let scoring = PairScoring::default();
        let v = Vector3::new(0.0, 0.0, 0.0);
        assert_eq!(residue_pair_score(true, false, v, v, scoring), 0.0);
    }
}
