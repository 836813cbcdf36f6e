//! Rigid-body superposition: Kabsch-fitted rotation+translation per structure, composed along a
//! spanning tree chosen by how much of the multiple alignment two structures actually share.

use nalgebra::linalg::SVD;
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::spanning::{max_spanning_tree, ScoredEdge};

/// A rigid-body transform: `p' = rotation * p + translation`.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub translation: nalgebra::Vector3<f64>,
}

impl RigidTransform {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: nalgebra::Vector3::zeros(),
        }
    }

    #[must_use]
    pub fn apply(&self, p: Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// Compose `self` applied after `inner`: `self.apply(inner.apply(p))`.
    #[must_use]
    pub fn then(&self, inner: &Self) -> Self {
        Self {
            rotation: self.rotation * inner.rotation,
            translation: self.rotation * inner.translation + self.translation,
        }
    }
}

/// Re-project a near-orthonormal matrix onto `SO(3)` (the closest proper rotation, by Frobenius
/// distance), failing if it was further than `tolerance` from already being one.
///
/// # Errors
/// [`ErrorKind::NonTidyRotation`] if the input is further than `tolerance` from `SO(3)`.
pub fn tidy_rotation(matrix: Matrix3<f64>, tolerance: f64) -> Result<Matrix3<f64>, Error> {
    let svd = SVD::new(matrix, true, true);
    let u = svd.u.ok_or_else(svd_failure)?;
    let v_t = svd.v_t.ok_or_else(svd_failure)?;
    let det = (u * v_t).determinant();
    let correction = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, det.signum());
    let tidied = u * correction * v_t;
    let distance = (tidied - matrix).norm();
    if distance > tolerance {
        return Err(Error::with_context(
            ErrorKind::NonTidyRotation,
            CustomError::error(
                "rotation did not tidy onto SO(3)",
                format!("Frobenius distance {distance} exceeds tolerance {tolerance}"),
                Context::none(),
            ),
        ));
    }
    Ok(tidied)
}

fn svd_failure() -> Error {
    Error::with_context(
        ErrorKind::NonTidyRotation,
        CustomError::error(
            "rotation could not be decomposed",
            "singular value decomposition failed to converge",
            Context::none(),
        ),
    )
}

/// Compute the Kabsch transform that rotates+translates `mobile` onto `reference`, minimising
/// RMSD. Both slices must be the same length and in one-to-one correspondence, index for index.
///
/// # Errors
/// If the point sets are empty, mismatched in length, or the resulting rotation cannot be tidied
/// onto `SO(3)` within `tolerance`.
pub fn kabsch(
    mobile: &[Point3<f64>],
    reference: &[Point3<f64>],
    tolerance: f64,
) -> Result<RigidTransform, Error> {
    if mobile.is_empty() || mobile.len() != reference.len() {
        return Err(Error::with_context(
            ErrorKind::NonTidyRotation,
            CustomError::error(
                "cannot superpose an empty or mismatched point set",
                format!(
                    "mobile has {} points, reference has {}",
                    mobile.len(),
                    reference.len()
                ),
                Context::none(),
            ),
        ));
    }
    let n = mobile.len() as f64;
    let centroid_m = mobile.iter().map(|p| p.coords).sum::<nalgebra::Vector3<f64>>() / n;
    let centroid_r = reference.iter().map(|p| p.coords).sum::<nalgebra::Vector3<f64>>() / n;

    let mut covariance = Matrix3::zeros();
    for (m, r) in mobile.iter().zip(reference) {
        let mc = m.coords - centroid_m;
        let rc = r.coords - centroid_r;
        covariance += rc * mc.transpose();
    }

    let svd = SVD::new(covariance, true, true);
    let u = svd.u.ok_or_else(svd_failure)?;
    let v_t = svd.v_t.ok_or_else(svd_failure)?;
    let det = (u * v_t).determinant();
    let correction = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, det.signum());
    let rotation_raw = u * correction * v_t;
    let rotation = tidy_rotation(rotation_raw, tolerance)?;
    let translation = centroid_r - rotation * centroid_m;

    Ok(RigidTransform {
        rotation,
        translation,
    })
}

/// The root-mean-square distance between two equal-length, corresponding point sets.
#[must_use]
pub fn rmsd(a: &[Point3<f64>], b: &[Point3<f64>]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).norm_squared()).sum();
    (sum_sq / a.len() as f64).sqrt()
}

/// Build the superposition order: a spanning tree over `n` structures weighted by how many
/// columns of `alignment` have both structures present, tied-broken by `pairwise_ssap_score`.
///
/// # Errors
/// [`ErrorKind::SpanningTreeDisconnected`] if no spanning tree connects all `n` structures.
pub fn orderer(
    n: usize,
    alignment: &Alignment,
    pairwise_ssap_score: &dyn Fn(usize, usize) -> f64,
) -> Result<Vec<ScoredEdge>, Error> {
    let mut edges = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            let Some(ia) = alignment.entry_index(&a.to_string()) else {
                continue;
            };
            let Some(ib) = alignment.entry_index(&b.to_string()) else {
                continue;
            };
            let shared = alignment.entries()[ia]
                .positions()
                .iter()
                .zip(alignment.entries()[ib].positions())
                .filter(|(x, y)| x.is_some() && y.is_some())
                .count();
            if shared > 0 {
                edges.push(ScoredEdge::with_tie_break(
                    a,
                    b,
                    shared as f64,
                    pairwise_ssap_score(a, b),
                ));
            }
        }
    }
    max_spanning_tree(n, &edges)
}

/// One per-structure entry's placement within a multi-structure superposition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuperpositionContext {
    /// `transforms[i]` places structure `i` into the shared frame; the tree root gets the
    /// identity transform.
    pub transforms: Vec<RigidTransform>,
    pub order: Vec<ScoredEdge>,
}

/// Compose per-edge Kabsch transforms along the superposition order into one transform per
/// structure, root placed at the identity. `positions(s, col)` returns structure `s`'s Cα
/// position at alignment column `col`, if present there.
///
/// # Errors
/// If the orderer cannot connect all `n` structures, or a Kabsch fit along the way fails.
pub fn compose(
    n: usize,
    alignment: &Alignment,
    positions: &dyn Fn(usize, usize) -> Option<Point3<f64>>,
    pairwise_ssap_score: &dyn Fn(usize, usize) -> f64,
    tolerance: f64,
) -> Result<SuperpositionContext, Error> {
    let tree = orderer(n, alignment, pairwise_ssap_score)?;
    let mut transforms = vec![RigidTransform::identity(); n];
    let root = 0;

    for (parent, child) in crate::spanning::bfs_tree_order(n, &tree, root) {
        let mut mobile = Vec::new();
        let mut reference = Vec::new();
        for col in 0..alignment.len() {
            if let (Some(p), Some(c)) = (positions(parent, col), positions(child, col)) {
                reference.push(p);
                mobile.push(c);
            }
        }
        let local = kabsch(&mobile, &reference, tolerance)?;
        transforms[child] = transforms[parent].then(&local);
    }

    Ok(SuperpositionContext {
        transforms,
        order: tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kabsch_recovers_pure_translation() {
        let mobile = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let reference: Vec<Point3<f64>> =
            mobile.iter().map(|p| p + nalgebra::Vector3::new(2.0, 3.0, -1.0)).collect();
        let transform = kabsch(&mobile, &reference, 1e-6).unwrap();
        for (m, r) in mobile.iter().zip(&reference) {
            let moved = transform.apply(*m);
            assert!((moved - r).norm() < 1e-9);
        }
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let pts = vec![Point3::new(1.0, 2.0, 3.0)];
        assert_eq!(rmsd(&pts, &pts), 0.0);
    }

    #[test]
    fn tidy_rotation_accepts_identity() {
        let identity = Matrix3::identity();
        assert_eq!(tidy_rotation(identity, 1e-9).unwrap(), identity);
    }
}
