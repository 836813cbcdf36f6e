//! The view-frame cache: for every ordered pair of residues in a protein, the vector from one to
//! the other expressed in the first residue's local frame. This is the rotation-invariant
//! representation SSAP's inner DP compares across two different structures.

use nalgebra::Vector3;

use crate::protein::Protein;
use crate::seq::ResIdx;

/// A dense `n x n` cache of view vectors for one protein. `cache[(i, j)]` is the vector from
/// residue `i` to residue `j`, expressed in residue `i`'s local frame. The diagonal is never
/// read and is stored as the zero vector.
#[derive(Clone, Debug)]
pub struct ViewFrameCache {
    n: usize,
    vectors: Vec<Vector3<f64>>,
}

impl ViewFrameCache {
    /// Build the cache for `protein`. `O(n^2)` in both time and space.
    #[must_use]
    pub fn build(protein: &Protein) -> Self {
        let n = protein.len();
        let mut vectors = vec![Vector3::zeros(); n * n];
        for i in 0..n {
            let res_i = protein.residue(ResIdx::new(i as u32));
            for j in 0..n {
                if i == j {
                    continue;
                }
                let res_j = protein.residue(ResIdx::new(j as u32));
                let global = res_j.position - res_i.position;
                vectors[i * n + j] = res_i.frame.transpose() * global;
            }
        }
        Self { n, vectors }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The view vector from `i` to `j`. Panics (via `debug_assert`) if `i == j`, whose value is
    /// undefined.
    #[must_use]
    pub fn get(&self, i: ResIdx, j: ResIdx) -> Vector3<f64> {
        debug_assert_ne!(i.get(), j.get(), "the view vector diagonal is undefined");
        self.vectors[i.get() as usize * self.n + j.get() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protein::{AminoAcid, PdbResidueId, Residue, SsTag};
    use nalgebra::{Matrix3, Point3};

    fn residue_at(x: f64, y: f64, z: f64) -> Residue {
        Residue {
            amino_acid: AminoAcid::Ala,
            pdb_id: PdbResidueId {
                chain: 'A',
                resno: 1,
                insert_code: None,
            },
            position: Point3::new(x, y, z),
            frame: Matrix3::identity(),
            ss_tag: SsTag::Other,
            ss_element: None,
        }
    }

    #[test]
    fn identity_frame_reproduces_world_vector() {
        let protein = Protein::new(
            "test".into(),
            vec![residue_at(0.0, 0.0, 0.0), residue_at(1.0, 2.0, 3.0)],
            vec![],
        );
        let cache = ViewFrameCache::build(&protein);
        let v = cache.get(ResIdx::new(0), ResIdx::new(1));
        assert_eq!(v, Vector3::new(1.0, 2.0, 3.0));
        let back = cache.get(ResIdx::new(1), ResIdx::new(0));
        assert_eq!(back, Vector3::new(-1.0, -2.0, -3.0));
    }
}
