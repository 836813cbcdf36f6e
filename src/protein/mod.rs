//! The protein model: residues with coordinates and an intrinsic frame, secondary structure
//! elements, and the protein that owns both. Cross-references between residues and secondary
//! structure elements are plain integer indices (arena+index), never pointers, so the model
//! carries no reference cycles and is trivially `Clone`/`Send`/`Sync`.

mod aminoacid;

pub use aminoacid::AminoAcid;

use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};

use crate::seq::{ResIdx, SeqSeg};

/// A residue's identity in the original file: chain, author residue number and insertion code.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct PdbResidueId {
    pub chain: char,
    pub resno: i32,
    pub insert_code: Option<char>,
}

impl std::fmt::Display for PdbResidueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chain, self.resno)?;
        if let Some(code) = self.insert_code {
            write!(f, "{code}")?;
        }
        Ok(())
    }
}

/// The coarse secondary-structure state of a residue.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum SsTag {
    Helix,
    Strand,
    #[default]
    Other,
}

impl SsTag {
    /// Map a DSSP secondary-structure letter onto the coarse tag used by SSAP.
    #[must_use]
    pub const fn from_dssp_code(code: char) -> Self {
        match code {
            'H' | 'G' | 'I' => Self::Helix,
            'E' | 'B' => Self::Strand,
            _ => Self::Other,
        }
    }
}

/// One residue: identity, backbone position, local orthonormal frame and secondary-structure
/// annotation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Residue {
    pub amino_acid: AminoAcid,
    pub pdb_id: PdbResidueId,
    /// Backbone Cα position.
    pub position: Point3<f64>,
    /// An orthonormal basis local to this residue, its columns the unit vectors of the frame.
    pub frame: Matrix3<f64>,
    pub ss_tag: SsTag,
    /// Index into [`Protein::sec_strucs`], if this residue belongs to an element.
    pub ss_element: Option<usize>,
}

/// A contiguous helix or strand, with the planar-angle signature used by the SSAP driver's
/// secondary-structure bonus (`context_sec`).
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct SecStruc {
    pub kind: SsTag,
    pub seg: SeqSeg,
    /// Representative `(phi, psi, omega)` angles in degrees, as read from a SEC file or derived
    /// from backbone geometry.
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
}

impl SecStruc {
    /// Angular distance used by the property pre-filter: the sum of absolute per-angle
    /// differences, each wrapped into `[-180, 180]`.
    #[must_use]
    pub fn angle_distance(&self, other: &Self) -> f64 {
        fn wrapped_diff(a: f64, b: f64) -> f64 {
            let d = (a - b) % 360.0;
            if d > 180.0 {
                360.0 - d
            } else if d < -180.0 {
                360.0 + d
            } else {
                d.abs()
            }
        }
        wrapped_diff(self.phi, other.phi)
            + wrapped_diff(self.psi, other.psi)
            + wrapped_diff(self.omega, other.omega)
    }
}

/// An immutable, ordered protein domain: residues with dense 0-based indices and the secondary
/// structure elements built over them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Protein {
    pub name: String,
    residues: Vec<Residue>,
    sec_strucs: Vec<SecStruc>,
}

impl Protein {
    #[must_use]
    pub const fn new(name: String, residues: Vec<Residue>, sec_strucs: Vec<SecStruc>) -> Self {
        Self {
            name,
            residues,
            sec_strucs,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    #[must_use]
    pub fn residue(&self, idx: ResIdx) -> &Residue {
        &self.residues[idx.get() as usize]
    }

    #[must_use]
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    #[must_use]
    pub fn sec_strucs(&self) -> &[SecStruc] {
        &self.sec_strucs
    }

    /// Number of residues belonging to a secondary structure element, used by the SSAP driver
    /// to decide whether the fast pass is worth running.
    #[must_use]
    pub fn ss_residue_count(&self) -> usize {
        self.residues
            .iter()
            .filter(|r| r.ss_element.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::ResIdx;

    fn residue(tag: SsTag, ss_element: Option<usize>) -> Residue {
        Residue {
            amino_acid: AminoAcid::Gly,
            pdb_id: PdbResidueId {
                chain: 'A',
                resno: 1,
                insert_code: None,
            },
            position: Point3::origin(),
            frame: Matrix3::identity(),
            ss_tag: tag,
            ss_element,
        }
    }

    #[test]
    fn ss_residue_count_only_counts_annotated_residues() {
        let protein = Protein::new(
            "test".to_string(),
            vec![
                residue(SsTag::Helix, Some(0)),
                residue(SsTag::Other, None),
                residue(SsTag::Strand, Some(1)),
            ],
            vec![
                SecStruc {
                    kind: SsTag::Helix,
                    seg: SeqSeg::new(ResIdx(0), ResIdx(0)).unwrap(),
                    phi: -60.0,
                    psi: -45.0,
                    omega: 180.0,
                },
                SecStruc {
                    kind: SsTag::Strand,
                    seg: SeqSeg::new(ResIdx(2), ResIdx(2)).unwrap(),
                    phi: -120.0,
                    psi: 130.0,
                    omega: 180.0,
                },
            ],
        );
        assert_eq!(protein.ss_residue_count(), 2);
    }

    #[test]
    fn dssp_code_mapping() {
        assert_eq!(SsTag::from_dssp_code('H'), SsTag::Helix);
        assert_eq!(SsTag::from_dssp_code('E'), SsTag::Strand);
        assert_eq!(SsTag::from_dssp_code('T'), SsTag::Other);
    }
}
