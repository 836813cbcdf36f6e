//! File format readers and writers: PDB/DSSP/SEC structure input, pairwise scores input, and the
//! FASTA/TSV/JSON outputs of the three engines.

mod dssp;
mod fasta;
mod pdb;
mod resolver_out;
mod scores;
mod sec;
mod superposition_out;

pub use dssp::parse_dssp;
pub use fasta::{parse_fasta, write_fasta};
pub use pdb::parse_pdb;
pub use resolver_out::write_resolver_tsv;
pub use scores::{parse_scores, ScoreRecord};
pub use sec::{into_sec_strucs, parse_sec, SecRecord};
pub use superposition_out::write_superposition_json;

use std::collections::HashMap;

use crate::error::Error;
use crate::protein::{PdbResidueId, Protein, Residue};

/// Assemble a [`Protein`] from a PDB residue list, an optional DSSP tag lookup, and optional SEC
/// records, resolving SEC boundaries against the PDB residues' own numbering.
///
/// # Errors
/// See [`into_sec_strucs`].
pub fn assemble_protein(
    name: String,
    mut residues: Vec<Residue>,
    dssp_tags: Option<&HashMap<PdbResidueId, crate::protein::SsTag>>,
    sec_records: &[SecRecord],
) -> Result<Protein, Error> {
    if let Some(tags) = dssp_tags {
        for residue in &mut residues {
            if let Some(&tag) = tags.get(&residue.pdb_id) {
                residue.ss_tag = tag;
            }
        }
    }

    let resolve = |chain: char, resno: i32| {
        residues
            .iter()
            .position(|r| r.pdb_id.chain == chain && r.pdb_id.resno == resno)
            .map(|i| crate::seq::ResIdx::new(i as u32))
    };
    let sec_strucs = into_sec_strucs(sec_records, resolve)?;

    for (element_index, sec) in sec_strucs.iter().enumerate() {
        let seg = sec.seg;
        for residue in &mut residues[seg.start().get() as usize..=seg.stop().get() as usize] {
            residue.ss_element = Some(element_index);
        }
    }

    Ok(Protein::new(name, residues, sec_strucs))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_PDB: &str = "\
ATOM      1  N   ALA A   1      10.000  10.000  10.000  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.000  10.000  10.000  1.00  0.00           C
ATOM      3  C   ALA A   1      11.000  11.000  10.000  1.00  0.00           C
ATOM      4  N   GLY A   2      12.000  11.000  10.000  1.00  0.00           N
ATOM      5  CA  GLY A   2      13.000  11.000  10.000  1.00  0.00           C
ATOM      6  C   GLY A   2      13.000  12.000  10.000  1.00  0.00           C
";

    #[test]
    fn assembles_protein_with_sec_elements() {
        let residues = parse_pdb(MINIMAL_PDB).unwrap();
        let sec = vec![SecRecord {
            chain: 'A',
            start_resno: 1,
            stop_resno: 2,
            kind: crate::protein::SsTag::Helix,
            phi: -60.0,
            psi: -45.0,
            omega: 180.0,
        }];
        let protein = assemble_protein("test".to_string(), residues, None, &sec).unwrap();
        assert_eq!(protein.sec_strucs().len(), 1);
        assert_eq!(protein.residue(crate::seq::ResIdx::new(0)).ss_element, Some(0));
        assert_eq!(protein.residue(crate::seq::ResIdx::new(1)).ss_element, Some(0));
    }
}
