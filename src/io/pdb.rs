//! Minimal PDB `ATOM` record reader: enough backbone geometry (N, Cα, C) to build one residue's
//! position and local frame, nothing else. Waters, hetero records and alternate locations beyond
//! `A`/` ` are skipped.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::protein::{AminoAcid, PdbResidueId, Residue, SsTag};

struct BackboneAtoms {
    id: PdbResidueId,
    amino_acid: AminoAcid,
    n: Option<Point3<f64>>,
    ca: Option<Point3<f64>>,
    c: Option<Point3<f64>>,
}

fn parse_coord(line: &str, range: std::ops::Range<usize>, line_index: usize) -> Result<f64, Error> {
    let text = line.get(range.clone()).unwrap_or("").trim();
    text.parse().map_err(|_| {
        Error::with_context(
            ErrorKind::MalformedPdb,
            CustomError::error(
                "malformed coordinate",
                format!("'{text}' is not a valid coordinate"),
                Context::line(Some(line_index), line, range.start, range.len()),
            ),
        )
    })
}

/// Parse the `ATOM` records of a PDB entry into backbone-complete residues, in file order.
///
/// # Errors
/// [`ErrorKind::MalformedPdb`] if a fixed-width field can't be parsed as expected.
pub fn parse_pdb(text: &str) -> Result<Vec<Residue>, Error> {
    let mut atoms: Vec<BackboneAtoms> = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        if line.len() < 54 || !line.starts_with("ATOM") {
            continue;
        }
        let alt_loc = line.as_bytes().get(16).copied().unwrap_or(b' ');
        if alt_loc != b' ' && alt_loc != b'A' {
            continue;
        }
        let atom_name = line.get(12..16).unwrap_or("").trim();
        let res_name = line.get(17..20).unwrap_or("").trim();
        let chain = line.as_bytes().get(21).copied().unwrap_or(b' ') as char;
        let resno_text = line.get(22..26).unwrap_or("").trim();
        let resno: i32 = resno_text.parse().map_err(|_| {
            Error::with_context(
                ErrorKind::MalformedPdb,
                CustomError::error(
                    "malformed residue number",
                    format!("'{resno_text}' is not a valid residue number"),
                    Context::full_line(line_index, line),
                ),
            )
        })?;
        let icode = match line.as_bytes().get(26).copied().unwrap_or(b' ') as char {
            ' ' => None,
            c => Some(c),
        };
        let id = PdbResidueId {
            chain,
            resno,
            insert_code: icode,
        };
        let x = parse_coord(line, 30..38, line_index)?;
        let y = parse_coord(line, 38..46, line_index)?;
        let z = parse_coord(line, 46..54, line_index)?;
        let point = Point3::new(x, y, z);

        let entry = match atoms.last_mut() {
            Some(last) if last.id == id => last,
            _ => {
                atoms.push(BackboneAtoms {
                    id,
                    amino_acid: AminoAcid::from_three_letter(res_name),
                    n: None,
                    ca: None,
                    c: None,
                });
                atoms.last_mut().unwrap()
            }
        };
        match atom_name {
            "N" => entry.n = Some(point),
            "CA" => entry.ca = Some(point),
            "C" => entry.c = Some(point),
            _ => {}
        }
    }

    let mut residues = Vec::with_capacity(atoms.len());
    for atom in atoms {
        let (Some(n), Some(ca), Some(c)) = (atom.n, atom.ca, atom.c) else {
            log::warn!("residue {} is missing backbone atoms, skipping", atom.id);
            continue;
        };
        residues.push(Residue {
            amino_acid: atom.amino_acid,
            pdb_id: atom.id,
            position: ca,
            frame: backbone_frame(n, ca, c),
            ss_tag: SsTag::Other,
            ss_element: None,
        });
    }
    Ok(residues)
}

/// Build a local orthonormal frame at `ca` from the backbone triple `n`-`ca`-`c` by
/// Gram-Schmidt: the first axis along `c - n`, the second the component of `ca - n` orthogonal
/// to it, the third their cross product.
fn backbone_frame(n: Point3<f64>, ca: Point3<f64>, c: Point3<f64>) -> Matrix3<f64> {
    let axis1 = (c - n).normalize();
    let to_ca = ca - n;
    let axis2_raw = to_ca - axis1 * axis1.dot(&to_ca);
    let axis2 = if axis2_raw.norm() > 1e-9 {
        axis2_raw.normalize()
    } else {
        orthogonal_fallback(axis1)
    };
    let axis3 = axis1.cross(&axis2);
    Matrix3::from_columns(&[axis1, axis2, axis3])
}

fn orthogonal_fallback(axis: Vector3<f64>) -> Vector3<f64> {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (candidate - axis * axis.dot(&candidate)).normalize()
}
