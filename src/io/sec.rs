//! Reader for SEC files: one secondary-structure element per line, as
//! `chain start_resno stop_resno kind phi psi omega`, `kind` one of `H`/`E`/`O`.

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::helper_functions::split_ascii_whitespace;
use crate::protein::SsTag;
use crate::seq::{ResIdx, SeqSeg};

/// One parsed SEC line paired with the PDB-numbered residue range it covers (resolved into
/// sequence indices by the caller, which knows the residue order).
pub struct SecRecord {
    pub chain: char,
    pub start_resno: i32,
    pub stop_resno: i32,
    pub kind: SsTag,
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
}

fn malformed(line_index: usize, line: &str, offset: usize, text: &str) -> Error {
    Error::with_context(
        ErrorKind::MalformedSec,
        CustomError::error(
            "malformed SEC record",
            format!("'{text}' is not a valid field"),
            Context::line(Some(line_index), line, offset, text.len()),
        ),
    )
}

/// Parse a SEC file into one [`SecRecord`] per non-blank line.
///
/// # Errors
/// [`ErrorKind::MalformedSec`] if a line doesn't have exactly seven whitespace-separated fields
/// or a numeric field fails to parse.
pub fn parse_sec(text: &str) -> Result<Vec<SecRecord>, Error> {
    let mut records = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_ascii_whitespace(line);
        if fields.len() != 7 {
            return Err(Error::with_context(
                ErrorKind::MalformedSec,
                CustomError::error(
                    "wrong number of fields",
                    format!("expected 7 fields, found {}", fields.len()),
                    Context::full_line(line_index, line),
                ),
            ));
        }
        let (chain_off, chain_text) = fields[0];
        let chain = chain_text
            .chars()
            .next()
            .ok_or_else(|| malformed(line_index, line, chain_off, chain_text))?;
        let (start_off, start_text) = fields[1];
        let start_resno: i32 = start_text
            .parse()
            .map_err(|_| malformed(line_index, line, start_off, start_text))?;
        let (stop_off, stop_text) = fields[2];
        let stop_resno: i32 = stop_text
            .parse()
            .map_err(|_| malformed(line_index, line, stop_off, stop_text))?;
        let (kind_off, kind_text) = fields[3];
        let kind = match kind_text {
            "H" => SsTag::Helix,
            "E" => SsTag::Strand,
            "O" => SsTag::Other,
            _ => return Err(malformed(line_index, line, kind_off, kind_text)),
        };
        let (phi_off, phi_text) = fields[4];
        let phi: f64 = phi_text
            .parse()
            .map_err(|_| malformed(line_index, line, phi_off, phi_text))?;
        let (psi_off, psi_text) = fields[5];
        let psi: f64 = psi_text
            .parse()
            .map_err(|_| malformed(line_index, line, psi_off, psi_text))?;
        let (omega_off, omega_text) = fields[6];
        let omega: f64 = omega_text
            .parse()
            .map_err(|_| malformed(line_index, line, omega_off, omega_text))?;
        records.push(SecRecord {
            chain,
            start_resno,
            stop_resno,
            kind,
            phi,
            psi,
            omega,
        });
    }
    Ok(records)
}

/// Turn parsed [`SecRecord`]s into [`crate::protein::SecStruc`]s positioned by sequence index,
/// using `resolve` to map a record's `(chain, resno)` pair onto a [`ResIdx`].
///
/// # Errors
/// [`ErrorKind::MalformedSec`] if a record's boundaries don't resolve to sequence indices.
pub fn into_sec_strucs(
    records: &[SecRecord],
    resolve: impl Fn(char, i32) -> Option<ResIdx>,
) -> Result<Vec<crate::protein::SecStruc>, Error> {
    records
        .iter()
        .map(|record| {
            let start = resolve(record.chain, record.start_resno).ok_or_else(|| {
                Error::new(
                    ErrorKind::MalformedSec,
                    "unresolvable SEC boundary",
                    format!("no residue {}:{}", record.chain, record.start_resno),
                )
            })?;
            let stop = resolve(record.chain, record.stop_resno).ok_or_else(|| {
                Error::new(
                    ErrorKind::MalformedSec,
                    "unresolvable SEC boundary",
                    format!("no residue {}:{}", record.chain, record.stop_resno),
                )
            })?;
            let seg = SeqSeg::new(start, stop).map_err(|e| {
                Error::new(ErrorKind::MalformedSec, "invalid SEC segment", e.to_string())
            })?;
            Ok(crate::protein::SecStruc {
                kind: record.kind,
                seg,
                phi: record.phi,
                psi: record.psi,
                omega: record.omega,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_helix_record() {
        let records = parse_sec("A 1 10 H -60.0 -45.0 180.0\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, SsTag::Helix);
        assert_eq!(records[0].start_resno, 1);
        assert_eq!(records[0].stop_resno, 10);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(parse_sec("A 1 10 Z 0 0 0\n").is_err());
    }
}
