//! Reader for pairwise SSAP scores files: one comparison per line, nine whitespace-separated
//! fields as written by the SSAP driver's own writer.

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::helper_functions::split_ascii_whitespace;

/// One parsed line of a pairwise scores file.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRecord {
    pub name_a: String,
    pub name_b: String,
    pub length_a: u32,
    pub length_b: u32,
    pub aligned_residues: u32,
    pub overlap_pct: f64,
    pub seq_identity_pct: f64,
    pub ssap_score: f64,
    pub rmsd: f64,
}

fn parse_num<T: std::str::FromStr>(line: &str, line_index: usize, offset: usize, text: &str) -> Result<T, Error> {
    text.parse().map_err(|_| {
        Error::with_context(
            ErrorKind::BadScoreLine,
            CustomError::error(
                "malformed numeric field",
                format!("'{text}' is not a valid number"),
                Context::line(Some(line_index), line, offset, text.len()),
            ),
        )
    })
}

/// Parse every non-blank line of a pairwise scores file.
///
/// # Errors
/// [`ErrorKind::BadScoreLine`] if a line doesn't have exactly nine fields or a numeric field
/// fails to parse.
pub fn parse_scores(text: &str) -> Result<Vec<ScoreRecord>, Error> {
    let mut records = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_ascii_whitespace(line);
        if fields.len() != 9 {
            return Err(Error::with_context(
                ErrorKind::BadScoreLine,
                CustomError::error(
                    "wrong number of fields",
                    format!("expected 9 fields, found {}", fields.len()),
                    Context::full_line(line_index, line),
                ),
            ));
        }
        records.push(ScoreRecord {
            name_a: fields[0].1.to_string(),
            name_b: fields[1].1.to_string(),
            length_a: parse_num(line, line_index, fields[2].0, fields[2].1)?,
            length_b: parse_num(line, line_index, fields[3].0, fields[3].1)?,
            ssap_score: parse_num(line, line_index, fields[4].0, fields[4].1)?,
            aligned_residues: parse_num(line, line_index, fields[5].0, fields[5].1)?,
            overlap_pct: parse_num(line, line_index, fields[6].0, fields[6].1)?,
            seq_identity_pct: parse_num(line, line_index, fields[7].0, fields[7].1)?,
            rmsd: parse_num(line, line_index, fields[8].0, fields[8].1)?,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_line() {
        let records =
            parse_scores("1wzaA02   1zjaA02   120   118   86.25   110   91.5   45.2   1.35\n").unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name_a, "1wzaA02");
        assert_eq!(r.name_b, "1zjaA02");
        assert_eq!(r.ssap_score, 86.25);
        assert_eq!(r.aligned_residues, 110);
        assert_eq!(r.overlap_pct, 91.5);
        assert_eq!(r.seq_identity_pct, 45.2);
        assert_eq!(r.rmsd, 1.35);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_scores("1wzaA02 1zjaA02 86.25\n").is_err());
    }
}
