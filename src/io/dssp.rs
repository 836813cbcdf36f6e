//! DSSP secondary-structure reader: maps each residue onto the coarse [`SsTag`] used by SSAP's
//! property pre-filter. Only the fixed-width columns SSAP actually consults are read.

use std::collections::HashMap;

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::protein::{PdbResidueId, SsTag};

const HEADER_MARKER: &str = "  #  RESIDUE";

/// Parse a DSSP file's per-residue secondary-structure column into a lookup by [`PdbResidueId`].
///
/// # Errors
/// [`ErrorKind::MalformedDssp`] if a data line's residue number can't be parsed.
pub fn parse_dssp(text: &str) -> Result<HashMap<PdbResidueId, SsTag>, Error> {
    let mut tags = HashMap::new();
    let mut in_body = false;
    for (line_index, line) in text.lines().enumerate() {
        if !in_body {
            if line.starts_with(HEADER_MARKER) {
                in_body = true;
            }
            continue;
        }
        if line.len() < 17 {
            continue;
        }
        let chain = line.as_bytes()[11] as char;
        if chain == '!' || chain == ' ' {
            continue; // chain break marker
        }
        let resno_text = line.get(5..10).unwrap_or("").trim();
        let resno: i32 = resno_text.parse().map_err(|_| {
            Error::with_context(
                ErrorKind::MalformedDssp,
                CustomError::error(
                    "malformed residue number",
                    format!("'{resno_text}' is not a valid residue number"),
                    Context::full_line(line_index, line),
                ),
            )
        })?;
        let icode = match line.as_bytes().get(10).copied().unwrap_or(b' ') as char {
            ' ' => None,
            c => Some(c),
        };
        let ss_code = line.as_bytes().get(16).copied().unwrap_or(b' ') as char;
        tags.insert(
            PdbResidueId {
                chain,
                resno,
                insert_code: icode,
            },
            SsTag::from_dssp_code(ss_code),
        );
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_line(resno: i32, chain: char, ss: char) -> String {
        let mut line = vec![b' '; 20];
        for (i, b) in format!("{resno:>5}").bytes().enumerate() {
            line[5 + i] = b;
        }
        line[11] = chain as u8;
        line[13] = b'A';
        line[16] = ss as u8;
        String::from_utf8(line).unwrap()
    }

    #[test]
    fn parses_helix_and_strand_tags() {
        let text = format!(
            "{HEADER_MARKER} AA STRUCTURE BP1 BP2  ACC\n{}\n{}\n{}\n",
            data_line(1, 'A', 'H'),
            data_line(2, 'A', 'E'),
            data_line(3, 'A', 'T'),
        );
        let tags = parse_dssp(&text).unwrap();
        let id = |resno| PdbResidueId {
            chain: 'A',
            resno,
            insert_code: None,
        };
        assert_eq!(tags[&id(1)], SsTag::Helix);
        assert_eq!(tags[&id(2)], SsTag::Strand);
        assert_eq!(tags[&id(3)], SsTag::Other);
    }
}
