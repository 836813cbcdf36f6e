//! FASTA alignment reader/writer: one record per [`Entry`](crate::alignment::Entry), gaps as `-`,
//! wrapped at 60 characters per the convention the rest of the pack's FASTA writers use.

use crate::alignment::{Alignment, Entry};
use crate::error::Error;
use crate::protein::AminoAcid;
use crate::seq::ResIdx;

const LINE_WIDTH: usize = 60;

/// Render an [`Alignment`] as FASTA, looking up each present position's one-letter amino acid
/// code via `residue_letter(entry_index, position)`.
#[must_use]
pub fn write_fasta(alignment: &Alignment, residue_letter: impl Fn(usize, crate::seq::ResIdx) -> AminoAcid) -> String {
    let mut out = String::new();
    for (entry_index, entry) in alignment.entries().iter().enumerate() {
        out.push('>');
        out.push_str(&entry.name);
        out.push('\n');
        let row: String = entry
            .positions()
            .iter()
            .map(|pos| pos.map_or('-', |idx| residue_letter(entry_index, idx).one_letter()))
            .collect();
        for chunk in row.as_bytes().chunks(LINE_WIDTH) {
            out.push_str(std::str::from_utf8(chunk).expect("ASCII one-letter codes"));
            out.push('\n');
        }
    }
    out
}

/// Parse a FASTA alignment back into an [`Alignment`], the inverse of [`write_fasta`]. Only the
/// present/absent pattern of each entry is recoverable from the text, not the original residue
/// indices: present positions are renumbered from 0 in file order within each entry.
///
/// # Errors
/// Whatever [`Alignment::new`] returns if the records don't share a common length.
pub fn parse_fasta(text: &str) -> Result<Alignment, Error> {
    let mut entries = Vec::new();
    let mut name: Option<String> = None;
    let mut seq = String::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(finished) = name.replace(rest.to_string()) {
                entries.push(entry_from_row(finished, &seq));
                seq.clear();
            }
        } else {
            seq.push_str(line.trim());
        }
    }
    if let Some(finished) = name {
        entries.push(entry_from_row(finished, &seq));
    }
    Alignment::new(entries, None)
}

fn entry_from_row(name: String, row: &str) -> Entry {
    let mut next = 0u32;
    let positions = row
        .chars()
        .map(|c| {
            if c == '-' {
                None
            } else {
                let idx = ResIdx::new(next);
                next += 1;
                Some(idx)
            }
        })
        .collect();
    Entry::new(name, positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Entry;
    use crate::seq::ResIdx;

    #[test]
    fn renders_gaps_and_residues() {
        let alignment = Alignment::new(
            vec![Entry::new("a", vec![Some(ResIdx::new(0)), None, Some(ResIdx::new(1))])],
            None,
        )
        .unwrap();
        let fasta = write_fasta(&alignment, |_, idx| {
            if idx.get() == 0 {
                AminoAcid::Gly
            } else {
                AminoAcid::Ala
            }
        });
        assert_eq!(fasta, ">a\nG-A\n");
    }

    #[test]
    fn wraps_long_rows_at_sixty_columns() {
        let positions: Vec<_> = (0..70).map(|i| Some(ResIdx::new(i))).collect();
        let alignment = Alignment::new(vec![Entry::new("a", positions)], None).unwrap();
        let fasta = write_fasta(&alignment, |_, _| AminoAcid::Ala);
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 10);
    }

    fn present_pattern(alignment: &Alignment) -> Vec<Vec<bool>> {
        alignment
            .entries()
            .iter()
            .map(|e| e.positions().iter().map(Option::is_some).collect())
            .collect()
    }

    #[test]
    fn round_trips_the_present_absent_pattern() {
        let alignment = Alignment::new(
            vec![
                Entry::new("a", vec![Some(ResIdx::new(0)), None, Some(ResIdx::new(1))]),
                Entry::new("b", vec![None, Some(ResIdx::new(5)), Some(ResIdx::new(6))]),
            ],
            None,
        )
        .unwrap();
        let fasta = write_fasta(&alignment, |_, _| AminoAcid::Ala);
        let parsed = parse_fasta(&fasta).unwrap();
        assert_eq!(parsed.entries().len(), 2);
        assert_eq!(parsed.entries()[0].name, "a");
        assert_eq!(parsed.entries()[1].name, "b");
        assert_eq!(present_pattern(&parsed), present_pattern(&alignment));
    }
}
