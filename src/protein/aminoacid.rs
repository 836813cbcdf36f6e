use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the 20 standard amino acids, or `Unknown` for anything else (non-standard residues,
/// waters misparsed as `ATOM` records, and the like).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    /// Anything not one of the 20 standard residues.
    Unknown,
}

impl AminoAcid {
    /// The number of variants, including `Unknown`. Used to size lookup tables.
    pub const TOTAL_NUMBER: usize = 21;

    /// Look up by three-letter PDB residue name, case-insensitively. Falls back to `Unknown`.
    #[must_use]
    pub fn from_three_letter(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "ALA" => Self::Ala,
            "ARG" => Self::Arg,
            "ASN" => Self::Asn,
            "ASP" => Self::Asp,
            "CYS" => Self::Cys,
            "GLN" => Self::Gln,
            "GLU" => Self::Glu,
            "GLY" => Self::Gly,
            "HIS" => Self::His,
            "ILE" => Self::Ile,
            "LEU" => Self::Leu,
            "LYS" => Self::Lys,
            "MET" => Self::Met,
            "PHE" => Self::Phe,
            "PRO" => Self::Pro,
            "SER" => Self::Ser,
            "THR" => Self::Thr,
            "TRP" => Self::Trp,
            "TYR" => Self::Tyr,
            "VAL" => Self::Val,
            _ => Self::Unknown,
        }
    }

    /// The one-letter code, `X` for `Unknown`.
    #[must_use]
    pub const fn one_letter(self) -> char {
        match self {
            Self::Ala => 'A',
            Self::Arg => 'R',
            Self::Asn => 'N',
            Self::Asp => 'D',
            Self::Cys => 'C',
            Self::Gln => 'Q',
            Self::Glu => 'E',
            Self::Gly => 'G',
            Self::His => 'H',
            Self::Ile => 'I',
            Self::Leu => 'L',
            Self::Lys => 'K',
            Self::Met => 'M',
            Self::Phe => 'F',
            Self::Pro => 'P',
            Self::Ser => 'S',
            Self::Thr => 'T',
            Self::Trp => 'W',
            Self::Tyr => 'Y',
            Self::Val => 'V',
            Self::Unknown => 'X',
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_residue_names_fall_back() {
        assert_eq!(AminoAcid::from_three_letter("MSE"), AminoAcid::Unknown);
        assert_eq!(AminoAcid::from_three_letter("gly"), AminoAcid::Gly);
    }
}
