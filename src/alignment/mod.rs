//! The alignment data model: a rectangular table of entries (columns, one per structure) and
//! positions (rows), plus the `glue` operation that composes two alignments sharing a common
//! entry into one alignment over their union of structures.

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::seq::ResIdx;

/// One column of an [`Alignment`]: the name of the structure it refers to and, for every
/// position (row), either a residue index or a gap.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub name: String,
    positions: Vec<Option<ResIdx>>,
}

impl Entry {
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Option<ResIdx>>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &[Option<ResIdx>] {
        &self.positions
    }
}

/// A multi-entry alignment: `entries.len()` columns by a common row count (`len()`).
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment {
    entries: Vec<Entry>,
    /// Per-entry, per-position score; `None` if this alignment carries no scores. When present,
    /// has the same shape as `entries`, and a score is `Some` exactly where the position is
    /// present.
    scores: Option<Vec<Vec<Option<f64>>>>,
}

impl Alignment {
    /// # Errors
    /// If the entries don't share a common length, or any entry's present positions are not
    /// strictly increasing, or the score table (if given) doesn't match the entries' shape.
    pub fn new(entries: Vec<Entry>, scores: Option<Vec<Vec<Option<f64>>>>) -> Result<Self, Error> {
        let len = entries.first().map_or(0, |e| e.positions.len());
        for entry in &entries {
            if entry.positions.len() != len {
                return Err(Error::with_context(
                    ErrorKind::SegmentOutOfOrder,
                    CustomError::error(
                        "alignment entries have mismatched lengths",
                        format!(
                            "entry '{}' has {} positions, expected {len}",
                            entry.name,
                            entry.positions.len()
                        ),
                        Context::none(),
                    ),
                ));
            }
            let mut last = None;
            for pos in entry.positions.iter().flatten() {
                if let Some(prev) = last {
                    if *pos <= prev {
                        return Err(Error::with_context(
                            ErrorKind::SegmentOutOfOrder,
                            CustomError::error(
                                "alignment entry positions are not strictly increasing",
                                format!("entry '{}' repeats or reverses at residue {pos}", entry.name),
                                Context::none(),
                            ),
                        ));
                    }
                }
                last = Some(*pos);
            }
        }
        if let Some(table) = &scores {
            if table.len() != entries.len() {
                return Err(Error::with_context(
                    ErrorKind::SegmentOutOfOrder,
                    CustomError::error(
                        "score table entry count mismatch",
                        "the score table must have one row per alignment entry",
                        Context::none(),
                    ),
                ));
            }
            for (entry, row) in entries.iter().zip(table) {
                if row.len() != len {
                    return Err(Error::with_context(
                        ErrorKind::SegmentOutOfOrder,
                        CustomError::error(
                            "score table length mismatch",
                            "the score table must match the entries' length",
                            Context::none(),
                        ),
                    ));
                }
                for (pos, score) in entry.positions.iter().zip(row) {
                    if pos.is_some() != score.is_some() {
                        return Err(Error::with_context(
                            ErrorKind::SegmentOutOfOrder,
                            CustomError::error(
                                "score table presence mismatch",
                                format!(
                                    "entry '{}' has a score exactly where a position is present",
                                    entry.name
                                ),
                                Context::none(),
                            ),
                        ));
                    }
                }
            }
        }
        Ok(Self { entries, scores })
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.first().map_or(0, |e| e.positions.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn entry_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// How an output row of a glue was sourced.
    fn classify_step(ra: Option<ResIdx>, rb: Option<ResIdx>) -> RowSource {
        match (ra, rb) {
            (Some(a), Some(b)) if a == b => RowSource::Both,
            (Some(a), Some(b)) => {
                if a < b {
                    RowSource::A
                } else {
                    RowSource::B
                }
            }
            (Some(_), None) => RowSource::A,
            (None, Some(_)) => RowSource::B,
            (None, None) => RowSource::A,
        }
    }

    /// Compose `self`'s entry `ia` with `other`'s entry `ib`, which must refer to the same
    /// structure, into one alignment with `self.entries().len() + other.entries().len() - 1`
    /// entries. The shared entry's present positions in the output are the union, in increasing
    /// order, of its present positions in `self` and in `other`.
    ///
    /// # Errors
    /// If `ia`/`ib` are out of range.
    pub fn glue(&self, ia: usize, other: &Self, ib: usize) -> Result<Self, Error> {
        if ia >= self.entries.len() || ib >= other.entries.len() {
            return Err(Error::with_context(
                ErrorKind::SegmentOutOfOrder,
                CustomError::error(
                    "glue entry index out of range",
                    "the shared entry index must refer to an existing column in both alignments",
                    Context::none(),
                ),
            ));
        }
        let want_scores = self.scores.is_some() && other.scores.is_some();
        let mut out_entries: Vec<Entry> = self
            .entries
            .iter()
            .map(|e| Entry::new(e.name.clone(), Vec::new()))
            .chain(
                other
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != ib)
                    .map(|(_, e)| Entry::new(e.name.clone(), Vec::new())),
            )
            .collect();
        let mut out_scores: Vec<Vec<Option<f64>>> = vec![Vec::new(); out_entries.len()];
        let a_len = self.entries.len();

        let (mut pa, mut pb) = (0usize, 0usize);
        while pa < self.len() || pb < other.len() {
            let ra = (pa < self.len())
                .then(|| self.entries[ia].positions[pa])
                .flatten();
            let rb = (pb < other.len())
                .then(|| other.entries[ib].positions[pb])
                .flatten();
            let source = Self::classify_step(ra, rb);

            let take_a = matches!(source, RowSource::A | RowSource::Both) && pa < self.len();
            let take_b = matches!(source, RowSource::B | RowSource::Both) && pb < other.len();

            for (j, entry) in self.entries.iter().enumerate() {
                let value = if j == ia {
                    // The shared column: whichever side actually advanced carries the value,
                    // so a value from `other` isn't dropped just because `self` sat out.
                    if take_a { ra } else { rb }
                } else if take_a {
                    entry.positions[pa]
                } else {
                    None
                };
                out_entries[j].positions.push(value);
                if want_scores {
                    let score = if j == ia {
                        if take_a {
                            self.scores.as_ref().unwrap()[j][pa]
                        } else {
                            other.scores.as_ref().unwrap()[ib][pb]
                        }
                    } else if take_a {
                        self.scores.as_ref().unwrap()[j][pa]
                    } else {
                        None
                    };
                    out_scores[j].push(score);
                }
            }
            let mut out_j = a_len;
            for (j, entry) in other.entries.iter().enumerate() {
                if j == ib {
                    continue;
                }
                let value = if take_b { entry.positions[pb] } else { None };
                out_entries[out_j].positions.push(value);
                if want_scores {
                    let score = if take_b {
                        other.scores.as_ref().unwrap()[j][pb]
                    } else {
                        None
                    };
                    out_scores[out_j].push(score);
                }
                out_j += 1;
            }

            if take_a {
                pa += 1;
            }
            if take_b {
                pb += 1;
            }
        }

        Self::new(out_entries, want_scores.then_some(out_scores))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum RowSource {
    A,
    B,
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ri(v: u32) -> Option<ResIdx> {
        Some(ResIdx::new(v))
    }

    #[test]
    fn rejects_non_increasing_entries() {
        let entries = vec![Entry::new("x", vec![ri(2), ri(1)])];
        assert!(Alignment::new(entries, None).is_err());
    }

    #[test]
    fn glue_merges_shared_entry_as_union() {
        // A: shared=0,1,2 ; other_a=0,1,-
        let a = Alignment::new(
            vec![
                Entry::new("shared", vec![ri(0), ri(1), ri(2)]),
                Entry::new("a_only", vec![ri(0), ri(1), None]),
            ],
            None,
        )
        .unwrap();
        // B: shared=1,2,3 ; other_b=0,1,2
        let b = Alignment::new(
            vec![
                Entry::new("shared", vec![ri(1), ri(2), ri(3)]),
                Entry::new("b_only", vec![ri(0), ri(1), ri(2)]),
            ],
            None,
        )
        .unwrap();
        let glued = a.glue(0, &b, 0).unwrap();
        assert_eq!(glued.entries().len(), 3);
        let shared = &glued.entries()[glued.entry_index("shared").unwrap()];
        let present: Vec<u32> = shared.positions().iter().flatten().map(|r| r.get()).collect();
        assert_eq!(present, vec![0, 1, 2, 3]);
    }

    #[test]
    fn glue_rejects_out_of_range_entry() {
        let a = Alignment::new(vec![Entry::new("shared", vec![ri(0)])], None).unwrap();
        let b = Alignment::new(vec![Entry::new("shared", vec![ri(0)])], None).unwrap();
        assert!(a.glue(5, &b, 0).is_err());
    }
}
