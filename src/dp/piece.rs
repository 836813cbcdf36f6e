use serde::{Deserialize, Serialize};

/// The kind of step taken at one position of a DP traceback.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum StepKind {
    /// Advance in both sequences (a match or mismatch).
    Diagonal,
    /// Advance only in sequence A; a gap is placed in B's rendering.
    GapInB,
    /// Advance only in sequence B; a gap is placed in A's rendering.
    GapInA,
}

/// A single step of a DP path: the running total score, the local contribution of this step,
/// and the kind of step taken.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub score: f64,
    pub local_score: f64,
    pub kind: StepKind,
}

impl Piece {
    #[must_use]
    pub const fn new(score: f64, local_score: f64, kind: StepKind) -> Self {
        Self {
            score,
            local_score,
            kind,
        }
    }
}
