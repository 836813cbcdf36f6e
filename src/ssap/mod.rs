//! The SSAP driver: double dynamic programming over two proteins' view-frame caches, in an
//! optional cheap secondary-structure-element pass followed by the full residue-level pass it
//! seeds with a context bonus.
//!
//! For every candidate residue pair `(i, j)` the *inner* DP aligns `i`'s view vectors to every
//! other residue of its protein against `j`'s view vectors to every other residue of its own;
//! the inner alignment's score becomes one cell of the *outer* DP, which aligns the two
//! proteins' residue sequences. This is doubly quadratic in protein length, hence the optional
//! fast pass: run the same double DP restricted to secondary-structure-element residues first,
//! then reward the full pass's residue pairs that agree with it.

use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::{Point3, Vector3};

use crate::alignment::{Alignment, Entry};
use crate::config::SsapConfig;
use crate::dp::{align, GapPenalty};
use crate::error::{Error, ErrorKind};
use crate::protein::Protein;
use crate::score::{properties_compatible, residue_pair_score, PairScoring};
use crate::seq::ResIdx;
use crate::superpose::{kabsch, rmsd as point_rmsd};
use crate::view::ViewFrameCache;

/// A protein shorter than this never produces a meaningful comparison; SSAP returns the
/// zero-score sentinel instead of attempting the double DP.
const MIN_COMPARABLE_RESIDUES: usize = 3;

/// The bonus added to a full-pass residue pair's score when the fast secondary-structure pass
/// already placed them in correspondence above `min_lower_mat_res_score`.
const CONTEXT_SEC_BONUS: f64 = 10.0;

/// The outcome of comparing two proteins.
#[derive(Clone, Debug)]
pub struct SsapResult {
    pub raw_score: f64,
    /// `raw_score` rescaled against the best score the aligned length could possibly have
    /// earned, clamped to `[0, 100]`.
    pub normalized_score: f64,
    pub alignment: Alignment,
    pub overlap_pct: f64,
    pub seq_identity_pct: f64,
    /// `None` if fewer than 3 pairs aligned (too few points to superpose meaningfully).
    pub rmsd: Option<f64>,
}

fn zero_sentinel(name_a: &str, name_b: &str) -> SsapResult {
    SsapResult {
        raw_score: 0.0,
        normalized_score: 0.0,
        alignment: Alignment::new(vec![Entry::new(name_a, vec![]), Entry::new(name_b, vec![])], None)
            .expect("two empty entries always form a valid alignment"),
        overlap_pct: 0.0,
        seq_identity_pct: 0.0,
        rmsd: None,
    }
}

/// Align `i`'s and `j`'s view vectors against every other residue of their own protein, scoring
/// the correspondence of `(i, j)` for the outer DP.
fn inner_cell_score(
    view_a: &ViewFrameCache,
    view_b: &ViewFrameCache,
    len_a: usize,
    len_b: usize,
    i: usize,
    j: usize,
    scoring: PairScoring,
    gaps: GapPenalty,
) -> f64 {
    align(
        len_a,
        len_b,
        gaps,
        |p, q| {
            if p == i || q == j {
                residue_pair_score(p == i, q == j, Vector3::zeros(), Vector3::zeros(), scoring)
            } else {
                let va = view_a.get(ResIdx::new(i as u32), ResIdx::new(p as u32));
                let vb = view_b.get(ResIdx::new(j as u32), ResIdx::new(q as u32));
                residue_pair_score(false, false, va, vb, scoring)
            }
        },
        || false,
    )
    .expect("inner DP never cancels")
    .score
}

/// Whether `(i, j)`'s secondary-structure elements (if either residue has one) are compatible
/// enough to be worth comparing at all; residues outside any element always pass.
fn property_gate<'a>(
    protein_a: &'a Protein,
    protein_b: &'a Protein,
    scoring: PairScoring,
) -> impl Fn(usize, usize) -> bool + 'a {
    move |i, j| {
        let res_a = protein_a.residue(ResIdx::new(i as u32));
        let res_b = protein_b.residue(ResIdx::new(j as u32));
        match (res_a.ss_element, res_b.ss_element) {
            (Some(ea), Some(eb)) => {
                properties_compatible(&protein_a.sec_strucs()[ea], &protein_b.sec_strucs()[eb], scoring)
            }
            _ => true,
        }
    }
}

/// Run the outer DP over `indices_a x indices_b` (full-protein residue indices, possibly a
/// restricted subset for the fast pass). A cell that fails `property_compatible` or whose inner
/// DP result falls below `min_lower_mat_res_score` never reaches the upper score matrix; only
/// cells that clear both gates are scored (plus `bonus`). Checks `cancelled` at the top of every
/// row, returning `None` the first time it observes cancellation.
#[allow(clippy::too_many_arguments)]
fn outer_dp(
    view_a: &ViewFrameCache,
    view_b: &ViewFrameCache,
    len_a: usize,
    len_b: usize,
    indices_a: &[usize],
    indices_b: &[usize],
    scoring: PairScoring,
    gaps: GapPenalty,
    min_lower_mat_res_score: f64,
    property_compatible: impl Fn(usize, usize) -> bool,
    bonus: impl Fn(usize, usize) -> f64,
    cancelled: &AtomicBool,
) -> Option<crate::dp::DpResult> {
    align(
        indices_a.len(),
        indices_b.len(),
        gaps,
        |p, q| {
            let (i, j) = (indices_a[p], indices_b[q]);
            if !property_compatible(i, j) {
                return 0.0;
            }
            let inner = inner_cell_score(view_a, view_b, len_a, len_b, i, j, scoring, gaps);
            if inner < min_lower_mat_res_score {
                return 0.0;
            }
            inner + bonus(i, j)
        },
        || cancelled.load(Ordering::Relaxed),
    )
}

/// Run the cheap secondary-structure-element pass: the outer DP restricted to residues
/// belonging to a secondary structure element, with the property pre-filter substituted for the
/// raw view-vector score wherever the two residues' elements are incompatible.
fn fast_ss_pass(
    protein_a: &Protein,
    protein_b: &Protein,
    view_a: &ViewFrameCache,
    view_b: &ViewFrameCache,
    scoring: PairScoring,
    gaps: GapPenalty,
    min_lower_mat_res_score: f64,
) -> Option<std::collections::HashSet<(usize, usize)>> {
    let ss_a: Vec<usize> = (0..protein_a.len())
        .filter(|&i| protein_a.residue(ResIdx::new(i as u32)).ss_element.is_some())
        .collect();
    let ss_b: Vec<usize> = (0..protein_b.len())
        .filter(|&j| protein_b.residue(ResIdx::new(j as u32)).ss_element.is_some())
        .collect();
    if ss_a.is_empty() || ss_b.is_empty() {
        return None;
    }

    let result = align(
        ss_a.len(),
        ss_b.len(),
        gaps,
        |p, q| {
            let (i, j) = (ss_a[p], ss_b[q]);
            let res_a = protein_a.residue(ResIdx::new(i as u32));
            let res_b = protein_b.residue(ResIdx::new(j as u32));
            let (Some(elem_a), Some(elem_b)) = (res_a.ss_element, res_b.ss_element) else {
                return 0.0;
            };
            if !properties_compatible(
                &protein_a.sec_strucs()[elem_a],
                &protein_b.sec_strucs()[elem_b],
                scoring,
            ) {
                return 0.0;
            }
            inner_cell_score(view_a, view_b, protein_a.len(), protein_b.len(), i, j, scoring, gaps)
        },
        || false,
    )
    .expect("fast pass never cancels");

    let mut pairs = std::collections::HashSet::new();
    let (mut p, mut q) = (0usize, 0usize);
    for piece in &result.path {
        match piece.kind {
            crate::dp::StepKind::Diagonal => {
                if piece.local_score >= min_lower_mat_res_score {
                    pairs.insert((ss_a[p], ss_b[q]));
                }
                p += 1;
                q += 1;
            }
            crate::dp::StepKind::GapInB => p += 1,
            crate::dp::StepKind::GapInA => q += 1,
        }
    }
    Some(pairs)
}

/// Compare two proteins with SSAP's double dynamic programming, yielding a pairwise alignment
/// and its derived metrics. `cancelled` is polled at the top of every outer-DP row; the caller
/// may set it from another thread to abandon a long-running comparison.
///
/// # Errors
/// [`ErrorKind::Cancelled`] if `cancelled` is observed set before the outer DP completes.
/// Otherwise never errors: proteins too short to compare meaningfully yield the zero-score
/// sentinel rather than an [`Error`].
pub fn compare(
    protein_a: &Protein,
    protein_b: &Protein,
    cfg: &SsapConfig,
    cancelled: &AtomicBool,
) -> Result<SsapResult, Error> {
    if protein_a.len() < MIN_COMPARABLE_RESIDUES || protein_b.len() < MIN_COMPARABLE_RESIDUES {
        return Ok(zero_sentinel(&protein_a.name, &protein_b.name));
    }

    let view_a = ViewFrameCache::build(protein_a);
    let view_b = ViewFrameCache::build(protein_b);
    let scoring = PairScoring::default();
    let gaps = GapPenalty {
        gap_open: cfg.gap_penalty,
        gap_extend: cfg.gap_extend_penalty,
    };

    let context_pairs = if cfg.use_fast_ss_pass {
        fast_ss_pass(
            protein_a,
            protein_b,
            &view_a,
            &view_b,
            scoring,
            gaps,
            cfg.min_lower_mat_res_score,
        )
    } else {
        None
    };

    let all_a: Vec<usize> = (0..protein_a.len()).collect();
    let all_b: Vec<usize> = (0..protein_b.len()).collect();
    let bonus = |i: usize, j: usize| -> f64 {
        match &context_pairs {
            Some(pairs) if pairs.contains(&(i, j)) => CONTEXT_SEC_BONUS,
            _ => 0.0,
        }
    };

    let result = outer_dp(
        &view_a,
        &view_b,
        protein_a.len(),
        protein_b.len(),
        &all_a,
        &all_b,
        scoring,
        gaps,
        cfg.min_lower_mat_res_score,
        property_gate(protein_a, protein_b, scoring),
        bonus,
        cancelled,
    )
    .ok_or_else(|| {
        Error::new(
            ErrorKind::Cancelled,
            "ssap comparison cancelled",
            format!("comparison of '{}' and '{}' was cancelled", protein_a.name, protein_b.name),
        )
    })?;

    let mut entry_a = Vec::new();
    let mut entry_b = Vec::new();
    let mut matched_pairs = Vec::new();
    let mut identical = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    for piece in &result.path {
        match piece.kind {
            crate::dp::StepKind::Diagonal => {
                entry_a.push(Some(ResIdx::new(i as u32)));
                entry_b.push(Some(ResIdx::new(j as u32)));
                matched_pairs.push((i, j));
                if protein_a.residue(ResIdx::new(i as u32)).amino_acid
                    == protein_b.residue(ResIdx::new(j as u32)).amino_acid
                {
                    identical += 1;
                }
                i += 1;
                j += 1;
            }
            crate::dp::StepKind::GapInB => {
                entry_a.push(Some(ResIdx::new(i as u32)));
                entry_b.push(None);
                i += 1;
            }
            crate::dp::StepKind::GapInA => {
                entry_a.push(None);
                entry_b.push(Some(ResIdx::new(j as u32)));
                j += 1;
            }
        }
    }

    let alignment = Alignment::new(
        vec![
            Entry::new(protein_a.name.clone(), entry_a),
            Entry::new(protein_b.name.clone(), entry_b),
        ],
        None,
    )?;

    let matched = matched_pairs.len();
    let shorter = protein_a.len().min(protein_b.len()) as f64;
    let overlap_pct = if shorter > 0.0 {
        100.0 * matched as f64 / shorter
    } else {
        0.0
    };
    let seq_identity_pct = if matched > 0 {
        100.0 * identical as f64 / matched as f64
    } else {
        0.0
    };
    // The best score a matched pair's inner DP could possibly earn is every other residue of the
    // shorter protein scoring `max_score`; normalize the raw score against that ceiling scaled by
    // how many pairs actually matched, so both sides grow at the same order in protein length.
    let max_inner_per_pair = (shorter - 1.0).max(1.0) * scoring.max_score;
    let max_possible_score = matched as f64 * max_inner_per_pair;
    let normalized_score = if max_possible_score > 0.0 {
        (100.0 * result.score.max(0.0) / max_possible_score).min(100.0)
    } else {
        0.0
    };

    let rmsd = if matched_pairs.len() >= 3 {
        let positions_a: Vec<Point3<f64>> = matched_pairs
            .iter()
            .map(|&(i, _)| protein_a.residue(ResIdx::new(i as u32)).position)
            .collect();
        let positions_b: Vec<Point3<f64>> = matched_pairs
            .iter()
            .map(|&(_, j)| protein_b.residue(ResIdx::new(j as u32)).position)
            .collect();
        match kabsch(&positions_a, &positions_b, cfg.rotation_tidy_tolerance) {
            Ok(transform) => {
                let moved: Vec<Point3<f64>> = positions_a.iter().map(|p| transform.apply(*p)).collect();
                Some(point_rmsd(&moved, &positions_b))
            }
            Err(_) => None,
        }
    } else {
        None
    };

    Ok(SsapResult {
        raw_score: result.score,
        normalized_score,
        alignment,
        overlap_pct,
        seq_identity_pct,
        rmsd,
    })
}

/// Compare every protein in `proteins` against every other, in parallel, returning the upper
/// triangle of the all-vs-all score matrix as `(i, j, result)` with `i < j`.
///
/// Each comparison is independent and CPU-bound, so this is the one place a large batch of SSAP
/// runs benefits from splitting across threads rather than running the pairs one at a time.
///
/// # Errors
/// Propagates the first [`Error`] encountered building any pair's alignment, including
/// [`ErrorKind::Cancelled`] if `cancelled` is set partway through the batch.
#[cfg(feature = "rayon")]
pub fn par_compare_all(
    proteins: &[Protein],
    cfg: &SsapConfig,
    cancelled: &AtomicBool,
) -> Result<Vec<(usize, usize, SsapResult)>, Error> {
    use rayon::prelude::*;

    let pairs: Vec<(usize, usize)> = (0..proteins.len())
        .flat_map(|i| (i + 1..proteins.len()).map(move |j| (i, j)))
        .collect();

    pairs
        .into_par_iter()
        .map(|(i, j)| compare(&proteins[i], &proteins[j], cfg, cancelled).map(|result| (i, j, result)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protein::{AminoAcid, PdbResidueId, Residue, SsTag};
    use nalgebra::Matrix3;

    fn residue(resno: i32, x: f64, y: f64, z: f64) -> Residue {
        Residue {
            amino_acid: AminoAcid::Ala,
            pdb_id: PdbResidueId {
                chain: 'A',
                resno,
                insert_code: None,
            },
            position: Point3::new(x, y, z),
            frame: Matrix3::identity(),
            ss_tag: SsTag::Other,
            ss_element: None,
        }
    }

    fn helix_like(n: usize) -> Protein {
        let residues = (0..n)
            .map(|i| residue(i as i32, i as f64 * 1.5, (i as f64 * 1.3).sin(), (i as f64 * 1.3).cos()))
            .collect();
        Protein::new("test".into(), residues, vec![])
    }

    #[test]
    fn identical_proteins_align_fully_with_zero_rmsd() {
        let protein = helix_like(6);
        let cfg = SsapConfig {
            use_fast_ss_pass: false,
            ..SsapConfig::default()
        };
        let result = compare(&protein, &protein, &cfg, &AtomicBool::new(false)).unwrap();
        assert_eq!(result.alignment.len(), 6);
        assert!((result.overlap_pct - 100.0).abs() < 1e-6);
        assert!(result.rmsd.unwrap() < 1e-6);
    }

    #[test]
    fn identical_proteins_score_near_the_normalized_ceiling() {
        // A 25-residue self-comparison should land just shy of the normalized-score ceiling,
        // never past it.
        let protein = helix_like(25);
        let cfg = SsapConfig {
            use_fast_ss_pass: false,
            ..SsapConfig::default()
        };
        let result = compare(&protein, &protein, &cfg, &AtomicBool::new(false)).unwrap();
        assert!(result.normalized_score >= 99.0, "{}", result.normalized_score);
        assert!(result.normalized_score <= 100.0, "{}", result.normalized_score);
    }

    #[test]
    fn too_short_proteins_yield_zero_sentinel() {
        let tiny = helix_like(1);
        let cfg = SsapConfig::default();
        let result = compare(&tiny, &tiny, &cfg, &AtomicBool::new(false)).unwrap();
        assert_eq!(result.raw_score, 0.0);
        assert_eq!(result.normalized_score, 0.0);
        assert!(result.rmsd.is_none());
    }

    #[test]
    fn cancellation_is_observed_before_completion() {
        let protein = helix_like(6);
        let cfg = SsapConfig::default();
        let err = compare(&protein, &protein, &cfg, &AtomicBool::new(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    #[cfg(feature = "rayon")]
    fn par_compare_all_covers_the_upper_triangle() {
        let proteins = vec![helix_like(6), helix_like(6), helix_like(1)];
        let cfg = SsapConfig {
            use_fast_ss_pass: false,
            ..SsapConfig::default()
        };
        let results = par_compare_all(&proteins, &cfg, &AtomicBool::new(false)).unwrap();
        let pairs: std::collections::HashSet<(usize, usize)> =
            results.iter().map(|&(i, j, _)| (i, j)).collect();
        assert_eq!(pairs, [(0, 1), (0, 2), (1, 2)].into_iter().collect());
    }
}
