//! The hit resolver: given many scored, possibly overlapping, multi-segment domain predictions
//! on one sequence, select the non-overlapping subset of maximum total score under a
//! configurable overlap policy. This is a scored-interval scheduling sweep over "event arrows"
//! (every trimmed segment boundary), tracking the best achievable score up to each boundary.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{Context, CustomError, Error, ErrorKind};
pub use crate::seq::TrimSpec;
use crate::seq::{ResIdx, SeqArrow, SeqSeg, SeqSegRun};

/// The scale a [`FullHit`]'s score was reported in. All are converted to the resolver's common
/// higher-is-better `resscr_t` space before scheduling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ScoreType {
    /// The resolver's own native score, already higher-is-better.
    CrhValue,
    /// A sequence-search E-value: lower is better, never negative, never zero.
    Evalue,
    /// A bit score: higher is better.
    BitScore,
}

/// A caller-supplied domain prediction: one or more segments of the target sequence, a score and
/// an opaque label.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FullHit {
    pub segs: SeqSegRun,
    pub label: String,
    pub score: f64,
    pub score_type: ScoreType,
}

impl FullHit {
    #[must_use]
    pub const fn new(segs: SeqSegRun, label: String, score: f64, score_type: ScoreType) -> Self {
        Self {
            segs,
            label,
            score,
            score_type,
        }
    }
}

/// `resscr_t`: the finite 32-bit, higher-is-better score space the sweep operates in.
pub type ResScrT = f32;

/// Convert a reported score into the common `resscr_t` space.
///
/// # Errors
/// [`ErrorKind::InvalidScore`] if the score is non-finite, or an `Evalue` is not strictly
/// positive (E-values of zero or below are not representable on a log scale).
pub fn to_resscr(score: f64, score_type: ScoreType) -> Result<ResScrT, Error> {
    if !score.is_finite() {
        return Err(Error::with_context(
            ErrorKind::InvalidScore,
            CustomError::error(
                "non-finite hit score",
                format!("score {score} is not finite"),
                Context::none(),
            ),
        ));
    }
    match score_type {
        ScoreType::CrhValue | ScoreType::BitScore => Ok(score as ResScrT),
        ScoreType::Evalue => {
            if score <= 0.0 {
                return Err(Error::with_context(
                    ErrorKind::InvalidScore,
                    CustomError::error(
                        "invalid E-value",
                        format!("E-value {score} must be strictly positive"),
                        Context::none(),
                    ),
                ));
            }
            Ok((-score.log10()) as ResScrT)
        }
    }
}

/// The resolver's compact, trimmed working representation of one [`FullHit`].
#[derive(Clone, Debug)]
pub struct CalcHit {
    segs: Vec<SeqSeg>,
    score: ResScrT,
    /// Index back into the owning `&[FullHit]` slice.
    source: usize,
}

impl CalcHit {
    #[must_use]
    pub fn segs(&self) -> &[SeqSeg] {
        &self.segs
    }

    #[must_use]
    pub const fn score(&self) -> ResScrT {
        self.score
    }

    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    fn start_arrow(&self) -> SeqArrow {
        self.segs[0].start_arrow()
    }

    fn stop_arrow(&self) -> SeqArrow {
        self.segs[self.segs.len() - 1].stop_arrow()
    }
}

/// The symmetric trim + overlap policy applied before scheduling.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub trim_spec: TrimSpec,
    /// Hits scoring (in `resscr_t` space) below this threshold are discarded before scheduling.
    pub score_threshold: f64,
    /// Reserved for future use: segments of the same hit separated by a gap at least this long
    /// are eligible to be treated as independent regions. Currently informational only; the
    /// resolver still schedules each hit as one indivisible unit.
    pub min_gap_length: Option<u32>,
    /// If set, a hit that is fully spanned by another hit's segments is not considered to
    /// conflict with it (only its non-contained residues would, which reduces to no conflict
    /// since it is fully contained).
    pub permit_full_overlap: bool,
    /// Whether `io::write_resolver_tsv` should report trimmed (`CalcHit`) or original
    /// (`FullHit`) segment boundaries; not consulted by [`resolve`] itself.
    pub output_trimmed_boundaries: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            trim_spec: TrimSpec::none(),
            score_threshold: 0.0,
            min_gap_length: None,
            permit_full_overlap: false,
            output_trimmed_boundaries: false,
        }
    }
}

fn fully_contained(inner: &[SeqSeg], outer: &[SeqSeg]) -> bool {
    inner.iter().all(|i| {
        outer
            .iter()
            .any(|o| o.start_arrow() <= i.start_arrow() && i.stop_arrow() <= o.stop_arrow())
    })
}

fn conflicts(a: &CalcHit, b: &CalcHit, cfg: &ResolverConfig) -> bool {
    let raw_overlap = a.segs.iter().any(|sa| b.segs.iter().any(|sb| sa.overlaps(*sb)));
    if !raw_overlap {
        return false;
    }
    if cfg.permit_full_overlap
        && (fully_contained(&a.segs, &b.segs) || fully_contained(&b.segs, &a.segs))
    {
        return false;
    }
    true
}

/// Build the resolver's working set from caller hits: trim under `cfg.trim_spec`, drop hits
/// fully trimmed away or below `cfg.score_threshold`.
///
/// # Errors
/// [`ErrorKind::InvalidScore`] if any surviving hit's score cannot be converted (see
/// [`to_resscr`]).
pub fn prepare(hits: &[FullHit], cfg: &ResolverConfig) -> Result<Vec<CalcHit>, Error> {
    let mut calc_hits = Vec::new();
    for (source, hit) in hits.iter().enumerate() {
        let score = to_resscr(hit.score, hit.score_type)?;
        if f64::from(score) < cfg.score_threshold {
            continue;
        }
        let Some(segs) = hit.segs.trim_all(cfg.trim_spec) else {
            continue;
        };
        calc_hits.push(CalcHit {
            segs,
            score,
            source,
        });
    }
    Ok(calc_hits)
}

/// A resolved, non-overlapping selection of hits (by index into the `&[CalcHit]` passed to
/// [`resolve`]) and their summed score.
#[derive(Clone, Debug)]
pub struct ScoredArchive {
    hits: Vec<usize>,
    total_score: ResScrT,
}

impl ScoredArchive {
    #[must_use]
    pub fn hits(&self) -> &[usize] {
        &self.hits
    }

    #[must_use]
    pub const fn total_score(&self) -> ResScrT {
        self.total_score
    }
}

impl fmt::Display for ScoredArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hits, score {}", self.hits.len(), self.total_score)
    }
}

/// Run the sweep over prepared hits, selecting the non-overlapping (under `cfg`'s overlap
/// policy) subset of maximum total score. Ties are broken deterministically: among equally
/// scoring choices at any step, the archive arising from the earlier-sorted hit is kept.
///
/// `cancelled` is checked once, at the start of processing this sequence's hits.
///
/// # Errors
/// [`ErrorKind::Cancelled`] if `cancelled` is observed set.
pub fn resolve(calc_hits: &[CalcHit], cfg: &ResolverConfig, cancelled: &AtomicBool) -> Result<ScoredArchive, Error> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(Error::new(
            ErrorKind::Cancelled,
            "resolver run cancelled",
            "cancellation observed before processing this sequence's hits",
        ));
    }
    if calc_hits.is_empty() {
        return Ok(ScoredArchive {
            hits: Vec::new(),
            total_score: 0.0,
        });
    }

    let mut order: Vec<usize> = (0..calc_hits.len()).collect();
    order.sort_by(|&i, &j| {
        let (a, b) = (&calc_hits[i], &calc_hits[j]);
        a.stop_arrow()
            .cmp(&b.stop_arrow())
            .then_with(|| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)))
            .then_with(|| a.segs.cmp(&b.segs))
    });

    let mut arrows: Vec<SeqArrow> = calc_hits
        .iter()
        .flat_map(|h| [h.start_arrow(), h.stop_arrow()])
        .collect();
    arrows.sort_unstable();
    arrows.dedup();

    // best[k] = best (score, archive) achievable using only hits whose trimmed stop arrow is
    // <= arrows[k].
    let mut best_score: Vec<ResScrT> = vec![0.0; arrows.len()];
    let mut best_archive: Vec<Vec<usize>> = vec![Vec::new(); arrows.len()];

    let arrow_floor = |target: SeqArrow| -> usize {
        match arrows.binary_search(&target) {
            Ok(idx) => idx,
            Err(idx) => idx - 1, // target always >= arrows[0] by construction
        }
    };

    let mut hits_by_stop: std::collections::HashMap<usize, Vec<usize>> =
        std::collections::HashMap::new();
    for &hit_idx in &order {
        let stop_idx = arrows.binary_search(&calc_hits[hit_idx].stop_arrow()).unwrap();
        hits_by_stop.entry(stop_idx).or_default().push(hit_idx);
    }

    for k in 0..arrows.len() {
        if k > 0 {
            best_score[k] = best_score[k - 1];
            best_archive[k] = best_archive[k - 1].clone();
        }
        let Some(hits_here) = hits_by_stop.get(&k) else {
            continue;
        };
        for &hit_idx in hits_here {
            let hit = &calc_hits[hit_idx];
            // Scan backwards from this hit's natural predecessor boundary: the largest event
            // arrow at or before its own start always yields a compatible archive (every hit in
            // it ends no later than this hit begins), but when `permit_full_overlap` is set a
            // later, higher-scoring predecessor snapshot may still be compatible (e.g. it
            // contains only hits nested entirely inside `hit`), so try those first.
            let floor = arrow_floor(hit.start_arrow());
            let mut chosen_p = floor;
            for p in (floor..=k).rev() {
                if best_archive[p]
                    .iter()
                    .all(|&other_idx| !conflicts(hit, &calc_hits[other_idx], cfg))
                {
                    chosen_p = p;
                    break;
                }
            }
            let candidate_score = best_score[chosen_p] + hit.score;
            if candidate_score > best_score[k] {
                best_score[k] = candidate_score;
                let mut archive = best_archive[chosen_p].clone();
                archive.push(hit_idx);
                best_archive[k] = archive;
            }
        }
    }

    let last = arrows.len() - 1;
    Ok(ScoredArchive {
        hits: best_archive[last].clone(),
        total_score: best_score[last],
    })
}

/// Convenience wrapper: prepare and resolve in one call.
///
/// # Errors
/// See [`prepare`] and [`resolve`].
pub fn resolve_hits(
    hits: &[FullHit],
    cfg: &ResolverConfig,
    cancelled: &AtomicBool,
) -> Result<(Vec<CalcHit>, ScoredArchive), Error> {
    let calc_hits = prepare(hits, cfg)?;
    let archive = resolve(&calc_hits, cfg, cancelled)?;
    Ok((calc_hits, archive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: u32, b: u32) -> SeqSeg {
        SeqSeg::new(ResIdx(a), ResIdx(b)).unwrap()
    }

    fn hit(label: &str, score: f64, segs: Vec<SeqSeg>) -> FullHit {
        FullHit::new(SeqSegRun::new(segs).unwrap(), label.to_string(), score, ScoreType::CrhValue)
    }

    #[test]
    fn simple_resolve_picks_compatible_high_scorers() {
        let hits = vec![
            hit("A", 10.0, vec![seg(1, 20), seg(40, 49)]),
            hit("B", 8.0, vec![seg(10, 29)]),
            hit("C", 9.0, vec![seg(50, 69)]),
        ];
        let cfg = ResolverConfig::default();
        let (calc, archive) = resolve_hits(&hits, &cfg, &AtomicBool::new(false)).unwrap();
        let labels: Vec<&str> = archive.hits().iter().map(|&i| hits[calc[i].source()].label.as_str()).collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"A"));
        assert!(labels.contains(&"C"));
        assert!((archive.total_score() - 19.0).abs() < 1e-6);
    }

    #[test]
    fn intersperse_scenario_needs_all_three() {
        let hits = vec![
            hit("C", 1.0, vec![seg(0, 9), seg(60, 69)]),
            hit("A", 1.0, vec![seg(10, 19), seg(40, 49)]),
            hit("B", 1.0, vec![seg(30, 39), seg(50, 59)]),
        ];
        let cfg = ResolverConfig {
            trim_spec: TrimSpec::new(1, 0).unwrap(),
            ..ResolverConfig::default()
        };
        let (calc, archive) = resolve_hits(&hits, &cfg, &AtomicBool::new(false)).unwrap();
        assert_eq!(archive.hits().len(), 3);
        assert!((archive.total_score() - 3.0).abs() < 1e-6);
        let _ = calc;
    }

    #[test]
    fn non_finite_score_is_rejected() {
        assert!(to_resscr(f64::NAN, ScoreType::CrhValue).is_err());
        assert!(to_resscr(0.0, ScoreType::Evalue).is_err());
    }

    #[test]
    fn cancellation_is_observed_before_processing() {
        let hits = vec![hit("A", 10.0, vec![seg(1, 20)])];
        let cfg = ResolverConfig::default();
        let err = resolve_hits(&hits, &cfg, &AtomicBool::new(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn permit_full_overlap_allows_nested_hits() {
        let hits = vec![
            hit("outer", 5.0, vec![seg(0, 99)]),
            hit("inner", 3.0, vec![seg(10, 19)]),
        ];
        let strict = ResolverConfig::default();
        let (calc, archive) = resolve_hits(&hits, &strict, &AtomicBool::new(false)).unwrap();
        assert_eq!(archive.hits().len(), 1);
        assert_eq!(hits[calc[archive.hits()[0]].source()].label, "outer");

        let lenient = ResolverConfig {
            permit_full_overlap: true,
            ..ResolverConfig::default()
        };
        let (calc, archive) = resolve_hits(&hits, &lenient, &AtomicBool::new(false)).unwrap();
        assert_eq!(archive.hits().len(), 2);
        assert!((archive.total_score() - 8.0).abs() < 1e-6);
        let _ = calc;
    }
}
