//! TSV writer for resolved hit archives: one row per chosen hit, tab-separated.

use crate::resolve::{CalcHit, FullHit, ResolverConfig, ScoredArchive};

/// Render a [`ScoredArchive`] as a TSV table: `query\tlabel\tscore\tsegments`, one row per chosen
/// hit, in the order the archive holds them. `query` names the sequence every hit was found on.
/// Segment boundaries are the trimmed (`CalcHit`) or original (`FullHit`) ones according to
/// `cfg.output_trimmed_boundaries`.
#[must_use]
pub fn write_resolver_tsv(
    query: &str,
    archive: &ScoredArchive,
    calc_hits: &[CalcHit],
    hits: &[FullHit],
    cfg: &ResolverConfig,
) -> String {
    let mut out = String::from("query\tlabel\tscore\tsegments\n");
    for &hit_idx in archive.hits() {
        let calc = &calc_hits[hit_idx];
        let full = &hits[calc.source()];
        let segs = if cfg.output_trimmed_boundaries {
            calc.segs()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        } else {
            full.segs.to_string()
        };
        out.push_str(&format!("{query}\t{}\t{}\t{segs}\n", full.label, calc.score()));
    }
    out
}
