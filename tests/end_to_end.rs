//! End-to-end fixtures exercising the three engines through their public API: SSAP pairwise
//! comparison, multi-structure glue along a spanning tree, and the hit resolver's sweep.

use std::sync::atomic::AtomicBool;

use nalgebra::{Matrix3, Point3};

use cath_tools::alignment::{Alignment, Entry};
use cath_tools::config::SsapConfig;
use cath_tools::protein::{AminoAcid, PdbResidueId, Protein, Residue, SsTag};
use cath_tools::resolve::{resolve_hits, FullHit, ResolverConfig, ScoreType};
use cath_tools::seq::{ResIdx, SeqSeg, SeqSegRun};
use cath_tools::spanning::{build_multi_alignment, ScoredEdge};
use cath_tools::{ssap_compare, Result};

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

fn helical_protein(name: &str, n: usize) -> Protein {
    let residues = (0..n)
        .map(|i| {
            let t = i as f64 * 1.3;
            residue(i as i32, i as f64 * 1.5, t.sin(), t.cos())
        })
        .collect();
    Protein::new(name.to_string(), residues, vec![])
}

/// Scenario: a trivial SSAP self-comparison of a 25-residue structure should align every residue
/// and land just under the normalized-score ceiling.
#[test]
fn ssap_trivial_self_comparison_nearly_saturates_the_score() -> Result<()> {
    let protein = helical_protein("domain", 25);
    let cfg = SsapConfig {
        use_fast_ss_pass: false,
        ..SsapConfig::default()
    };
    let result = ssap_compare(&protein, &protein, &cfg, &AtomicBool::new(false))?;
    assert_eq!(result.alignment.len(), 25);
    assert!((result.overlap_pct - 100.0).abs() < 1e-6);
    assert!(result.rmsd.unwrap() < 1e-6);
    assert!(result.normalized_score >= 99.0);
    assert!(result.normalized_score <= 100.0);
    Ok(())
}

/// Scenario: four structures glued pairwise along a maximum spanning tree produce one alignment
/// covering all four, with the shared entries correctly merged.
#[test]
fn four_way_glue_covers_every_structure() -> Result<()> {
    fn pair(shared_name: &str, other_name: &str, shared: Vec<Option<ResIdx>>, other: Vec<Option<ResIdx>>) -> Alignment {
        Alignment::new(
            vec![Entry::new(shared_name, shared), Entry::new(other_name, other)],
            None,
        )
        .unwrap()
    }

    fn ri(v: u32) -> Option<ResIdx> {
        Some(ResIdx::new(v))
    }

    // Spanning tree: (0,1), (0,2), (0,3) -- a star rooted at 0, each pairwise alignment sharing
    // structure 0's column as the common reference.
    let edges_and_alignments = vec![
        (
            ScoredEdge::new(0, 1, 90.0),
            pair("0", "1", vec![ri(0), ri(1), ri(2)], vec![ri(0), ri(1), ri(2)]),
        ),
        (
            ScoredEdge::new(0, 2, 88.0),
            pair("0", "2", vec![ri(0), ri(1), ri(2)], vec![ri(0), ri(1), ri(2)]),
        ),
        (
            ScoredEdge::new(0, 3, 85.0),
            pair("0", "3", vec![ri(0), ri(1), ri(2)], vec![ri(0), ri(1), ri(2)]),
        ),
    ];

    let glued = build_multi_alignment(4, &edges_and_alignments)?;
    assert_eq!(glued.entries().len(), 4);
    for name in ["0", "1", "2", "3"] {
        let idx = glued.entry_index(name).expect("every structure present");
        let present: Vec<u32> = glued.entries()[idx].positions().iter().flatten().map(|r| r.get()).collect();
        assert_eq!(present, vec![0, 1, 2]);
    }
    Ok(())
}

/// Scenario: three interspersed, equally scored hits must all be kept since no pair overlaps
/// after trimming.
#[test]
fn resolver_keeps_all_interspersed_hits() -> Result<()> {
    fn seg(a: u32, b: u32) -> SeqSeg {
        SeqSeg::new(ResIdx::new(a), ResIdx::new(b)).unwrap()
    }
    fn hit(label: &str, segs: Vec<SeqSeg>) -> FullHit {
        FullHit::new(SeqSegRun::new(segs).unwrap(), label.to_string(), 1.0, ScoreType::CrhValue)
    }

    let hits = vec![
        hit("C", vec![seg(0, 9), seg(60, 69)]),
        hit("A", vec![seg(10, 19), seg(40, 49)]),
        hit("B", vec![seg(30, 39), seg(50, 59)]),
    ];
    let cfg = ResolverConfig::default();
    let (_calc, archive) = resolve_hits(&hits, &cfg, &AtomicBool::new(false))?;
    assert_eq!(archive.hits().len(), 3);
    assert!((archive.total_score() - 3.0).abs() < 1e-6);
    Ok(())
}

/// Scenario: a simple overlap between a long and a short hit keeps only the higher-scoring,
/// non-conflicting subset, and the resolver TSV writer renders it in the documented column order.
#[test]
fn resolver_simple_overlap_and_tsv_output() -> Result<()> {
    fn seg(a: u32, b: u32) -> SeqSeg {
        SeqSeg::new(ResIdx::new(a), ResIdx::new(b)).unwrap()
    }
    fn hit(label: &str, score: f64, segs: Vec<SeqSeg>) -> FullHit {
        FullHit::new(SeqSegRun::new(segs).unwrap(), label.to_string(), score, ScoreType::CrhValue)
    }

    let hits = vec![
        hit("A", 10.0, vec![seg(1, 20), seg(40, 49)]),
        hit("B", 8.0, vec![seg(10, 29)]),
        hit("C", 9.0, vec![seg(50, 69)]),
    ];
    let cfg = ResolverConfig::default();
    let (calc, archive) = resolve_hits(&hits, &cfg, &AtomicBool::new(false))?;
    let labels: Vec<&str> = archive.hits().iter().map(|&i| hits[calc[i].source()].label.as_str()).collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"A"));
    assert!(labels.contains(&"C"));

    let tsv = cath_tools::io::write_resolver_tsv("query-seq", &archive, &calc, &hits, &cfg);
    assert!(tsv.starts_with("query\tlabel\tscore\tsegments\n"));
    assert!(tsv.contains("query-seq\tA\t10\t1-20,40-49"));
    assert!(tsv.contains("query-seq\tC\t9\t50-69"));
    Ok(())
}
