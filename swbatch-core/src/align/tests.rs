use std::sync::Arc;

use proptest::prelude::*;
use wide::i16x16;

use super::encode::{encode_or_wildcard, encode_query};
use super::scalar_ref::align_local_scalar;
use super::state::{BatchAligner, LaneBatch};
use super::{align_local, lane_simd, LANES};
use crate::scoring::Scoring;
use crate::seq::SeqRecord;

fn enc(seq: &[u8]) -> Vec<u8> {
    seq.iter().copied().map(encode_or_wildcard).collect()
}

fn aligner_for(query: &[u8], scoring: &Scoring) -> BatchAligner {
    let query_idx: Arc<[u8]> = encode_query(query, scoring).into();
    BatchAligner::new(Arc::from("query"), Arc::from(query.to_vec()), query_idx)
}

/// Run one batch through the full state machinery and return the per-lane
/// scores.
fn batch_scores(query: &[u8], targets: &[&[u8]], scoring: &mut Scoring) -> Vec<i32> {
    scoring.fill_unset();
    let records: Vec<SeqRecord> = targets
        .iter()
        .enumerate()
        .map(|(i, t)| SeqRecord::new(format!("t{i}"), t.to_vec()))
        .collect();
    let mut aligner = aligner_for(query, scoring);
    aligner.load(LaneBatch::from_records(records, 0));
    aligner.fill(scoring);
    aligner.lane_scores().to_vec()
}

// ---- Known-answer tests ----

#[test]
fn small_dna_with_affine_gap() {
    // GACAG against GAAG inside TGAAGT: four matches and one length-1 gap
    let scoring = Scoring::new(2, -2, -2, -1, false);
    assert_eq!(align_local(b"GACAG", b"TGAAGT", &scoring), 5);
}

#[test]
fn small_dna_gap_too_expensive() {
    // a steeper gap open leaves the plain GA / AG hits as the best cells
    let scoring = Scoring::new(2, -2, -4, -1, false);
    assert_eq!(align_local(b"GACAG", b"TGAAGT", &scoring), 4);

    let scoring = Scoring::new(1, -2, -4, -1, false);
    assert_eq!(align_local(b"GACAG", b"TGAAGT", &scoring), 2);
}

#[test]
fn identity_alignment() {
    let scoring = Scoring::default();
    assert_eq!(align_local(b"AAAAA", b"AAAAA", &scoring), 10);
}

#[test]
fn disjoint_sequences_score_zero() {
    let scoring = Scoring::default();
    assert_eq!(align_local(b"AAAAA", b"TTTTT", &scoring), 0);
}

#[test]
fn short_target_with_gap() {
    // best hit is the plain TA / TA diagonal, beating A-TA vs ATTA
    let scoring = Scoring::new(2, -2, -2, -1, false);
    assert_eq!(align_local(b"AGTTA", b"ATA", &scoring), 4);
}

#[test]
fn substitution_matrix_override() {
    let mut scoring = Scoring::default();
    scoring.add_mutation(b'A', b'G', 1).unwrap();
    assert_eq!(align_local(b"A", b"G", &scoring), 1);
}

#[test]
fn lowercase_input_folds_to_same_indices() {
    let scoring = Scoring::default();
    assert_eq!(
        align_local(b"gattaca", b"GATTACA", &scoring),
        align_local(b"GATTACA", b"GATTACA", &scoring)
    );
}

// ---- Batched engine ----

#[test]
fn mixed_length_batch_matches_scalar() {
    let mut scoring = Scoring::default();
    let targets: Vec<&[u8]> = vec![b"GATTACA", b"GATACA", b"TAACA", b"GATC"];
    let scores = batch_scores(b"GATTACA", &targets, &mut scoring);
    assert_eq!(scores.len(), targets.len());
    assert_eq!(scores[0], 14); // identity lane

    let query_idx = enc(b"GATTACA");
    for (lane, target) in targets.iter().enumerate() {
        let expected = align_local_scalar(&query_idx, &enc(target), &scoring);
        assert_eq!(scores[lane], expected, "lane {lane}");
    }
}

#[test]
fn padding_lanes_score_zero() {
    let mut scoring = Scoring::default();
    let records = vec![
        SeqRecord::new("a", b"GATTACA".to_vec()),
        SeqRecord::new("b", b"CATTAG".to_vec()),
        SeqRecord::new("c", b"TT".to_vec()),
    ];
    scoring.fill_unset();
    let mut aligner = aligner_for(b"GATTACA", &scoring);
    aligner.load(LaneBatch::from_records(records, 0));
    aligner.fill(&scoring);
    assert_eq!(aligner.lane_scores().len(), 3);
    for &score in &aligner.max_scores()[3..] {
        assert_eq!(score, 0);
    }
}

#[test]
fn refilling_a_reused_state_is_idempotent() {
    let mut scoring = Scoring::default();
    scoring.fill_unset();
    let targets = [&b"GATTACA"[..], b"TTGACA", b"AC"];

    let mut aligner = aligner_for(b"GATTACA", &scoring);
    let mut runs = Vec::new();
    for _ in 0..2 {
        let records: Vec<SeqRecord> = targets
            .iter()
            .map(|t| SeqRecord::new("t", t.to_vec()))
            .collect();
        aligner.load(LaneBatch::from_records(records, 0));
        aligner.fill(&scoring);
        runs.push(aligner.lane_scores().to_vec());
        aligner.release_batch();
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn kernel_agrees_with_scalar_directly() {
    let mut scoring = Scoring::new(3, -1, -5, -2, false);
    scoring.fill_unset();
    let query_idx = enc(b"GCATGCAT");
    let targets = [&b"GCAT"[..], b"ATGCA", b"GGGG", b"CATCATCAT"];

    let records: Vec<SeqRecord> = targets
        .iter()
        .map(|t| SeqRecord::new("t", t.to_vec()))
        .collect();
    let batch = LaneBatch::from_records(records, 0);

    let width = query_idx.len() + 1;
    let mut h = vec![i16x16::splat(0); width];
    let mut e = vec![i16x16::splat(0); width];
    let mut f = vec![i16x16::splat(0); width];
    let maxes = lane_simd::fill_lane_strips(
        &query_idx,
        batch.indexes(),
        batch.height(),
        &scoring,
        &mut h,
        &mut e,
        &mut f,
    );

    for (lane, target) in targets.iter().enumerate() {
        let expected = align_local_scalar(&query_idx, &enc(target), &scoring);
        assert_eq!(i32::from(maxes[lane]), expected, "lane {lane}");
    }
    for &lane_max in &maxes[targets.len()..] {
        assert_eq!(lane_max, 0);
    }
}

#[test]
fn overflow_bound_falls_back_to_scalar() {
    // 400 matches at 100 apiece exceeds i16; the state must still report the
    // exact score through the i32 path
    let mut scoring = Scoring::new(100, -2, -2, -1, false);
    let seq = vec![b'A'; 400];
    let scores = batch_scores(&seq, &[seq.as_slice()], &mut scoring);
    assert_eq!(scores[0], 40_000);
}

// ---- Properties ----

fn dna_seq(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
        1..max_len,
    )
}

proptest! {
    #[test]
    fn batch_matches_scalar_reference(
        query in dna_seq(40),
        targets in prop::collection::vec(dna_seq(40), 1..=LANES),
        match_score in 1i16..=4,
        mismatch in -4i16..=-1,
        gap_open in -6i16..=-2,
        gap_extend in -3i16..=-1,
    ) {
        let mut scoring = Scoring::new(match_score, mismatch, gap_open, gap_extend, false);
        let target_refs: Vec<&[u8]> = targets.iter().map(Vec::as_slice).collect();
        let scores = batch_scores(&query, &target_refs, &mut scoring);

        let query_idx = enc(&query);
        for (lane, target) in targets.iter().enumerate() {
            let expected = align_local_scalar(&query_idx, &enc(target), &scoring);
            prop_assert_eq!(scores[lane], expected, "lane {}", lane);
        }
    }
}

proptest! {
    #[test]
    fn self_alignment_is_full_score(seq in dna_seq(60)) {
        let scoring = Scoring::default();
        prop_assert_eq!(align_local(&seq, &seq, &scoring), 2 * seq.len() as i32);
    }
}

proptest! {
    #[test]
    fn scores_are_non_negative_and_bounded(
        query in dna_seq(50),
        target in dna_seq(50),
    ) {
        let scoring = Scoring::default();
        let score = align_local(&query, &target, &scoring);
        prop_assert!(score >= 0);
        let bound = query.len().min(target.len()) as i32
            * i32::from(scoring.max_substitution());
        prop_assert!(score <= bound);
    }
}

proptest! {
    #[test]
    fn effective_lanes_ignore_padding(
        query in dna_seq(30),
        targets in prop::collection::vec(dna_seq(30), 1..LANES),
    ) {
        // scores of the k effective lanes must not depend on how many
        // wildcard padding lanes follow them
        let mut scoring = Scoring::default();
        let target_refs: Vec<&[u8]> = targets.iter().map(Vec::as_slice).collect();
        let partial = batch_scores(&query, &target_refs, &mut scoring);

        let query_idx = enc(&query);
        for (lane, target) in targets.iter().enumerate() {
            let expected = align_local_scalar(&query_idx, &enc(target), &scoring);
            prop_assert_eq!(partial[lane], expected);
        }
    }
}
