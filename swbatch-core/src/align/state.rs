use std::sync::Arc;

use wide::i16x16;

use super::encode::{encode_or_wildcard, WILDCARD_INDEX};
#[cfg(feature = "simd")]
use super::lane_simd;
use super::{scalar_ref, LANES};
use crate::scoring::Scoring;
use crate::seq::SeqRecord;

#[cfg(feature = "simd")]
use super::SIMD_MAX_SAFE_SCORE;

/// Per-batch data: up to [`LANES`] database records with their interleaved
/// index array, padded to the batch height with the wildcard index.
#[derive(Clone, Debug)]
pub struct LaneBatch {
    names: Vec<Box<str>>,
    seqs: Vec<Vec<u8>>,
    lens: Vec<usize>,
    indexes: Vec<u8>,
    height: usize,
    base_index: usize,
}

impl LaneBatch {
    /// Build a batch from 1..=[`LANES`] records. The padded height is the
    /// longest record in the batch; `base_index` is the database index of
    /// lane 0.
    pub fn from_records(records: Vec<SeqRecord>, base_index: usize) -> Self {
        debug_assert!(!records.is_empty() && records.len() <= LANES);
        let height = records.iter().map(|r| r.len()).max().unwrap_or(0);

        let mut indexes = vec![WILDCARD_INDEX; height * LANES];
        let mut names = Vec::with_capacity(records.len());
        let mut seqs = Vec::with_capacity(records.len());
        let mut lens = Vec::with_capacity(records.len());

        for (lane, record) in records.into_iter().enumerate() {
            for (j, &c) in record.seq.iter().enumerate() {
                indexes[j * LANES + lane] = encode_or_wildcard(c);
            }
            lens.push(record.seq.len());
            names.push(record.id);
            seqs.push(record.seq);
        }

        Self {
            names,
            seqs,
            lens,
            indexes,
            height,
            base_index,
        }
    }

    /// Number of effective lanes; the remaining lanes up to [`LANES`] are
    /// wildcard padding.
    pub fn lanes(&self) -> usize {
        self.lens.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn base_index(&self) -> usize {
        self.base_index
    }

    pub fn name(&self, lane: usize) -> &str {
        &self.names[lane]
    }

    pub fn seq(&self, lane: usize) -> &[u8] {
        &self.seqs[lane]
    }

    pub fn lane_len(&self, lane: usize) -> usize {
        self.lens[lane]
    }

    pub fn indexes(&self) -> &[u8] {
        &self.indexes
    }

    #[inline]
    pub fn index_at(&self, row: usize, lane: usize) -> u8 {
        self.indexes[row * LANES + lane]
    }
}

/// Reusable alignment state: the query context, the strip buffers, and the
/// scores of the batch most recently filled.
///
/// `Vec<i16x16>` strips give the 32-byte alignment the kernel's vector loads
/// want; sizing depends only on the query, so a state created once serves
/// every batch of a run.
pub struct BatchAligner {
    query_name: Arc<str>,
    query_seq: Arc<[u8]>,
    query_idx: Arc<[u8]>,
    batch: Option<LaneBatch>,
    h: Vec<i16x16>,
    e: Vec<i16x16>,
    f: Vec<i16x16>,
    max_scores: [i32; LANES],
}

impl BatchAligner {
    pub fn new(query_name: Arc<str>, query_seq: Arc<[u8]>, query_idx: Arc<[u8]>) -> Self {
        let width = query_idx.len() + 1;
        Self {
            query_name,
            query_seq,
            query_idx,
            batch: None,
            h: vec![i16x16::splat(0); width],
            e: vec![i16x16::splat(0); width],
            f: vec![i16x16::splat(0); width],
            max_scores: [0; LANES],
        }
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    pub fn query_seq(&self) -> &[u8] {
        &self.query_seq
    }

    pub fn batch(&self) -> Option<&LaneBatch> {
        self.batch.as_ref()
    }

    /// Hand a fresh batch to this state; scores from the previous fill are
    /// reset.
    pub fn load(&mut self, batch: LaneBatch) {
        self.batch = Some(batch);
        self.max_scores = [0; LANES];
    }

    /// Drop ownership of the per-batch data while keeping the scratch
    /// buffers and the computed scores.
    pub fn release_batch(&mut self) -> Option<LaneBatch> {
        self.batch.take()
    }

    /// Per-lane maxima of the last fill, one entry per effective lane.
    pub fn lane_scores(&self) -> &[i32] {
        let lanes = self.batch.as_ref().map_or(LANES, LaneBatch::lanes);
        &self.max_scores[..lanes]
    }

    pub fn max_scores(&self) -> &[i32; LANES] {
        &self.max_scores
    }

    /// Fill the strips for the loaded batch and record the per-lane maxima.
    pub fn fill(&mut self, scoring: &Scoring) {
        self.max_scores = [0; LANES];
        if self.batch.is_none() {
            return;
        }
        #[cfg(feature = "simd")]
        if self.lanes_fit_i16(scoring) {
            self.fill_lanes(scoring);
            return;
        }
        self.fill_scalar(scoring);
    }

    /// Whether the score bound `max_abs_score * alignable_len` stays inside
    /// the 16-bit headroom of the lane kernel.
    #[cfg(feature = "simd")]
    fn lanes_fit_i16(&self, scoring: &Scoring) -> bool {
        let Some(batch) = self.batch.as_ref() else {
            return false;
        };
        let len = self.query_idx.len().min(batch.height());
        scoring.max_abs_score().saturating_mul(len as i32) <= SIMD_MAX_SAFE_SCORE
    }

    #[cfg(feature = "simd")]
    fn fill_lanes(&mut self, scoring: &Scoring) {
        let Some(batch) = self.batch.as_ref() else {
            return;
        };
        let maxes = lane_simd::fill_lane_strips(
            &self.query_idx,
            batch.indexes(),
            batch.height(),
            scoring,
            &mut self.h,
            &mut self.e,
            &mut self.f,
        );
        for (slot, lane_max) in self.max_scores.iter_mut().zip(maxes) {
            *slot = i32::from(lane_max);
        }
    }

    fn fill_scalar(&mut self, scoring: &Scoring) {
        let Some(batch) = self.batch.as_ref() else {
            return;
        };
        let mut lane_seq: Vec<u8> = Vec::with_capacity(batch.height());
        for lane in 0..batch.lanes() {
            lane_seq.clear();
            for row in 0..batch.lane_len(lane) {
                lane_seq.push(batch.index_at(row, lane));
            }
            self.max_scores[lane] =
                scalar_ref::align_local_scalar(&self.query_idx, &lane_seq, scoring);
        }
    }
}
