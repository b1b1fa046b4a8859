use crate::scoring::Scoring;

pub mod encode;
pub mod lane_simd;
pub mod scalar_ref;
pub mod state;

pub use encode::{encode_query, encode_seq, ALPHABET_SIZE, WILDCARD_INDEX};
pub use state::{BatchAligner, LaneBatch};

#[cfg(test)]
mod tests;

/// Database lanes per SIMD vector: sixteen 16-bit scores in a 256-bit lane
/// group.
pub const LANES: usize = 16;

/// Conservative limit to prevent i16 overflow in the lane kernel.
/// The kernel uses i16 for DP values, so max_abs_score * alignable_length
/// must stay well below i16::MAX (32767); batches over the limit take the
/// i32 scalar path instead.
pub const SIMD_MAX_SAFE_SCORE: i32 = 30000;

/// Local alignment score for a single query/target pair of raw byte
/// sequences. Query characters unknown to the scoring scheme degrade to the
/// wildcard, target characters outside the alphabet likewise.
pub fn align_local(query: &[u8], target: &[u8], scoring: &Scoring) -> i32 {
    let query_idx = encode::encode_query(query, scoring);
    let target_idx: Vec<u8> = target.iter().copied().map(encode::encode_or_wildcard).collect();
    scalar_ref::align_local_scalar(&query_idx, &target_idx, scoring)
}
