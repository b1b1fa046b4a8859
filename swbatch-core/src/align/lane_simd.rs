//! Lane-batched local alignment kernel.
//!
//! One `i16x16` covers the same DP cell of sixteen database lanes at once.
//! The outer loop walks database rows, the inner loop query columns; the
//! previous row lives in the three strip buffers, previous-column and
//! diagonal values rotate through registers. Strip buffers are `width`
//! vectors each, so the working set is O(query length) regardless of how
//! long the database entries are.

use wide::i16x16;

use super::LANES;
use crate::scoring::Scoring;

/// Fill the H/E/F strips for one batch and return the per-lane maxima.
///
/// `lane_idx` is the interleaved index array: position `(row j, lane l)` is
/// at `j * LANES + l`, with short lanes padded by the wildcard index.
/// Requires `scoring.fill_unset()` and strips of length `query_idx.len() + 1`.
pub fn fill_lane_strips(
    query_idx: &[u8],
    lane_idx: &[u8],
    height: usize,
    scoring: &Scoring,
    h: &mut [i16x16],
    e: &mut [i16x16],
    f: &mut [i16x16],
) -> [i16; LANES] {
    let width = query_idx.len() + 1;
    debug_assert_eq!(h.len(), width);
    debug_assert_eq!(e.len(), width);
    debug_assert_eq!(f.len(), width);
    debug_assert!(lane_idx.len() >= height * LANES);

    let v_zero = i16x16::splat(0);
    h.fill(v_zero);
    e.fill(v_zero);
    f.fill(v_zero);

    if query_idx.is_empty() || height == 0 {
        return [0; LANES];
    }

    // A length-1 gap costs gap_open + gap_extend.
    let v_gap_first = i16x16::splat(scoring.gap_open + scoring.gap_extend);
    let v_gap_extend = i16x16::splat(scoring.gap_extend);
    let mut v_max = v_zero;

    for j in 0..height {
        let mut b_lanes = [0u8; LANES];
        b_lanes.copy_from_slice(&lane_idx[j * LANES..(j + 1) * LANES]);

        // Column 0 of every row is the zero boundary; strip slot 0 never moves.
        let mut v_h_left = v_zero;
        let mut v_e_left = v_zero;
        let mut v_f_left = v_zero;
        let mut v_h_upleft = v_zero;
        let mut v_e_upleft = v_zero;
        let mut v_f_upleft = v_zero;

        for i in 1..width {
            let v_sub = scoring.lookup_lanes(query_idx[i - 1], &b_lanes);
            let v_h_up = h[i];
            let v_e_up = e[i];
            let v_f_up = f[i];

            let v_h_curr = (v_h_upleft.max(v_e_upleft).max(v_f_upleft) + v_sub).max(v_zero);
            let v_e_curr = (v_h_left.max(v_f_left) + v_gap_first)
                .max(v_e_left + v_gap_extend)
                .max(v_zero);
            let v_f_curr = (v_h_up.max(v_e_up) + v_gap_first)
                .max(v_f_up + v_gap_extend)
                .max(v_zero);

            h[i] = v_h_curr;
            e[i] = v_e_curr;
            f[i] = v_f_curr;
            v_max = v_max.max(v_h_curr);

            v_h_upleft = v_h_up;
            v_e_upleft = v_e_up;
            v_f_upleft = v_f_up;
            v_h_left = v_h_curr;
            v_e_left = v_e_curr;
            v_f_left = v_f_curr;
        }
    }

    v_max.to_array()
}
