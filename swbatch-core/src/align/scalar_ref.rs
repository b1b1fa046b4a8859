//! Scalar Gotoh local alignment over index-encoded sequences.
//!
//! One lane at a time, i32 arithmetic. This is the reference the lane-batched
//! kernel is tested against, the path taken when the `simd` feature is off,
//! and the fallback when a workload could overflow 16-bit lanes.

use crate::scoring::Scoring;

/// Best local alignment score between `query_idx` and `target_idx`.
///
/// Three recurrence arrays floored at zero: H closes a cell diagonally from
/// whichever of H/E/F was best at the upper-left neighbour, E extends gaps
/// along the query dimension, F along the target dimension.
pub fn align_local_scalar(query_idx: &[u8], target_idx: &[u8], scoring: &Scoring) -> i32 {
    if query_idx.is_empty() || target_idx.is_empty() {
        return 0;
    }

    let width = query_idx.len() + 1;
    // A length-1 gap costs gap_open + gap_extend.
    let gap_first = i32::from(scoring.gap_open) + i32::from(scoring.gap_extend);
    let gap_extend = i32::from(scoring.gap_extend);

    let mut h = vec![0i32; width];
    let mut e = vec![0i32; width];
    let mut f = vec![0i32; width];
    let mut best = 0i32;

    for &tb in target_idx {
        let mut h_left = 0i32;
        let mut e_left = 0i32;
        let mut f_left = 0i32;
        let mut h_upleft = 0i32;
        let mut e_upleft = 0i32;
        let mut f_upleft = 0i32;

        for i in 1..width {
            let h_up = h[i];
            let e_up = e[i];
            let f_up = f[i];

            let sub = i32::from(scoring.score(query_idx[i - 1], tb));
            let h_curr = (h_upleft.max(e_upleft).max(f_upleft) + sub).max(0);
            let e_curr = (h_left.max(f_left) + gap_first)
                .max(e_left + gap_extend)
                .max(0);
            let f_curr = (h_up.max(e_up) + gap_first)
                .max(f_up + gap_extend)
                .max(0);

            h[i] = h_curr;
            e[i] = e_curr;
            f[i] = f_curr;
            best = best.max(h_curr);

            h_upleft = h_up;
            e_upleft = e_up;
            f_upleft = f_up;
            h_left = h_curr;
            e_left = e_curr;
            f_left = f_curr;
        }
    }

    best
}
