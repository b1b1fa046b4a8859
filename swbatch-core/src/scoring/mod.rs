pub mod load;

pub use load::{load_matrix, load_matrix_from_path};

use bit_set::BitSet;
use wide::i16x16;

use crate::align::encode::{try_encode, ALPHABET_SIZE, WILDCARD_INDEX};
use crate::align::LANES;
use crate::error::{SwError, SwResult};

/// Range every explicitly assigned substitution score must fit in.
pub const MUTATION_SCORE_MIN: i32 = -127;
pub const MUTATION_SCORE_MAX: i32 = 127;

/// Substitution scoring over the 32-slot alphabet plus affine gap penalties.
///
/// Pairs not explicitly assigned fall back to `match_score`/`mismatch_score`.
/// Every pair involving the wildcard index scores at most 0, so padding lanes
/// and padded tail positions can never raise a lane maximum.
#[derive(Clone, Debug)]
pub struct Scoring {
    pub gap_open: i16,
    pub gap_extend: i16,
    pub match_score: i16,
    pub mismatch_score: i16,
    /// Cleared when a substitution matrix is loaded without overriding match.
    pub use_match_mismatch: bool,
    pub case_sensitive: bool,
    swap_scores: Box<[[i16; ALPHABET_SIZE]; ALPHABET_SIZE]>,
    swap_set: BitSet,
    min_mutation: i16,
    max_mutation: i16,
    filled: bool,
}

impl Scoring {
    pub fn new(
        match_score: i16,
        mismatch_score: i16,
        gap_open: i16,
        gap_extend: i16,
        case_sensitive: bool,
    ) -> Self {
        // Gap of length 1 costs gap_open + gap_extend; length N costs
        // gap_open + gap_extend * N.
        assert!(gap_open <= 0, "gap_open must be <= 0");
        assert!(gap_extend <= 0, "gap_extend must be <= 0");
        Self {
            gap_open,
            gap_extend,
            match_score,
            mismatch_score,
            use_match_mismatch: true,
            case_sensitive,
            swap_scores: Box::new([[0; ALPHABET_SIZE]; ALPHABET_SIZE]),
            swap_set: BitSet::with_capacity(ALPHABET_SIZE * ALPHABET_SIZE),
            min_mutation: 0,
            max_mutation: 0,
            filled: false,
        }
    }

    /// Assign the score for aligning character `a` against character `b`.
    pub fn add_mutation(&mut self, a: u8, b: u8, score: i32) -> SwResult<()> {
        let index_a = try_encode(a).ok_or(SwError::IllegalCharacter {
            ch: a as char,
            pos: 0,
        })?;
        let index_b = try_encode(b).ok_or(SwError::IllegalCharacter {
            ch: b as char,
            pos: 0,
        })?;
        if !(MUTATION_SCORE_MIN..=MUTATION_SCORE_MAX).contains(&score) {
            return Err(SwError::ScoreOutOfRange {
                a: a as char,
                b: b as char,
                score,
            });
        }
        let score = score as i16;
        self.swap_scores[index_a as usize][index_b as usize] = score;
        self.swap_set.insert(pair_index(index_a, index_b));
        self.min_mutation = self.min_mutation.min(score);
        self.max_mutation = self.max_mutation.max(score);
        self.filled = false;
        Ok(())
    }

    pub fn is_set(&self, a: u8, b: u8) -> bool {
        self.swap_set.contains(pair_index(a, b))
    }

    /// Whether alphabet index `idx` participates in the active scoring scheme.
    /// Under match/mismatch every letter does; under a matrix-only scheme only
    /// letters with an explicit diagonal entry do.
    pub fn is_known(&self, idx: u8) -> bool {
        self.use_match_mismatch || self.is_set(idx, idx)
    }

    /// Score for aligning alphabet index `a` against `b`.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i16 {
        let score = if self.is_set(a, b) {
            self.swap_scores[a as usize][b as usize]
        } else if a == b {
            self.match_score
        } else {
            self.mismatch_score
        };
        if a == WILDCARD_INDEX || b == WILDCARD_INDEX {
            score.min(0)
        } else {
            score
        }
    }

    /// Gathered row lookup for the lane-batched kernel: the scores of query
    /// index `a` against one database index per lane.
    ///
    /// Requires [`Scoring::fill_unset`] so every cell is dense-readable.
    #[inline]
    pub fn lookup_lanes(&self, a: u8, b_lanes: &[u8; LANES]) -> i16x16 {
        debug_assert!(self.filled, "lookup_lanes requires fill_unset");
        let row = &self.swap_scores[a as usize];
        let mut lane_scores = [0i16; LANES];
        for (slot, &b) in lane_scores.iter_mut().zip(b_lanes.iter()) {
            *slot = row[b as usize];
        }
        i16x16::from(lane_scores)
    }

    /// Back-fill the dense table so every `(a, b)` cell holds exactly what
    /// [`Scoring::score`] returns, wildcard clamp included. Idempotent.
    pub fn fill_unset(&mut self) {
        if self.filled {
            return;
        }
        for a in 0..ALPHABET_SIZE as u8 {
            for b in 0..ALPHABET_SIZE as u8 {
                let score = self.score(a, b);
                self.swap_scores[a as usize][b as usize] = score;
            }
        }
        self.filled = true;
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Largest score any substitution can yield.
    pub fn max_substitution(&self) -> i16 {
        self.match_score
            .max(self.mismatch_score)
            .max(self.max_mutation)
    }

    /// Largest magnitude any single DP step can add or subtract; the 16-bit
    /// overflow guard multiplies this by the alignable length.
    pub fn max_abs_score(&self) -> i32 {
        let mut max_abs = i32::from(self.match_score.abs());
        max_abs = max_abs.max(i32::from(self.mismatch_score.abs()));
        max_abs = max_abs.max(i32::from(self.min_mutation.abs()));
        max_abs = max_abs.max(i32::from(self.max_mutation.abs()));
        max_abs = max_abs.max(i32::from(self.gap_open.abs()));
        max_abs = max_abs.max(i32::from(self.gap_extend.abs()));
        max_abs
    }
}

impl Default for Scoring {
    /// The `sw` command-line defaults.
    fn default() -> Self {
        Self::new(2, -2, -2, -1, false)
    }
}

#[inline]
fn pair_index(a: u8, b: u8) -> usize {
    a as usize * ALPHABET_SIZE + b as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_without_mutations() {
        let scoring = Scoring::default();
        let a = try_encode(b'A').unwrap();
        let c = try_encode(b'C').unwrap();
        assert_eq!(scoring.score(a, a), 2);
        assert_eq!(scoring.score(a, c), -2);
    }

    #[test]
    fn mutation_overrides_fallback() {
        let mut scoring = Scoring::default();
        scoring.add_mutation(b'A', b'G', 1).unwrap();
        let a = try_encode(b'A').unwrap();
        let g = try_encode(b'G').unwrap();
        assert_eq!(scoring.score(a, g), 1);
        // only the assigned direction changes
        assert_eq!(scoring.score(g, a), -2);
    }

    #[test]
    fn mutation_score_out_of_range() {
        let mut scoring = Scoring::default();
        let err = scoring.add_mutation(b'A', b'C', 200).unwrap_err();
        match err {
            SwError::ScoreOutOfRange { score, .. } => assert_eq!(score, 200),
            other => panic!("expected score out of range, got {other:?}"),
        }
        assert!(scoring.add_mutation(b'A', b'C', -128).is_err());
        assert!(scoring.add_mutation(b'A', b'C', 127).is_ok());
    }

    #[test]
    fn illegal_mutation_character() {
        let mut scoring = Scoring::default();
        assert!(matches!(
            scoring.add_mutation(b'#', b'A', 1),
            Err(SwError::IllegalCharacter { .. })
        ));
    }

    #[test]
    fn wildcard_pairs_never_positive() {
        let mut scoring = Scoring::default();
        let a = try_encode(b'A').unwrap();
        // match fallback on the wildcard diagonal is clamped to zero
        assert_eq!(scoring.score(WILDCARD_INDEX, WILDCARD_INDEX), 0);
        assert!(scoring.score(a, WILDCARD_INDEX) <= 0);
        assert!(scoring.score(WILDCARD_INDEX, a) <= 0);
        // even an explicitly assigned positive wildcard score is clamped
        scoring.add_mutation(b'*', b'A', 5).unwrap();
        assert_eq!(scoring.score(WILDCARD_INDEX, a), 0);
    }

    #[test]
    fn fill_unset_makes_table_dense() {
        let mut scoring = Scoring::default();
        scoring.add_mutation(b'A', b'G', 1).unwrap();
        scoring.fill_unset();
        assert!(scoring.is_filled());
        for a in 0..ALPHABET_SIZE as u8 {
            for b in 0..ALPHABET_SIZE as u8 {
                let lanes = [b; LANES];
                let gathered = scoring.lookup_lanes(a, &lanes).to_array();
                assert_eq!(gathered[0], scoring.score(a, b));
            }
        }
    }

    #[test]
    fn is_known_tracks_scheme() {
        let mut scoring = Scoring::default();
        let a = try_encode(b'A').unwrap();
        let n = try_encode(b'N').unwrap();
        assert!(scoring.is_known(a));
        assert!(scoring.is_known(n));
        scoring.use_match_mismatch = false;
        assert!(!scoring.is_known(n));
        scoring.add_mutation(b'A', b'A', 2).unwrap();
        assert!(scoring.is_known(a));
    }

    #[test]
    fn max_substitution_tracks_mutations() {
        let mut scoring = Scoring::default();
        assert_eq!(scoring.max_substitution(), 2);
        scoring.add_mutation(b'A', b'G', 5).unwrap();
        assert_eq!(scoring.max_substitution(), 5);
        assert!(scoring.max_abs_score() >= 5);
    }
}
