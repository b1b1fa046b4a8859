use crate::error::{SwError, SwResult};
use crate::scoring::Scoring;

/// Alphabet indices span `[0, 31]`: letters map to 1..=26 regardless of case,
/// `*` occupies the reserved wildcard slot. Compressing 256 code points to 32
/// keeps the substitution table at 2 KiB so a row gather stays in L1.
pub const ALPHABET_SIZE: usize = 32;

/// Reserved index used for `*`, for characters outside the alphabet, and for
/// padding short database lanes up to the batch height.
pub const WILDCARD_INDEX: u8 = 31;

#[inline]
pub fn try_encode(c: u8) -> Option<u8> {
    match c {
        b'a'..=b'z' => Some(c - b'a' + 1),
        b'A'..=b'Z' => Some(c - b'A' + 1),
        b'*' => Some(WILDCARD_INDEX),
        _ => None,
    }
}

/// Database-side encoding: anything unmappable becomes the wildcard.
#[inline]
pub fn encode_or_wildcard(c: u8) -> u8 {
    try_encode(c).unwrap_or(WILDCARD_INDEX)
}

pub fn decode_index(idx: u8) -> Option<char> {
    match idx {
        1..=26 => Some((b'A' + idx - 1) as char),
        WILDCARD_INDEX => Some('*'),
        _ => None,
    }
}

/// Strict encoding; fails on the first character outside the alphabet.
pub fn encode_seq(seq: &[u8]) -> SwResult<Vec<u8>> {
    let mut codes = Vec::with_capacity(seq.len());
    for (pos, &c) in seq.iter().enumerate() {
        let idx = try_encode(c).ok_or(SwError::IllegalCharacter { ch: c as char, pos })?;
        codes.push(idx);
    }
    Ok(codes)
}

/// Query-side encoding: characters that do not encode, or that have no
/// diagonal entry under a matrix-only scoring scheme, degrade to the wildcard.
pub fn encode_query(seq: &[u8], scoring: &Scoring) -> Vec<u8> {
    seq.iter()
        .map(|&c| match try_encode(c) {
            Some(idx) if scoring.is_known(idx) => idx,
            _ => WILDCARD_INDEX,
        })
        .collect()
}
