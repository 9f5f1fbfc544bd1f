//! Positional byte deinterleaving for the serial field.
//!
//! The serial is stored as 4-byte groups `BB AA xx xx` where the last two
//! bytes of every group are padding. Padding is not reliably zero and data
//! bytes can legitimately be zero, so bytes are selected purely by position.

/// Rebuild the true byte order of an interleaved field.
///
/// Keeps bytes at positions `i % 4 ∈ {0, 1}`, then swaps each adjacent pair
/// (`AABBCCDD` -> `BBAADDCC`). A trailing unpaired byte is kept in place.
pub fn deinterleave(data: &[u8]) -> Vec<u8> {
    let retained: Vec<u8> = data
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 4 < 2)
        .map(|(_, &b)| b)
        .collect();

    let mut out = Vec::with_capacity(retained.len());
    let mut pairs = retained.chunks_exact(2);
    for pair in &mut pairs {
        out.push(pair[1]);
        out.push(pair[0]);
    }
    out.extend_from_slice(pairs.remainder());
    out
}
