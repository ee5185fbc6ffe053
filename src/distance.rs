//! Normalization and cosine similarity scoring.
//!
//! Every strategy ranks by the dot product of L2-normalized vectors, which is
//! their cosine similarity. `score` does not normalize; callers normalize both
//! sides up front.

/// Number of independent partial sums in the dot product accumulator.
const LANES: usize = 8;

/// Compute the L2 norm (magnitude) of a vector
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalize a vector to unit length in place.
///
/// A vector whose norm is exactly zero is left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = norm(v);
    if norm == 0.0 {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Dot product of two equal-length vectors.
///
/// Accumulates into `LANES` independent partial sums so the loop vectorizes;
/// the result can differ from a strictly sequential sum in the last bits.
#[inline]
pub fn score(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector length mismatch");

    let mut acc = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();

    for (ca, cb) in a_chunks.zip(b_chunks) {
        for ((sum, x), y) in acc.iter_mut().zip(ca).zip(cb) {
            *sum += x * y;
        }
    }

    acc.iter().sum::<f32>() + tail
}
