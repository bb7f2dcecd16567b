//! Halton low-discrepancy sequence.

/// The `index`-th element (1-based) of the van der Corput sequence in `base`.
///
/// Returns a value in `[0, 1)`. Index 0 maps to 0.
#[must_use]
pub fn halton(index: u64, base: u64) -> f64 {
    let base = base.max(2);
    let inv = 1.0 / base as f64;
    let mut f = inv;
    let mut i = index;
    let mut value = 0.0;
    while i > 0 {
        value += f * (i % base) as f64;
        i /= base;
        f *= inv;
    }
    value
}

/// First `n` points of the two-dimensional Halton sequence (bases 2 and 3),
/// starting at index 1.
#[must_use]
pub fn halton_2d(n: usize) -> Vec<(f64, f64)> {
    (1..=n as u64).map(|i| (halton(i, 2), halton(i, 3))).collect()
}
