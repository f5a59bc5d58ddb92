/// Below this argument `mexp` switches from direct evaluation to its Taylor series.
pub const MEXP_SERIES_THRESHOLD: f64 = 1e-3;

/// Evaluates `1 - exp(-x)` without cancellation for small `x`.
#[inline]
pub fn mexp(x: f64) -> f64 {
    if x.abs() < MEXP_SERIES_THRESHOLD {
        // x - x^2/2 + x^3/6 - x^4/24 + x^5/120
        x * (1.0 - x * (0.5 - x * (1.0 / 6.0 - x * (1.0 / 24.0 - x / 120.0))))
    } else {
        -(-x).exp_m1()
    }
}
