use super::quadrature::{AdaptiveConfig, GK21};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::LazyLock;

/// `Ki3(0) = π/4`.
pub const KI3_AT_ZERO: f64 = FRAC_PI_4;

const KI2_AT_ZERO: f64 = 1.0;

const TABLE_SPACING: f64 = 0.005;
const TABLE_MAX: f64 = 30.0;

const REFERENCE_QUADRATURE: AdaptiveConfig = AdaptiveConfig {
    absolute_tolerance: 0.0,
    relative_tolerance: 1e-12,
    max_subdivisions: 400,
};

/// Node values of `Ki3` and its derivative `-Ki2` on a uniform grid.
struct Ki3Table {
    values: Vec<f64>,
    slopes: Vec<f64>,
}

static KI3_TABLE: LazyLock<Ki3Table> = LazyLock::new(|| {
    let nodes = (TABLE_MAX / TABLE_SPACING).round() as usize + 1;
    let mut values = Vec::with_capacity(nodes);
    let mut slopes = Vec::with_capacity(nodes);

    values.push(KI3_AT_ZERO);
    slopes.push(-KI2_AT_ZERO);
    for n in 1..nodes {
        let x = n as f64 * TABLE_SPACING;
        values.push(ki_quad(3, x));
        slopes.push(-ki_quad(2, x));
    }

    tracing::debug!(nodes, spacing = TABLE_SPACING, "Tabulated Ki3 kernel.");
    Ki3Table { values, slopes }
});

/// Bickley-Naylor function of order `n` by direct quadrature:
/// `Ki_n(x) = ∫_0^{π/2} cos^{n-1}(θ) exp(-x / cos θ) dθ`.
///
/// Accurate to about twelve significant digits but far slower than [`ki3`]; use it as a
/// reference.
pub fn ki_quad(n: u32, x: f64) -> f64 {
    debug_assert!(x >= 0.0, "Bickley-Naylor argument must be non-negative, got {x}");
    let power = n.saturating_sub(1) as i32;
    let integrand = |theta: f64| {
        let c = theta.cos();
        c.powi(power) * (-x / c).exp()
    };
    GK21
        .integrate_adaptive(integrand, 0.0, FRAC_PI_2, &REFERENCE_QUADRATURE)
        .value
}

/// Third-order Bickley-Naylor function by direct quadrature.
pub fn ki3_quad(x: f64) -> f64 {
    if x == 0.0 {
        return KI3_AT_ZERO;
    }
    ki_quad(3, x)
}

/// Third-order Bickley-Naylor function, the chord attenuation kernel of a cylinder.
///
/// Evaluated by cubic Hermite interpolation in a table built once from [`ki_quad`]. Past
/// the end of the table the leading asymptotic behaviour `sqrt(1/x)·exp(-x)` is scaled to
/// the last node, so the result keeps decreasing and underflows to zero instead of
/// overflowing.
#[inline]
pub fn ki3(x: f64) -> f64 {
    debug_assert!(x >= 0.0, "Bickley-Naylor argument must be non-negative, got {x}");
    if x <= 0.0 {
        return KI3_AT_ZERO;
    }

    let table = &*KI3_TABLE;
    let last = table.values.len() - 1;
    let x_max = last as f64 * TABLE_SPACING;

    if x >= x_max {
        return table.values[last] * (x_max / x).sqrt() * (-(x - x_max)).exp();
    }

    let position = x / TABLE_SPACING;
    let n = (position.floor() as usize).min(last - 1);
    let t = position - n as f64;

    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * table.values[n]
        + h10 * TABLE_SPACING * table.slopes[n]
        + h01 * table.values[n + 1]
        + h11 * TABLE_SPACING * table.slopes[n + 1]
}
