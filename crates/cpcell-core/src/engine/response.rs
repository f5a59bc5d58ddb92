use super::context::GroupContext;
use super::error::NumericalError;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Response of one energy group to internal and surface sources.
#[derive(Debug, Clone)]
pub(crate) struct GroupResponse {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub gamma: f64,
}

/// `M(i, j) = -c_j P(j, i) + δ_ij Etr_i V_i`.
fn assemble_response_matrix(context: &GroupContext, p: &DMatrix<f64>) -> DMatrix<f64> {
    let n = context.nregions();
    DMatrix::from_fn(n, n, |i, j| {
        let mut value = -context.scattering_ratio(j) * p[(j, i)];
        if i == j {
            value += context.etr[i] * context.volumes[i];
        }
        value
    })
}

/// Solves the `X` and `Y` systems of one group from a single QR factorization of `M`.
///
/// # Errors
///
/// Returns [`NumericalError::SingularResponseMatrix`] when the smallest `|R_ii|` is not
/// greater than `pivot_tolerance` times the largest, and
/// [`NumericalError::NonFiniteSolution`] when the solve produces NaN or infinity.
pub(crate) fn solve_response(
    context: &GroupContext,
    p: &DMatrix<f64>,
    pivot_tolerance: f64,
) -> Result<GroupResponse, NumericalError> {
    let n = context.nregions();
    let group = context.group;

    let m = assemble_response_matrix(context, p);
    let qr = m.qr();

    let pivots = qr.r().diagonal().map(f64::abs);
    let max_pivot = pivots.max();
    let min_pivot = pivots.min();
    let degenerate = !(min_pivot.is_finite() && max_pivot.is_finite())
        || max_pivot == 0.0
        || min_pivot <= pivot_tolerance * max_pivot;
    if degenerate {
        return Err(NumericalError::SingularResponseMatrix {
            group,
            min_pivot,
            max_pivot,
        });
    }
    debug!(group, min_pivot, max_pivot, "Response matrix factorized.");

    // Column k holds the source in region k.
    let x_rhs = DMatrix::from_fn(n, n, |i, k| p[(k, i)] / context.etr[k]);
    let scale = 4.0 / context.outer_surface;
    let y_rhs = DVector::from_fn(n, |i, _| {
        let row_sum: f64 = p.row(i).iter().sum();
        scale * (context.etr[i] * context.volumes[i] - row_sum)
    });

    let singular = || NumericalError::SingularResponseMatrix {
        group,
        min_pivot,
        max_pivot,
    };
    let x = qr.solve(&x_rhs).ok_or_else(singular)?;
    let y = qr.solve(&y_rhs).ok_or_else(singular)?;

    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(NumericalError::NonFiniteSolution { group });
    }

    let gamma = (0..n)
        .map(|i| context.er_tr[i] * context.volumes[i] * y[i])
        .sum::<f64>();
    if !gamma.is_finite() {
        return Err(NumericalError::NonFiniteSolution { group });
    }

    Ok(GroupResponse { x, y, gamma })
}
