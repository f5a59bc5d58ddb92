use super::config::QuadratureConfig;
use super::context::GroupContext;
use super::error::NumericalError;
use crate::core::math::bickley::ki3;
use crate::core::math::quadrature::QuadratureEstimate;
use nalgebra::DMatrix;
use tracing::{debug, warn};

/// Collision-probability matrix of one group and the quadrature diagnostics gathered while
/// building it.
#[derive(Debug, Clone)]
pub(crate) struct ProbabilityMatrix {
    pub matrix: DMatrix<f64>,
    pub max_quadrature_error: f64,
    pub unconverged_shells: usize,
}

/// A chord family: offsets `y` inside shell `k`, accumulated out to region `j`, with
/// regions up to `i` crossed on both sides of the midline.
#[derive(Debug, Clone, Copy)]
struct ChordFamily {
    k: usize,
    i: usize,
    j: usize,
}

/// Optical depths `(τ⁺, τ⁻)` of the chord at transverse offset `y`.
fn optical_depths(context: &GroupContext, family: ChordFamily, y: f64) -> (f64, f64) {
    let y2 = y * y;
    let mut tau_plus = 0.0;
    let mut tau_minus = 0.0;
    let mut x_previous = 0.0;

    for s in family.k..=family.j {
        let r = context.radii[s];
        let x = (r * r - y2).max(0.0).sqrt();
        let dtau = (x - x_previous) * context.etr[s];
        if s <= family.i {
            tau_plus += 2.0 * dtau;
        } else {
            tau_plus += dtau;
            tau_minus += dtau;
        }
        x_previous = x;
    }

    (tau_plus, tau_minus)
}

fn shell_integral(
    context: &GroupContext,
    quadrature: &QuadratureConfig,
    family: ChordFamily,
) -> QuadratureEstimate {
    let integrand = |y: f64| {
        let (tau_plus, tau_minus) = optical_depths(context, family, y);
        ki3(tau_plus) - ki3(tau_minus)
    };

    let a = context.inner_radius(family.k);
    let b = context.radii[family.k];
    let rule = quadrature.rule.kronrod();
    match &quadrature.adaptive {
        None => rule.integrate(integrand, a, b),
        Some(adaptive) => rule.integrate_adaptive(integrand, a, b, adaptive),
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ShellSum {
    value: f64,
    max_error: f64,
    unconverged: usize,
}

/// `S(i, j) = Σ_{k ≤ i} ∫_{R_{k-1}}^{R_k} [Ki3(τ⁺(y)) - Ki3(τ⁻(y))] dy` for `i ≤ j`.
fn s_ij(context: &GroupContext, quadrature: &QuadratureConfig, i: usize, j: usize) -> ShellSum {
    let (i, j) = if i > j { (j, i) } else { (i, j) };

    let mut sum = ShellSum::default();
    for k in 0..=i {
        let estimate = shell_integral(context, quadrature, ChordFamily { k, i, j });
        sum.value += estimate.value;
        sum.max_error = sum.max_error.max(estimate.error);
        if let Some(adaptive) = &quadrature.adaptive {
            if !estimate.within(adaptive) {
                sum.unconverged += 1;
            }
        }
    }
    sum
}

/// Builds the symmetric collision-probability matrix of `context.group`.
///
/// `P(i, j) = 2S(i,j) + 2S(i-1,j-1) - 2S(i-1,j) - 2S(i,j-1)`, with terms of negative index
/// dropped, plus `Etr_i V_i` on the diagonal.
pub(crate) fn build_probability_matrix(
    context: &GroupContext,
    quadrature: &QuadratureConfig,
) -> Result<ProbabilityMatrix, NumericalError> {
    let n = context.nregions();
    let group = context.group;

    let mut s = DMatrix::<f64>::zeros(n, n);
    let mut max_quadrature_error: f64 = 0.0;
    let mut unconverged_shells = 0;

    for j in 0..n {
        for i in 0..=j {
            let sum = s_ij(context, quadrature, i, j);
            s[(i, j)] = sum.value;
            if i != j {
                s[(j, i)] = sum.value;
            }
            max_quadrature_error = max_quadrature_error.max(sum.max_error);
            unconverged_shells += sum.unconverged;
        }
    }

    let mut p = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        for i in 0..=j {
            let mut value = 2.0 * s[(i, j)];
            if i > 0 && j > 0 {
                value += 2.0 * s[(i - 1, j - 1)];
            }
            if i > 0 {
                value -= 2.0 * s[(i - 1, j)];
            }
            if j > 0 {
                value -= 2.0 * s[(i, j - 1)];
            }
            if i == j {
                value += context.volumes[i] * context.etr[i];
            }

            p[(i, j)] = value;
            if i != j {
                p[(j, i)] = value;
            }
        }
    }

    verify_probability_matrix(&p, group)?;

    if unconverged_shells > 0 {
        warn!(
            group,
            unconverged_shells,
            max_quadrature_error,
            "Adaptive quadrature hit its subdivision budget before reaching tolerance."
        );
    }
    debug!(group, max_quadrature_error, "Collision probability matrix assembled.");

    Ok(ProbabilityMatrix {
        matrix: p,
        max_quadrature_error,
        unconverged_shells,
    })
}

fn verify_probability_matrix(p: &DMatrix<f64>, group: usize) -> Result<(), NumericalError> {
    let n = p.nrows();
    for i in 0..n {
        for j in 0..n {
            if !p[(i, j)].is_finite() {
                return Err(NumericalError::NonFiniteProbability {
                    group,
                    row: i,
                    col: j,
                });
            }
            if j > i && p[(i, j)].to_bits() != p[(j, i)].to_bits() {
                return Err(NumericalError::AsymmetricProbabilityMatrix {
                    group,
                    row: i,
                    col: j,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::quadrature::{AdaptiveConfig, QuadratureRule};
    use std::f64::consts::PI;

    fn volumes(radii: &[f64]) -> Vec<f64> {
        radii
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let inner = if i == 0 { 0.0 } else { radii[i - 1] };
                PI * (r * r - inner * inner)
            })
            .collect()
    }

    fn context<'g>(radii: &'g [f64], vols: &'g [f64], etr: &[f64]) -> GroupContext<'g> {
        GroupContext {
            group: 0,
            radii,
            volumes: vols,
            outer_surface: 2.0 * PI * radii[radii.len() - 1],
            etr: etr.to_vec(),
            es_tr: vec![0.0; etr.len()],
            er_tr: etr.to_vec(),
        }
    }

    fn tight_quadrature() -> QuadratureConfig {
        QuadratureConfig {
            rule: QuadratureRule::Gk21,
            adaptive: Some(AdaptiveConfig {
                absolute_tolerance: 1e-13,
                relative_tolerance: 1e-11,
                max_subdivisions: 200,
            }),
        }
    }

    #[test]
    fn optical_depths_through_centre_cross_inner_region_twice() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[0.5, 0.2]);

        let (plus, minus) = optical_depths(&ctx, ChordFamily { k: 0, i: 0, j: 0 }, 0.0);
        assert!((plus - 2.0 * 0.4 * 0.5).abs() < 1e-15);
        assert_eq!(minus, 0.0);

        let (plus, minus) = optical_depths(&ctx, ChordFamily { k: 0, i: 0, j: 1 }, 0.0);
        assert!((plus - (2.0 * 0.4 * 0.5 + 0.2 * 0.2)).abs() < 1e-15);
        assert!((minus - 0.2 * 0.2).abs() < 1e-15);
    }

    #[test]
    fn optical_depths_of_grazing_chord_start_in_its_own_shell() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[0.5, 0.2]);

        let y: f64 = 0.5;
        let (plus, minus) = optical_depths(&ctx, ChordFamily { k: 1, i: 1, j: 1 }, y);
        let half_chord = (0.36 - y * y).sqrt();
        assert!((plus - 2.0 * half_chord * 0.2).abs() < 1e-15);
        assert_eq!(minus, 0.0);
    }

    #[test]
    fn probability_matrix_is_exactly_symmetric() {
        let radii = [0.2, 0.35, 0.4, 0.6, 0.71];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[0.5, 0.45, 0.3, 0.2, 1.2]);
        let p = build_probability_matrix(&ctx, &QuadratureConfig::default())
            .unwrap()
            .matrix;

        for i in 0..radii.len() {
            for j in 0..radii.len() {
                assert_eq!(p[(i, j)].to_bits(), p[(j, i)].to_bits());
            }
        }
    }

    #[test]
    fn row_sums_do_not_exceed_total_collision_rate() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let etr = [0.5, 0.2];
        let ctx = context(&radii, &vols, &etr);
        let p = build_probability_matrix(&ctx, &tight_quadrature())
            .unwrap()
            .matrix;

        for i in 0..2 {
            let row: f64 = p.row(i).iter().sum();
            let total = etr[i] * vols[i];
            assert!(row > 0.0, "row {i} sum {row}");
            assert!(row <= total * (1.0 + 1e-9), "row {i} sum {row} > {total}");
        }
        assert!(p[(0, 1)] > 0.0);
    }

    #[test]
    fn self_collision_is_positive_and_bounded_by_transport_rate() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[0.5, 0.2]);
        let p = build_probability_matrix(&ctx, &QuadratureConfig::default())
            .unwrap()
            .matrix;

        assert!(p[(0, 0)] > 0.0);
        assert!(p[(0, 0)] <= 0.5 * vols[0]);
    }

    #[test]
    fn optically_thick_cell_keeps_most_collisions_in_birth_region() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[50.0, 50.0]);
        let p = build_probability_matrix(&ctx, &QuadratureConfig::default())
            .unwrap()
            .matrix;

        assert!(p[(0, 0)] / (50.0 * vols[0]) > 0.9);
    }

    #[test]
    fn splitting_a_uniform_region_preserves_its_collision_rate() {
        let etr = 0.8;
        let merged_radii = [0.4, 0.6];
        let merged_vols = volumes(&merged_radii);
        let merged = build_probability_matrix(
            &context(&merged_radii, &merged_vols, &[etr, etr]),
            &tight_quadrature(),
        )
        .unwrap()
        .matrix;

        let split_radii = [0.25, 0.4, 0.6];
        let split_vols = volumes(&split_radii);
        let split = build_probability_matrix(
            &context(&split_radii, &split_vols, &[etr, etr, etr]),
            &tight_quadrature(),
        )
        .unwrap()
        .matrix;

        let inner_block = split[(0, 0)] + split[(0, 1)] + split[(1, 0)] + split[(1, 1)];
        assert!((inner_block - merged[(0, 0)]).abs() < 1e-5 * merged[(0, 0)]);
        assert!((split[(2, 2)] - merged[(1, 1)]).abs() < 1e-5 * merged[(1, 1)]);
        assert!(((split[(0, 2)] + split[(1, 2)]) - merged[(0, 1)]).abs() < 1e-5 * merged[(0, 1)]);
    }

    #[test]
    fn fixed_order_and_adaptive_quadrature_agree_closely() {
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[0.5, 0.2]);
        let fixed = build_probability_matrix(&ctx, &QuadratureConfig::default()).unwrap();
        let adaptive = build_probability_matrix(&ctx, &tight_quadrature()).unwrap();

        assert_eq!(adaptive.unconverged_shells, 0);
        assert!(fixed.max_quadrature_error > 0.0);
        for i in 0..2 {
            for j in 0..2 {
                let scale = adaptive.matrix[(i, j)].abs().max(1e-3);
                assert!((fixed.matrix[(i, j)] - adaptive.matrix[(i, j)]).abs() < 1e-2 * scale);
            }
        }
    }

    #[test]
    fn s_ij_of_transparent_cell_vanishes() {
        // With vanishing cross sections every chord has zero optical depth.
        let radii = [0.4, 0.6];
        let vols = volumes(&radii);
        let ctx = context(&radii, &vols, &[1e-300, 1e-300]);
        let s = s_ij(&ctx, &QuadratureConfig::default(), 0, 1);
        assert!(s.value.abs() < 1e-12);
    }

    #[test]
    fn verify_rejects_non_finite_entries() {
        let mut p = DMatrix::<f64>::identity(2, 2);
        p[(1, 1)] = f64::NAN;
        assert_eq!(
            verify_probability_matrix(&p, 3),
            Err(NumericalError::NonFiniteProbability {
                group: 3,
                row: 1,
                col: 1
            })
        );
    }

    #[test]
    fn verify_rejects_asymmetric_matrix() {
        let mut p = DMatrix::<f64>::identity(2, 2);
        p[(0, 1)] = 0.1;
        assert!(matches!(
            verify_probability_matrix(&p, 0),
            Err(NumericalError::AsymmetricProbabilityMatrix { row: 0, col: 1, .. })
        ));
    }
}
