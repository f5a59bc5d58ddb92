use crate::cli::SolveArgs;
use crate::error::{CliError, Result};
use cpcell::core::math::quadrature::AdaptiveConfig;
use cpcell::engine::config::{SolverConfig, SolverConfigBuilder};
use tracing::debug;

/// Applies command-line overrides on top of the solver settings read from the case file.
///
/// Any adaptive tolerance given on the command line switches adaptive quadrature on unless
/// `--fixed-order` is also given.
pub fn merge_solver_config(from_case: SolverConfig, args: &SolveArgs) -> Result<SolverConfig> {
    let mut builder = SolverConfigBuilder::from(from_case);

    if let Some(rule) = args.rule {
        builder = builder.rule(rule);
    }
    if let Some(tolerance) = args.pivot_tolerance {
        builder = builder.pivot_tolerance(tolerance);
    }

    let tolerance_overridden =
        args.abs_tol.is_some() || args.rel_tol.is_some() || args.max_subdivisions.is_some();

    if args.refinement.fixed_order {
        if tolerance_overridden {
            return Err(CliError::Argument(
                "adaptive tolerances cannot be combined with --fixed-order".to_string(),
            ));
        }
        builder = builder.fixed_order();
    } else if args.refinement.adaptive || tolerance_overridden {
        let base = from_case.quadrature.adaptive.unwrap_or_default();
        let adaptive = AdaptiveConfig {
            absolute_tolerance: args.abs_tol.unwrap_or(base.absolute_tolerance),
            relative_tolerance: args.rel_tol.unwrap_or(base.relative_tolerance),
            max_subdivisions: args.max_subdivisions.unwrap_or(base.max_subdivisions),
        };
        builder = builder.adaptive(adaptive);
    }

    let config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!("Final solver configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use cpcell::core::math::quadrature::QuadratureRule;

    fn solve_args(extra: &[&str]) -> SolveArgs {
        let mut args = vec!["cpcell", "solve", "--case", "pin.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Solve(args) => args,
            Commands::Kernel(_) => panic!("Expected 'solve' subcommand"),
        }
    }

    #[test]
    fn no_overrides_keep_case_settings() {
        let from_case = SolverConfigBuilder::new()
            .rule(QuadratureRule::Gk15)
            .pivot_tolerance(1e-9)
            .build()
            .unwrap();
        let merged = merge_solver_config(from_case, &solve_args(&[])).unwrap();
        assert_eq!(merged, from_case);
    }

    #[test]
    fn cli_values_override_case_values() {
        let merged = merge_solver_config(
            SolverConfig::default(),
            &solve_args(&["--rule", "gk15", "--pivot-tolerance", "1e-8"]),
        )
        .unwrap();
        assert_eq!(merged.quadrature.rule, QuadratureRule::Gk15);
        assert_eq!(merged.pivot_tolerance, 1e-8);
        assert!(merged.quadrature.adaptive.is_none());
    }

    #[test]
    fn tolerance_override_implies_adaptive_and_keeps_other_case_tolerances() {
        let from_case = SolverConfigBuilder::new()
            .adaptive(AdaptiveConfig {
                absolute_tolerance: 1e-9,
                relative_tolerance: 1e-7,
                max_subdivisions: 12,
            })
            .build()
            .unwrap();
        let merged = merge_solver_config(from_case, &solve_args(&["--rel-tol", "1e-11"])).unwrap();
        assert_eq!(
            merged.quadrature.adaptive,
            Some(AdaptiveConfig {
                absolute_tolerance: 1e-9,
                relative_tolerance: 1e-11,
                max_subdivisions: 12,
            })
        );
    }

    #[test]
    fn adaptive_flag_uses_default_tolerances() {
        let merged =
            merge_solver_config(SolverConfig::default(), &solve_args(&["--adaptive"])).unwrap();
        assert_eq!(merged.quadrature.adaptive, Some(AdaptiveConfig::default()));
    }

    #[test]
    fn fixed_order_disables_adaptive_case_setting() {
        let from_case = SolverConfigBuilder::new()
            .adaptive(AdaptiveConfig::default())
            .build()
            .unwrap();
        let merged = merge_solver_config(from_case, &solve_args(&["--fixed-order"])).unwrap();
        assert!(merged.quadrature.adaptive.is_none());
    }

    #[test]
    fn fixed_order_with_tolerances_is_rejected() {
        let result = merge_solver_config(
            SolverConfig::default(),
            &solve_args(&["--fixed-order", "--abs-tol", "1e-6"]),
        );
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn invalid_override_is_a_config_error() {
        let result = merge_solver_config(
            SolverConfig::default(),
            &solve_args(&["--max-subdivisions", "0"]),
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
