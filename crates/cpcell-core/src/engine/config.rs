use crate::core::math::quadrature::{AdaptiveConfig, QuadratureRule};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SolverConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How the radial integrals of the collision-probability matrix are evaluated.
///
/// With `adaptive: None` every shell integral is a single application of `rule`; the error
/// estimate is only reported. With `Some(..)` shells are bisected until the tolerance holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuadratureConfig {
    pub rule: QuadratureRule,
    pub adaptive: Option<AdaptiveConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub quadrature: QuadratureConfig,
    /// Relative size below which a QR pivot marks the response matrix as singular.
    pub pivot_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            quadrature: QuadratureConfig::default(),
            pivot_tolerance: 1e-12,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SolverConfigBuilder {
    rule: Option<QuadratureRule>,
    adaptive: Option<AdaptiveConfig>,
    fixed_order: bool,
    pivot_tolerance: Option<f64>,
}

impl From<SolverConfig> for SolverConfigBuilder {
    fn from(config: SolverConfig) -> Self {
        Self {
            rule: Some(config.quadrature.rule),
            adaptive: config.quadrature.adaptive,
            fixed_order: config.quadrature.adaptive.is_none(),
            pivot_tolerance: Some(config.pivot_tolerance),
        }
    }
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: QuadratureRule) -> Self {
        self.rule = Some(rule);
        self
    }
    pub fn adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.adaptive = Some(adaptive);
        self.fixed_order = false;
        self
    }
    pub fn fixed_order(mut self) -> Self {
        self.adaptive = None;
        self.fixed_order = true;
        self
    }
    pub fn pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<SolverConfig, SolverConfigError> {
        let defaults = SolverConfig::default();

        let pivot_tolerance = self.pivot_tolerance.unwrap_or(defaults.pivot_tolerance);
        if !(pivot_tolerance.is_finite() && pivot_tolerance >= 0.0 && pivot_tolerance < 1.0) {
            return Err(SolverConfigError::InvalidParameter {
                name: "pivot_tolerance",
                reason: format!("must lie in [0, 1), got {}", pivot_tolerance),
            });
        }

        let adaptive = if self.fixed_order { None } else { self.adaptive };
        if let Some(adaptive) = &adaptive {
            validate_adaptive(adaptive)?;
        }

        Ok(SolverConfig {
            quadrature: QuadratureConfig {
                rule: self.rule.unwrap_or(defaults.quadrature.rule),
                adaptive,
            },
            pivot_tolerance,
        })
    }
}

fn validate_adaptive(adaptive: &AdaptiveConfig) -> Result<(), SolverConfigError> {
    for (name, value) in [
        ("absolute_tolerance", adaptive.absolute_tolerance),
        ("relative_tolerance", adaptive.relative_tolerance),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(SolverConfigError::InvalidParameter {
                name,
                reason: format!("must be finite and >= 0, got {}", value),
            });
        }
    }
    if adaptive.absolute_tolerance == 0.0 && adaptive.relative_tolerance == 0.0 {
        return Err(SolverConfigError::InvalidParameter {
            name: "absolute_tolerance",
            reason: "at least one of the absolute and relative tolerances must be > 0".to_string(),
        });
    }
    if adaptive.max_subdivisions == 0 {
        return Err(SolverConfigError::InvalidParameter {
            name: "max_subdivisions",
            reason: "must be >= 1".to_string(),
        });
    }
    Ok(())
}
