use thiserror::Error;

pub use crate::core::models::geometry::ConfigurationError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericalError {
    #[error(
        "Response matrix of group {group} is singular or numerically degenerate (smallest pivot {min_pivot:e}, largest {max_pivot:e})"
    )]
    SingularResponseMatrix {
        group: usize,
        min_pivot: f64,
        max_pivot: f64,
    },

    #[error("Collision probability P({row}, {col}) of group {group} is not finite")]
    NonFiniteProbability { group: usize, row: usize, col: usize },

    #[error("Collision probability matrix of group {group} is not symmetric at ({row}, {col})")]
    AsymmetricProbabilityMatrix { group: usize, row: usize, col: usize },

    #[error("Response solution of group {group} is not finite")]
    NonFiniteSolution { group: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Cell results were requested before a successful solve()")]
    NotSolved,

    #[error("Group {group} is out of range for a cell with {ngroups} groups")]
    GroupOutOfRange { group: usize, ngroups: usize },

    #[error("Region {region} is out of range for a cell with {nregions} regions")]
    RegionOutOfRange { region: usize, nregions: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Numerical error: {0}")]
    Numerical(#[from] NumericalError),

    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),
}
