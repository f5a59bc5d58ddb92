use nalgebra::{DMatrix, DVector};

/// Everything computed for one energy group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSolution {
    pub group: usize,
    /// Symmetric collision-probability matrix `P`.
    pub probabilities: DMatrix<f64>,
    /// Column `k` is the collision response to a unit isotropic source in region `k`.
    pub x: DMatrix<f64>,
    /// Collision response to a unit incoming surface current.
    pub y: DVector<f64>,
    /// Blackness of the whole cell.
    pub gamma: f64,
    /// Largest quadrature error estimate met while building `probabilities`.
    pub quadrature_error: f64,
    /// Shell integrals that exhausted the adaptive subdivision budget.
    pub unconverged_shells: usize,
}

/// Results of a successful solve, one entry per energy group in group order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSolution {
    groups: Vec<GroupSolution>,
}

impl CellSolution {
    pub(crate) fn new(groups: Vec<GroupSolution>) -> Self {
        Self { groups }
    }

    pub fn ngroups(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, group: usize) -> Option<&GroupSolution> {
        self.groups.get(group)
    }

    pub fn groups(&self) -> &[GroupSolution] {
        &self.groups
    }

    /// Blackness of every group.
    pub fn gammas(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.gamma).collect()
    }

    pub fn max_quadrature_error(&self) -> f64 {
        self.groups
            .iter()
            .map(|g| g.quadrature_error)
            .fold(0.0, f64::max)
    }

    pub fn unconverged_shells(&self) -> usize {
        self.groups.iter().map(|g| g.unconverged_shells).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellState {
    #[default]
    Unsolved,
    Solved(CellSolution),
}

impl CellState {
    pub fn is_solved(&self) -> bool {
        matches!(self, CellState::Solved(_))
    }

    pub fn solution(&self) -> Option<&CellSolution> {
        match self {
            CellState::Solved(solution) => Some(solution),
            CellState::Unsolved => None,
        }
    }
}
