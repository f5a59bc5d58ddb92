use super::collision::{self, ProbabilityMatrix};
use super::config::SolverConfig;
use super::context::GroupContext;
use super::error::{CellError, NumericalError, UsageError};
use super::progress::{Progress, ProgressReporter};
use super::response::{self, GroupResponse};
use super::state::{CellSolution, CellState, GroupSolution};
use crate::core::models::geometry::AnnularGeometry;
use crate::core::models::ids::MaterialId;
use crate::core::models::library::MaterialLibrary;
use crate::core::models::material::Material;
use nalgebra::DMatrix;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A one-dimensional cylindrical cell solved with the collision probability method.
///
/// The cell borrows its materials from a caller-owned [`MaterialLibrary`] for its whole
/// lifetime. Construction validates the geometry; [`solve`](Self::solve) computes the
/// collision probability matrices, the response matrices and the blackness of every
/// energy group, always from scratch.
///
/// # Examples
///
/// ```
/// use cpcell::core::models::library::MaterialLibrary;
/// use cpcell::core::models::material::Material;
/// use cpcell::engine::cell::CylindricalCell;
///
/// let mut library = MaterialLibrary::new();
/// let fuel = library.add(Material::new(vec![0.5], vec![0.0], vec![0.5]).unwrap());
/// let water = library.add(Material::new(vec![0.2], vec![0.0], vec![0.2]).unwrap());
///
/// let mut cell = CylindricalCell::new(&[0.4, 0.6], &[fuel, water], &library).unwrap();
/// cell.solve().unwrap();
/// assert!(cell.gamma(0).unwrap().is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct CylindricalCell<'a> {
    geometry: AnnularGeometry<'a>,
    config: SolverConfig,
    state: CellState,
}

impl<'a> CylindricalCell<'a> {
    /// Builds an unsolved cell with the default solver settings.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::Configuration`] if the radii or material bindings are invalid.
    pub fn new(
        radii: &[f64],
        material_ids: &[MaterialId],
        library: &'a MaterialLibrary,
    ) -> Result<Self, CellError> {
        let geometry = AnnularGeometry::new(radii, material_ids, library)?;
        Ok(Self::from_geometry(geometry))
    }

    pub fn from_geometry(geometry: AnnularGeometry<'a>) -> Self {
        Self {
            geometry,
            config: SolverConfig::default(),
            state: CellState::Unsolved,
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the solver settings. Earlier results are discarded.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
        self.state = CellState::Unsolved;
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn geometry(&self) -> &AnnularGeometry<'a> {
        &self.geometry
    }

    pub fn solve(&mut self) -> Result<(), CellError> {
        self.solve_with_reporter(&ProgressReporter::new())
    }

    /// Computes `P`, `X`, `Y` and `Gamma` for every group.
    ///
    /// All groups' probability matrices are built first, then all response systems are
    /// solved. Groups are independent and run in parallel under the `parallel` feature. If
    /// any group fails, the error of the lowest failing group is returned and the cell is
    /// left unsolved.
    #[instrument(skip_all, name = "cell_solve", fields(regions = self.nregions(), groups = self.ngroups()))]
    pub fn solve_with_reporter(&mut self, reporter: &ProgressReporter) -> Result<(), CellError> {
        self.state = CellState::Unsolved;
        info!("Solving cylindrical cell.");

        let contexts: Vec<GroupContext> = (0..self.geometry.ngroups())
            .map(|group| GroupContext::gather(&self.geometry, group))
            .collect();

        let probabilities = build_probabilities(&contexts, &self.config, reporter)?;
        let responses = solve_responses(&contexts, &probabilities, &self.config, reporter)?;

        let groups: Vec<GroupSolution> = probabilities
            .into_iter()
            .zip(responses)
            .enumerate()
            .map(|(group, (probability, response))| GroupSolution {
                group,
                probabilities: probability.matrix,
                x: response.x,
                y: response.y,
                gamma: response.gamma,
                quadrature_error: probability.max_quadrature_error,
                unconverged_shells: probability.unconverged_shells,
            })
            .collect();

        let solution = CellSolution::new(groups);
        info!(
            max_quadrature_error = solution.max_quadrature_error(),
            unconverged_shells = solution.unconverged_shells(),
            "Cell solved."
        );
        self.state = CellState::Solved(solution);
        Ok(())
    }

    pub fn nregions(&self) -> usize {
        self.geometry.nregions()
    }

    pub fn ngroups(&self) -> usize {
        self.geometry.ngroups()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    /// Outer radius of `region`.
    pub fn radius(&self, region: usize) -> Result<f64, CellError> {
        self.check_region(region)?;
        Ok(self.geometry.radii()[region])
    }

    pub fn volume(&self, region: usize) -> Result<f64, CellError> {
        self.check_region(region)?;
        Ok(self.geometry.volumes()[region])
    }

    pub fn material(&self, region: usize) -> Result<&'a Material, CellError> {
        self.check_region(region)?;
        Ok(self.geometry.materials()[region])
    }

    pub fn outer_surface(&self) -> f64 {
        self.geometry.outer_surface()
    }

    pub fn p(&self, group: usize, i: usize, j: usize) -> Result<f64, CellError> {
        let solution = self.group_solution(group)?;
        self.check_region(i)?;
        self.check_region(j)?;
        Ok(solution.probabilities[(i, j)])
    }

    /// Response in region `i` to a unit source in region `k`.
    pub fn x(&self, group: usize, i: usize, k: usize) -> Result<f64, CellError> {
        let solution = self.group_solution(group)?;
        self.check_region(i)?;
        self.check_region(k)?;
        Ok(solution.x[(i, k)])
    }

    pub fn y(&self, group: usize, i: usize) -> Result<f64, CellError> {
        let solution = self.group_solution(group)?;
        self.check_region(i)?;
        Ok(solution.y[i])
    }

    pub fn gamma(&self, group: usize) -> Result<f64, CellError> {
        Ok(self.group_solution(group)?.gamma)
    }

    pub fn probability_matrix(&self, group: usize) -> Result<&DMatrix<f64>, CellError> {
        Ok(&self.group_solution(group)?.probabilities)
    }

    pub fn solution(&self) -> Result<&CellSolution, CellError> {
        self.state
            .solution()
            .ok_or(CellError::Usage(UsageError::NotSolved))
    }

    /// Consumes the cell, releasing the library borrow and keeping only the results.
    pub fn into_solution(self) -> Result<CellSolution, CellError> {
        match self.state {
            CellState::Solved(solution) => Ok(solution),
            CellState::Unsolved => Err(UsageError::NotSolved.into()),
        }
    }

    fn group_solution(&self, group: usize) -> Result<&GroupSolution, UsageError> {
        let solution = self.state.solution().ok_or(UsageError::NotSolved)?;
        solution.group(group).ok_or(UsageError::GroupOutOfRange {
            group,
            ngroups: solution.ngroups(),
        })
    }

    fn check_region(&self, region: usize) -> Result<(), UsageError> {
        if region < self.nregions() {
            Ok(())
        } else {
            Err(UsageError::RegionOutOfRange {
                region,
                nregions: self.nregions(),
            })
        }
    }
}

#[instrument(skip_all, name = "collision_probabilities")]
fn build_probabilities(
    contexts: &[GroupContext],
    config: &SolverConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<ProbabilityMatrix>, NumericalError> {
    reporter.report(Progress::PhaseStart {
        name: "Collision Probabilities",
    });
    reporter.report(Progress::TaskStart {
        total_steps: contexts.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = contexts.iter();

    #[cfg(feature = "parallel")]
    let iterator = contexts.par_iter();

    let results: Vec<Result<ProbabilityMatrix, NumericalError>> = iterator
        .map(|context| {
            let result = collision::build_probability_matrix(context, &config.quadrature);
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let matrices = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    info!(groups = matrices.len(), "Collision probability matrices built.");
    reporter.report(Progress::PhaseFinish);
    Ok(matrices)
}

#[instrument(skip_all, name = "response_matrices")]
fn solve_responses(
    contexts: &[GroupContext],
    probabilities: &[ProbabilityMatrix],
    config: &SolverConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<GroupResponse>, NumericalError> {
    reporter.report(Progress::PhaseStart {
        name: "Response Matrices",
    });
    reporter.report(Progress::TaskStart {
        total_steps: contexts.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = contexts.iter().zip(probabilities.iter());

    #[cfg(feature = "parallel")]
    let iterator = contexts.par_iter().zip(probabilities.par_iter());

    let results: Vec<Result<GroupResponse, NumericalError>> = iterator
        .map(|(context, probability)| {
            let result =
                response::solve_response(context, &probability.matrix, config.pivot_tolerance);
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let responses = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    info!(groups = responses.len(), "Response matrices solved.");
    reporter.report(Progress::PhaseFinish);
    Ok(responses)
}
