use crate::core::io::case::{CaseDefinition, CaseLoadError};
use crate::engine::cell::CylindricalCell;
use crate::engine::error::CellError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::CellSolution;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Failed to load case: {0}")]
    Load(#[from] CaseLoadError),
    #[error(transparent)]
    Cell(#[from] CellError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub index: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub volume: f64,
    /// Name the material was registered under, or `None` for anonymous records.
    pub material: Option<String>,
}

/// Geometry and results of a solved case, detached from the material library.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub outer_surface: f64,
    pub regions: Vec<RegionSummary>,
    pub solution: CellSolution,
}

/// Builds a cell from a resolved case and solves it with the case's solver settings.
#[instrument(skip_all, name = "solve_workflow", fields(case = %case.name))]
pub fn run(case: &CaseDefinition, reporter: &ProgressReporter) -> Result<CaseReport, CellError> {
    reporter.report(Progress::PhaseStart { name: "Setup" });
    let mut cell = CylindricalCell::new(&case.radii, &case.materials, &case.library)?
        .with_config(case.solver);

    let regions = cell
        .geometry()
        .regions()
        .map(|region| RegionSummary {
            index: region.index,
            inner_radius: region.inner_radius,
            outer_radius: region.outer_radius,
            volume: region.volume,
            material: case.library.name_of(region.material_id).map(str::to_string),
        })
        .collect();
    let outer_surface = cell.outer_surface();
    info!(
        regions = cell.nregions(),
        groups = cell.ngroups(),
        "Cell constructed."
    );
    reporter.report(Progress::PhaseFinish);

    cell.solve_with_reporter(reporter)?;

    let report = CaseReport {
        name: case.name.clone(),
        outer_surface,
        regions,
        solution: cell.into_solution()?,
    };
    info!(
        groups = report.solution.ngroups(),
        "Workflow complete."
    );
    Ok(report)
}

/// Loads the case file at `path` and runs it.
pub fn run_from_path(path: &Path, reporter: &ProgressReporter) -> Result<CaseReport, SolveError> {
    let case = CaseDefinition::load(path)?;
    Ok(run(&case, reporter)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::{ConfigurationError, NumericalError};
    use std::fs;
    use tempfile::tempdir;

    const TWO_GROUP_CASE: &str = r#"
        name = "pin"

        [materials.fuel]
        etr = [0.45, 0.9]
        es-tr = [0.35, 0.4]
        er-tr = [0.1, 0.5]

        [materials.water]
        etr = [0.6, 1.8]
        es-tr = [0.55, 1.75]
        er-tr = [0.05, 0.05]

        [[regions]]
        radius = 0.41
        material = "fuel"

        [[regions]]
        radius = 0.71
        material = "water"
    "#;

    fn write_case(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("case.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn run_from_path_reports_regions_and_every_group() {
        let (_dir, path) = write_case(TWO_GROUP_CASE);
        let report = run_from_path(&path, &ProgressReporter::new()).unwrap();

        assert_eq!(report.name, "pin");
        assert_eq!(report.regions.len(), 2);
        assert_eq!(report.regions[0].material.as_deref(), Some("fuel"));
        assert_eq!(report.regions[1].inner_radius, 0.41);
        assert_eq!(report.solution.ngroups(), 2);
        assert!(report.solution.gammas().iter().all(|g| g.is_finite()));
        assert!((report.outer_surface - 2.0 * std::f64::consts::PI * 0.71).abs() < 1e-12);
    }

    #[test]
    fn run_from_path_surfaces_load_errors() {
        let (_dir, path) = write_case("regions = 3");
        let result = run_from_path(&path, &ProgressReporter::new());
        assert!(matches!(result, Err(SolveError::Load(CaseLoadError::Toml { .. }))));
    }

    #[test]
    fn run_surfaces_geometry_errors() {
        let content = TWO_GROUP_CASE.replace("radius = 0.71", "radius = 0.3");
        let (_dir, path) = write_case(&content);
        let result = run_from_path(&path, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(SolveError::Cell(CellError::Configuration(
                ConfigurationError::UnsortedRadii { region: 1, .. }
            )))
        ));
    }

    #[test]
    fn run_uses_solver_settings_of_the_case() {
        let content = format!("{}\n[solver]\npivot-tolerance = 0.999999\n", TWO_GROUP_CASE);
        let (_dir, path) = write_case(&content);
        let result = run_from_path(&path, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(SolveError::Cell(CellError::Numerical(
                NumericalError::SingularResponseMatrix { group: 0, .. }
            )))
        ));
    }
}
