use crate::cli::SolveArgs;
use crate::config::merge_solver_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use cpcell::core::io::case::CaseDefinition;
use cpcell::engine::progress::ProgressReporter;
use cpcell::workflows::solve::{self, CaseReport};
use std::fmt::Write;
use tracing::info;

pub fn run(args: SolveArgs, show_progress: bool) -> Result<()> {
    info!("Loading case from {:?}", args.case);
    let mut case = CaseDefinition::load(&args.case)?;
    case.solver = merge_solver_config(case.solver, &args)?;

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = solve::run(&case, &reporter)?;
    print!("{}", render_report(&report, args.matrices));
    Ok(())
}

pub fn render_report(report: &CaseReport, matrices: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Case: {}", report.name);
    let _ = writeln!(out, "Outer surface: {:.6e}", report.outer_surface);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:>6}  {:>12}  {:>12}  {:>14}  {}",
        "Region", "Inner radius", "Outer radius", "Volume", "Material"
    );
    for region in &report.regions {
        let _ = writeln!(
            out,
            "{:>6}  {:>12.6}  {:>12.6}  {:>14.6e}  {}",
            region.index,
            region.inner_radius,
            region.outer_radius,
            region.volume,
            region.material.as_deref().unwrap_or("-")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:>6}  {:>22}  {:>16}  {:>11}",
        "Group", "Gamma", "Quadrature error", "Unconverged"
    );
    for group in report.solution.groups() {
        let _ = writeln!(
            out,
            "{:>6}  {:>22.15e}  {:>16.3e}  {:>11}",
            group.group, group.gamma, group.quadrature_error, group.unconverged_shells
        );
    }

    if matrices {
        for group in report.solution.groups() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Group {} P:", group.group);
            for row in group.probabilities.row_iter() {
                write_row(&mut out, row.iter());
            }
            let _ = writeln!(out, "Group {} X:", group.group);
            for row in group.x.row_iter() {
                write_row(&mut out, row.iter());
            }
            let _ = writeln!(out, "Group {} Y:", group.group);
            write_row(&mut out, group.y.iter());
        }
    }
    out
}

fn write_row<'a>(out: &mut String, values: impl Iterator<Item = &'a f64>) {
    for value in values {
        let _ = write!(out, "  {:>22.15e}", value);
    }
    let _ = writeln!(out);
}
