use crate::cli::KernelArgs;
use crate::error::{CliError, Result};
use cpcell::core::math::bickley::{ki3, ki3_quad};
use cpcell::core::math::special::mexp;
use std::fmt::Write;
use tracing::info;

/// Largest table `kernel` will print.
pub const MAX_KERNEL_ROWS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelRow {
    pub tau: f64,
    pub mexp: f64,
    pub ki3: f64,
    pub ki3_quad: f64,
}

pub fn run(args: KernelArgs) -> Result<()> {
    let rows = tabulate(args.from, args.to, args.step)?;
    info!(rows = rows.len(), "Kernel table computed.");
    print!("{}", render(&rows));
    Ok(())
}

/// Evaluates the kernels at `from, from + step, ...` up to and including `to`.
pub fn tabulate(from: f64, to: f64, step: f64) -> Result<Vec<KernelRow>> {
    if !(from.is_finite() && to.is_finite() && step.is_finite()) {
        return Err(CliError::Argument(
            "--from, --to and --step must be finite".to_string(),
        ));
    }
    if from < 0.0 {
        return Err(CliError::Argument(format!(
            "optical depths are non-negative, got --from {}",
            from
        )));
    }
    if to < from {
        return Err(CliError::Argument(format!(
            "--to ({}) must not be smaller than --from ({})",
            to, from
        )));
    }
    if step <= 0.0 {
        return Err(CliError::Argument(format!("--step must be > 0, got {}", step)));
    }

    let intervals = ((to - from) / step + 1e-9).floor();
    if intervals >= MAX_KERNEL_ROWS as f64 {
        return Err(CliError::Argument(format!(
            "--from {} --to {} --step {} spans more than {} rows",
            from, to, step, MAX_KERNEL_ROWS
        )));
    }
    let count = intervals as usize + 1;
    Ok((0..count)
        .map(|n| {
            let tau = from + n as f64 * step;
            KernelRow {
                tau,
                mexp: mexp(tau),
                ki3: ki3(tau),
                ki3_quad: ki3_quad(tau),
            }
        })
        .collect())
}

pub fn render(rows: &[KernelRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>10}  {:>22}  {:>22}  {:>22}  {:>10}",
        "tau", "1-exp(-tau)", "Ki3 (table)", "Ki3 (quadrature)", "diff"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>10.4}  {:>22.15e}  {:>22.15e}  {:>22.15e}  {:>10.2e}",
            row.tau,
            row.mexp,
            row.ki3,
            row.ki3_quad,
            row.ki3 - row.ki3_quad
        );
    }
    out
}
