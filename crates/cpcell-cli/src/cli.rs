use clap::{Args, Parser, Subcommand};
use cpcell::core::math::quadrature::QuadratureRule;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cpcell CLI - Multigroup collision probability transport for one-dimensional annular cells.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to solve energy groups in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a cell described by a case file and print its response data.
    Solve(SolveArgs),
    /// Tabulate the attenuation kernels over a range of optical depths.
    Kernel(KernelArgs),
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Path to the case file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub case: PathBuf,

    // --- Quadrature Overrides ---
    /// Override the Gauss-Kronrod rule ('gk15' or 'gk21').
    #[arg(long, value_name = "RULE")]
    pub rule: Option<QuadratureRule>,

    #[command(flatten)]
    pub refinement: RefinementMode,

    /// Override the absolute tolerance of adaptive quadrature. Implies --adaptive.
    #[arg(long, value_name = "FLOAT")]
    pub abs_tol: Option<f64>,

    /// Override the relative tolerance of adaptive quadrature. Implies --adaptive.
    #[arg(long, value_name = "FLOAT")]
    pub rel_tol: Option<f64>,

    /// Override the subdivision budget of adaptive quadrature. Implies --adaptive.
    #[arg(long, value_name = "NUM")]
    pub max_subdivisions: Option<usize>,

    // --- Solver Overrides ---
    /// Override the relative pivot size below which a response matrix is singular.
    #[arg(long, value_name = "FLOAT")]
    pub pivot_tolerance: Option<f64>,

    // --- Output ---
    /// Also print the P, X and Y matrices of every group.
    #[arg(long)]
    pub matrices: bool,
}

#[derive(Args, Debug, Default, Clone, Copy)]
#[group(multiple = false)]
pub struct RefinementMode {
    /// Refine every shell integral adaptively until its error estimate meets the tolerance.
    #[arg(long)]
    pub adaptive: bool,

    /// Evaluate every shell integral with a single rule application.
    #[arg(long)]
    pub fixed_order: bool,
}

/// Arguments for the `kernel` subcommand.
#[derive(Args, Debug)]
pub struct KernelArgs {
    /// Smallest optical depth.
    #[arg(long, default_value_t = 0.0, value_name = "FLOAT")]
    pub from: f64,

    /// Largest optical depth.
    #[arg(long, default_value_t = 10.0, value_name = "FLOAT")]
    pub to: f64,

    /// Spacing between tabulated optical depths.
    #[arg(long, default_value_t = 0.5, value_name = "FLOAT")]
    pub step: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solve_with_global_options() {
        let cli = Cli::parse_from([
            "cpcell", "-vv", "-j", "4", "solve", "--case", "pin.toml", "--rule", "gk15",
            "--matrices",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        match cli.command {
            Commands::Solve(args) => {
                assert_eq!(args.case, PathBuf::from("pin.toml"));
                assert_eq!(args.rule, Some(QuadratureRule::Gk15));
                assert!(args.matrices);
                assert!(!args.refinement.adaptive);
            }
            Commands::Kernel(_) => panic!("Expected 'solve' subcommand"),
        }
    }

    #[test]
    fn adaptive_and_fixed_order_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "cpcell",
            "solve",
            "--case",
            "pin.toml",
            "--adaptive",
            "--fixed-order",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let result =
            Cli::try_parse_from(["cpcell", "solve", "--case", "pin.toml", "--rule", "gauss"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["cpcell", "-q", "-v", "kernel"]);
        assert!(result.is_err());
    }

    #[test]
    fn kernel_uses_default_range() {
        let cli = Cli::parse_from(["cpcell", "kernel"]);
        match cli.command {
            Commands::Kernel(args) => {
                assert_eq!(args.from, 0.0);
                assert_eq!(args.to, 10.0);
                assert_eq!(args.step, 0.5);
            }
            Commands::Solve(_) => panic!("Expected 'kernel' subcommand"),
        }
    }
}
