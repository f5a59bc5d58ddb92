//! # cpcell
//!
//! Multigroup collision probability transport for one-dimensional cylindrical cells made of
//! concentric annular regions, such as a fuel pin surrounded by cladding and moderator rings.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless numerics (`mexp`, the Bickley-Naylor function
//!   `Ki3`, Gauss-Kronrod quadrature), the cell data model (`Material`, `MaterialLibrary`,
//!   `AnnularGeometry`), and readers for TOML case files and CSV cross-section tables.
//!
//! - **[`engine`]: The Logic Core.** The stateful `CylindricalCell`, which computes per-group
//!   collision probability matrices `P`, response matrices `X` and `Y`, and the cell
//!   blackness `Gamma` for an external flux solver.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that load a case, solve it and
//!   summarise the results.

pub mod core;
pub mod engine;
pub mod workflows;
