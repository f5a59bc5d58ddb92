//! # Engine Module
//!
//! The stateful part of the library: a cylindrical cell that turns validated geometry and
//! multigroup cross sections into collision probabilities, response matrices and blackness.
//!
//! ## Overview
//!
//! [`cell::CylindricalCell`] owns the solve. For every energy group it gathers an immutable
//! per-group context, builds the symmetric collision-probability matrix from Bickley-Naylor
//! chord integrals, then factorizes the response system once and solves it for all
//! right-hand sides. Groups never share mutable data and run in parallel under the
//! `parallel` feature.
//!
//! ## Architecture
//!
//! - **Cell** ([`cell`]) - Construction, `solve()` and result accessors
//! - **Configuration** ([`config`]) - Quadrature rule, adaptive tolerances, pivot tolerance
//! - **State Tracking** ([`state`]) - Unsolved/Solved state and per-group results
//! - **Progress Monitoring** ([`progress`]) - Phase and per-group progress callbacks
//! - **Error Handling** ([`error`]) - Configuration, numerical and usage errors
//!
//! ## Key Capabilities
//!
//! - **Exact symmetry** of every collision probability matrix, verified after assembly
//! - **Single factorization** per group reused for the `X` and `Y` systems
//! - **Deterministic errors** under parallel execution: the lowest failing group is reported
//! - **No partial results**: a failed solve leaves the cell unsolved

pub mod cell;
pub(crate) mod collision;
pub mod config;
pub(crate) mod context;
pub mod error;
pub mod progress;
pub(crate) mod response;
pub mod state;
