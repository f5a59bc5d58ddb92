//! # Workflows Module
//!
//! End-to-end procedures built on [`crate::core`] and [`crate::engine`].
//!
//! - **Solve Workflow** ([`solve`]) - Load a case file, build and solve the cell, and return
//!   a report of its regions and per-group results detached from the material library.

pub mod solve;
