//! # Core Module
//!
//! Stateless building blocks of the library: special functions and quadrature, the data
//! model of an annular cell, and input adapters for case files.
//!
//! ## Architecture
//!
//! - **Numerics** ([`math`]) - Special functions and Gauss-Kronrod integration
//! - **Cell Representation** ([`models`]) - Materials, the material arena, annular geometry
//! - **Input** ([`io`]) - TOML case files and CSV cross-section tables
//!
//! Nothing in this module holds mutable state across calls; the stateful solve lives in
//! [`crate::engine`].

pub mod io;
pub mod math;
pub mod models;
