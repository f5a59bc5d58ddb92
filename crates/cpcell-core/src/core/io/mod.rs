//! Readers that turn files on disk into materials and cell definitions.
//!
//! - [`case`] - TOML case files: solver settings, materials and region bindings
//! - [`xs_table`] - CSV tables of multigroup cross sections

pub mod case;
pub mod xs_table;
