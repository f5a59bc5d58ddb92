//! # Core Models Module
//!
//! Data structures describing a one-dimensional cylindrical cell: the multigroup material
//! records, the arena that owns them, and the validated annular geometry that binds
//! regions to materials.
//!
//! ## Key Components
//!
//! - [`material`] - Immutable multigroup cross sections of a single material
//! - [`library`] - Caller-owned arena of materials addressed by [`ids::MaterialId`]
//! - [`geometry`] - Validated concentric regions, their volumes and material bindings
//! - [`ids`] - Key types for the arena
//!
//! ## Usage
//!
//! ```ignore
//! use cpcell::core::models::{geometry::AnnularGeometry, library::MaterialLibrary, material::Material};
//!
//! let mut library = MaterialLibrary::new();
//! let fuel = library.add_named("fuel", Material::new(vec![0.5], vec![0.0], vec![0.5])?);
//! let water = library.add_named("water", Material::new(vec![0.2], vec![0.0], vec![0.2])?);
//!
//! let geometry = AnnularGeometry::new(&[0.4, 0.6], &[fuel, water], &library)?;
//! assert_eq!(geometry.nregions(), 2);
//! ```

pub mod geometry;
pub mod ids;
pub mod library;
pub mod material;
