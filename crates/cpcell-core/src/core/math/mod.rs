//! # Math Module
//!
//! Numerical primitives of the collision-probability method.
//!
//! - [`special`] - `1 - exp(-x)` without cancellation
//! - [`bickley`] - The third-order Bickley-Naylor attenuation kernel `Ki3`
//! - [`quadrature`] - Gauss-Kronrod rules with an embedded error estimate and optional
//!   adaptive subdivision

pub mod bickley;
pub mod quadrature;
pub mod special;
