use super::ids::MaterialId;
use super::library::MaterialLibrary;
use super::material::Material;
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Number of radii ({radii}) does not match the number of materials ({materials})")]
    RegionCountMismatch { radii: usize, materials: usize },
    #[error("A cell must have at least 2 regions, found {found}")]
    TooFewRegions { found: usize },
    #[error("Radius of region {region} must be finite and > 0, got {radius}")]
    NonPositiveRadius { region: usize, radius: f64 },
    #[error("Radii are not strictly increasing: region {region} has radius {radius} after {previous}")]
    UnsortedRadii {
        region: usize,
        previous: f64,
        radius: f64,
    },
    #[error("Material bound to region {region} is not present in the material library")]
    MissingMaterial { region: usize },
    #[error("Materials must have at least 1 energy group")]
    NoEnergyGroups,
    #[error("Material of region {region} has {found} energy groups, expected {expected}")]
    GroupCountMismatch {
        region: usize,
        expected: usize,
        found: usize,
    },
}

/// A read-only view of one annular region.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub index: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub volume: f64,
    pub material_id: MaterialId,
    pub material: &'a Material,
}

/// Concentric annular regions, each bound to a material borrowed from a [`MaterialLibrary`].
///
/// Region `i` spans `[R_{i-1}, R_i]` with `R_{-1} = 0`. "Volumes" are cross-sectional areas
/// per unit height.
#[derive(Debug, Clone)]
pub struct AnnularGeometry<'a> {
    radii: Vec<f64>,
    volumes: Vec<f64>,
    material_ids: Vec<MaterialId>,
    materials: Vec<&'a Material>,
    ngroups: usize,
}

impl<'a> AnnularGeometry<'a> {
    /// Validates radii and material bindings and derives the region volumes.
    ///
    /// # Arguments
    ///
    /// * `radii` - Outer radius of every region, innermost first.
    /// * `material_ids` - The material of every region, parallel to `radii`.
    /// * `library` - Storage the material IDs refer to.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigurationError`]. Nothing is
    /// constructed on failure.
    pub fn new(
        radii: &[f64],
        material_ids: &[MaterialId],
        library: &'a MaterialLibrary,
    ) -> Result<Self, ConfigurationError> {
        if radii.len() != material_ids.len() {
            return Err(ConfigurationError::RegionCountMismatch {
                radii: radii.len(),
                materials: material_ids.len(),
            });
        }

        if radii.len() < 2 {
            return Err(ConfigurationError::TooFewRegions { found: radii.len() });
        }

        for (region, &radius) in radii.iter().enumerate() {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigurationError::NonPositiveRadius { region, radius });
            }
        }

        for (region, pair) in radii.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigurationError::UnsortedRadii {
                    region: region + 1,
                    previous: pair[0],
                    radius: pair[1],
                });
            }
        }

        let materials = material_ids
            .iter()
            .enumerate()
            .map(|(region, &id)| {
                library
                    .get(id)
                    .ok_or(ConfigurationError::MissingMaterial { region })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ngroups = materials[0].ngroups();
        if ngroups == 0 {
            return Err(ConfigurationError::NoEnergyGroups);
        }

        for (region, material) in materials.iter().enumerate() {
            if material.ngroups() != ngroups {
                return Err(ConfigurationError::GroupCountMismatch {
                    region,
                    expected: ngroups,
                    found: material.ngroups(),
                });
            }
        }

        let volumes = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let mut volume = PI * r * r;
                if i != 0 {
                    volume -= PI * radii[i - 1] * radii[i - 1];
                }
                volume
            })
            .collect();

        Ok(Self {
            radii: radii.to_vec(),
            volumes,
            material_ids: material_ids.to_vec(),
            materials,
            ngroups,
        })
    }

    pub fn nregions(&self) -> usize {
        self.radii.len()
    }

    pub fn ngroups(&self) -> usize {
        self.ngroups
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn materials(&self) -> &[&'a Material] {
        &self.materials
    }

    pub fn material_ids(&self) -> &[MaterialId] {
        &self.material_ids
    }

    /// Outer radius of the whole cell.
    pub fn outer_radius(&self) -> f64 {
        self.radii[self.radii.len() - 1]
    }

    /// Perimeter of the outer boundary, `2πR`.
    pub fn outer_surface(&self) -> f64 {
        2.0 * PI * self.outer_radius()
    }

    /// Returns the region at `index`, or `None` if it is out of range.
    pub fn region(&self, index: usize) -> Option<Region<'a>> {
        if index >= self.nregions() {
            return None;
        }
        Some(Region {
            index,
            inner_radius: if index == 0 { 0.0 } else { self.radii[index - 1] },
            outer_radius: self.radii[index],
            volume: self.volumes[index],
            material_id: self.material_ids[index],
            material: self.materials[index],
        })
    }

    pub fn regions(&self) -> impl Iterator<Item = Region<'a>> + '_ {
        (0..self.nregions()).filter_map(move |i| self.region(i))
    }
}
