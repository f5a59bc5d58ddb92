use super::xs_table::{self, TableLoadError};
use crate::core::math::quadrature::{AdaptiveConfig, QuadratureRule};
use crate::core::models::ids::MaterialId;
use crate::core::models::library::MaterialLibrary;
use crate::core::models::material::{Material, MaterialError};
use crate::engine::config::{SolverConfig, SolverConfigBuilder, SolverConfigError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaseLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Table(#[from] TableLoadError),
    #[error("Invalid cross sections for material '{name}': {source}")]
    Material {
        name: String,
        source: MaterialError,
    },
    #[error("Region {region} refers to unknown material '{name}'")]
    UnknownMaterial { region: usize, name: String },
    #[error("Invalid solver settings: {0}")]
    Solver(#[from] SolverConfigError),
}

/// Raw contents of a case file, as written on disk.
///
/// ```toml
/// name = "pin"
///
/// [solver]
/// quadrature-rule = "gk21"
///
/// [materials.fuel]
/// etr = [0.5]
/// es-tr = [0.0]
/// er-tr = [0.5]
///
/// [materials.water]
/// path = "water.csv"
///
/// [[regions]]
/// radius = 0.4
/// material = "fuel"
///
/// [[regions]]
/// radius = 0.6
/// material = "water"
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CaseFile {
    pub name: Option<String>,
    #[serde(default)]
    pub solver: SolverSection,
    pub materials: BTreeMap<String, MaterialSource>,
    pub regions: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SolverSection {
    pub quadrature_rule: Option<QuadratureRule>,
    pub pivot_tolerance: Option<f64>,
    pub adaptive: Option<AdaptiveSection>,
}

/// Adaptive quadrature settings; omitted keys keep their defaults.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AdaptiveSection {
    pub absolute_tolerance: Option<f64>,
    pub relative_tolerance: Option<f64>,
    pub max_subdivisions: Option<usize>,
}

impl AdaptiveSection {
    pub fn to_config(&self) -> AdaptiveConfig {
        let defaults = AdaptiveConfig::default();
        AdaptiveConfig {
            absolute_tolerance: self.absolute_tolerance.unwrap_or(defaults.absolute_tolerance),
            relative_tolerance: self.relative_tolerance.unwrap_or(defaults.relative_tolerance),
            max_subdivisions: self.max_subdivisions.unwrap_or(defaults.max_subdivisions),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MaterialSource {
    Table(TableSource),
    Inline(InlineMaterial),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableSource {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct InlineMaterial {
    pub etr: Vec<f64>,
    pub es_tr: Vec<f64>,
    pub er_tr: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegionEntry {
    pub radius: f64,
    pub material: String,
}

/// A case with its materials loaded and its region bindings resolved.
///
/// Geometry is not validated here; that happens when a cell is built from it.
#[derive(Debug)]
pub struct CaseDefinition {
    pub name: String,
    pub library: MaterialLibrary,
    pub radii: Vec<f64>,
    pub materials: Vec<MaterialId>,
    pub solver: SolverConfig,
}

impl FromStr for CaseFile {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl CaseFile {
    pub fn load(path: &Path) -> Result<Self, CaseLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| CaseLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        content.parse().map_err(|e| CaseLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Loads every material and binds regions to them.
    ///
    /// Relative table paths are resolved against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Result<CaseDefinition, CaseLoadError> {
        let mut library = MaterialLibrary::new();
        for (name, source) in &self.materials {
            let material = match source {
                MaterialSource::Table(table) => {
                    xs_table::load_material(&resolve_path(base_dir, &table.path))?
                }
                MaterialSource::Inline(inline) => Material::new(
                    inline.etr.clone(),
                    inline.es_tr.clone(),
                    inline.er_tr.clone(),
                )
                .map_err(|e| CaseLoadError::Material {
                    name: name.clone(),
                    source: e,
                })?,
            };
            library.add_named(name, material);
        }

        let materials = self
            .regions
            .iter()
            .enumerate()
            .map(|(region, entry)| {
                library
                    .find_by_name(&entry.material)
                    .ok_or_else(|| CaseLoadError::UnknownMaterial {
                        region,
                        name: entry.material.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CaseDefinition {
            name: self.name.clone().unwrap_or_else(|| "unnamed".to_string()),
            library,
            radii: self.regions.iter().map(|r| r.radius).collect(),
            materials,
            solver: self.solver.to_builder().build()?,
        })
    }
}

impl SolverSection {
    pub fn to_builder(&self) -> SolverConfigBuilder {
        let mut builder = SolverConfigBuilder::new();
        if let Some(rule) = self.quadrature_rule {
            builder = builder.rule(rule);
        }
        if let Some(tolerance) = self.pivot_tolerance {
            builder = builder.pivot_tolerance(tolerance);
        }
        if let Some(adaptive) = &self.adaptive {
            builder = builder.adaptive(adaptive.to_config());
        }
        builder
    }
}

impl CaseDefinition {
    /// Reads and resolves the case file at `path`.
    ///
    /// A case without a `name` is named after the file stem.
    pub fn load(path: &Path) -> Result<Self, CaseLoadError> {
        let file = CaseFile::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut definition = file.resolve(base_dir)?;
        if file.name.is_none() {
            if let Some(stem) = path.file_stem() {
                definition.name = stem.to_string_lossy().to_string();
            }
        }
        Ok(definition)
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
