use crate::core::models::material::{Material, MaterialError};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct CrossSectionRecord {
    group: usize,
    etr: f64,
    es_tr: f64,
    er_tr: f64,
}

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Cross-section table '{path}' has no rows")]
    Empty { path: String },
    #[error("Row {row} of '{path}' is group {found}, expected group {expected}")]
    GroupOrder {
        path: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid cross sections in '{path}': {source}")]
    Material {
        path: String,
        source: MaterialError,
    },
}

/// Reads a multigroup material from a CSV table with header `group,etr,es_tr,er_tr`.
///
/// Groups are numbered from 1 and must appear in order without gaps.
pub fn load_material(path: &Path) -> Result<Material, TableLoadError> {
    let origin = path.to_string_lossy().to_string();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| TableLoadError::Csv {
            path: origin.clone(),
            source: e,
        })?;
    read_records(reader, origin)
}

/// Same as [`load_material`] for an already open source; `origin` only labels errors.
pub fn read_material<R: Read>(source: R, origin: &str) -> Result<Material, TableLoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    read_records(reader, origin.to_string())
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    path: String,
) -> Result<Material, TableLoadError> {
    let mut etr = Vec::new();
    let mut es_tr = Vec::new();
    let mut er_tr = Vec::new();

    for (row, result) in reader.deserialize::<CrossSectionRecord>().enumerate() {
        let record = result.map_err(|e| TableLoadError::Csv {
            path: path.clone(),
            source: e,
        })?;
        let expected = row + 1;
        if record.group != expected {
            return Err(TableLoadError::GroupOrder {
                path,
                row: expected,
                expected,
                found: record.group,
            });
        }
        etr.push(record.etr);
        es_tr.push(record.es_tr);
        er_tr.push(record.er_tr);
    }

    if etr.is_empty() {
        return Err(TableLoadError::Empty { path });
    }

    Material::new(etr, es_tr, er_tr).map_err(|e| TableLoadError::Material { path, source: e })
}
