use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error(
        "Cross section vectors differ in length: etr has {etr}, es_tr has {es_tr}, er_tr has {er_tr}"
    )]
    LengthMismatch {
        etr: usize,
        es_tr: usize,
        er_tr: usize,
    },
    #[error("Transport cross section in group {group} must be finite and > 0, got {value}")]
    InvalidTransport { group: usize, value: f64 },
    #[error("{kind} cross section in group {group} must be finite and >= 0, got {value}")]
    InvalidCrossSection {
        kind: &'static str,
        group: usize,
        value: f64,
    },
}

/// Multigroup macroscopic cross sections of one material, in 1/cm.
///
/// Records are validated once on construction and are immutable afterwards, so any number
/// of cells may share a material without copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    etr: Vec<f64>,
    es_tr: Vec<f64>,
    er_tr: Vec<f64>,
}

impl Material {
    /// Builds a material from per-group transport, in-group scattering and removal cross
    /// sections.
    ///
    /// # Arguments
    ///
    /// * `etr` - Transport cross section per group. Every entry must be > 0.
    /// * `es_tr` - Transport-corrected in-group scattering cross section per group.
    /// * `er_tr` - Removal cross section per group.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError`] if the three vectors differ in length or hold an
    /// invalid value.
    pub fn new(etr: Vec<f64>, es_tr: Vec<f64>, er_tr: Vec<f64>) -> Result<Self, MaterialError> {
        if etr.len() != es_tr.len() || etr.len() != er_tr.len() {
            return Err(MaterialError::LengthMismatch {
                etr: etr.len(),
                es_tr: es_tr.len(),
                er_tr: er_tr.len(),
            });
        }

        for (group, &value) in etr.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(MaterialError::InvalidTransport { group, value });
            }
        }
        for (kind, values) in [("Scattering", &es_tr), ("Removal", &er_tr)] {
            for (group, &value) in values.iter().enumerate() {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(MaterialError::InvalidCrossSection { kind, group, value });
                }
            }
        }

        Ok(Self { etr, es_tr, er_tr })
    }

    pub fn ngroups(&self) -> usize {
        self.etr.len()
    }

    /// Transport cross section in group `g`.
    #[inline]
    pub fn etr(&self, g: usize) -> f64 {
        self.etr[g]
    }

    /// In-group transport-corrected scattering cross section in group `g`.
    #[inline]
    pub fn es_tr(&self, g: usize) -> f64 {
        self.es_tr[g]
    }

    /// Removal cross section in group `g`.
    #[inline]
    pub fn er_tr(&self, g: usize) -> f64 {
        self.er_tr[g]
    }

    /// Ratio of in-group scattering to transport in group `g`.
    #[inline]
    pub fn scattering_ratio(&self, g: usize) -> f64 {
        self.es_tr[g] / self.etr[g]
    }
}
