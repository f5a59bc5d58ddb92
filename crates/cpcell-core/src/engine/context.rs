use crate::core::models::geometry::AnnularGeometry;

/// Everything the per-group computations read, gathered once per group.
///
/// The context is immutable and owns its cross-section columns, so groups can be
/// processed on different threads with no shared mutable state.
#[derive(Debug, Clone)]
pub(crate) struct GroupContext<'g> {
    pub group: usize,
    pub radii: &'g [f64],
    pub volumes: &'g [f64],
    pub outer_surface: f64,
    pub etr: Vec<f64>,
    pub es_tr: Vec<f64>,
    pub er_tr: Vec<f64>,
}

impl<'g> GroupContext<'g> {
    pub fn gather(geometry: &'g AnnularGeometry<'_>, group: usize) -> Self {
        let materials = geometry.materials();
        Self {
            group,
            radii: geometry.radii(),
            volumes: geometry.volumes(),
            outer_surface: geometry.outer_surface(),
            etr: materials.iter().map(|m| m.etr(group)).collect(),
            es_tr: materials.iter().map(|m| m.es_tr(group)).collect(),
            er_tr: materials.iter().map(|m| m.er_tr(group)).collect(),
        }
    }

    pub fn nregions(&self) -> usize {
        self.radii.len()
    }

    /// `c_j = Es_tr_j / Etr_j`.
    #[inline]
    pub fn scattering_ratio(&self, region: usize) -> f64 {
        self.es_tr[region] / self.etr[region]
    }

    /// Inner radius of `region`, zero for the central region.
    #[inline]
    pub fn inner_radius(&self, region: usize) -> f64 {
        if region == 0 {
            0.0
        } else {
            self.radii[region - 1]
        }
    }
}
