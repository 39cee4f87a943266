//! Boundary Detector.
//!
//! Finds the water body inside a containing region from the historical
//! maximum water extent. Every connected component is vectorized at 30 m and
//! measured; components within `cutoff` of the largest one are kept. When the
//! region holds no historical water the detection is empty, which callers
//! report as "boundary not found".

use waterspread_backend::ImageryBackend;
use waterspread_core::config::{validate_cutoff, DEFAULT_BOUNDARY_CUTOFF};
use waterspread_core::models::{ExtentQuery, Roi, VectorFeature};
use waterspread_core::Result;
use waterspread_geo::to_hectares;

use crate::models::{BoundaryDetection, CandidateArea, AREA_PROPERTY};

pub struct BoundaryDetector<'a, B: ImageryBackend + ?Sized> {
    backend: &'a B,
    cutoff: f64,
}

impl<'a, B: ImageryBackend + ?Sized> BoundaryDetector<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend, cutoff: DEFAULT_BOUNDARY_CUTOFF }
    }

    /// Keep components whose area is at least `cutoff` times the largest
    pub fn with_cutoff(mut self, cutoff: f64) -> Result<Self> {
        self.cutoff = validate_cutoff(cutoff)?;
        Ok(self)
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub async fn detect(&self, region: &Roi) -> Result<BoundaryDetection> {
        tracing::info!(
            "Detecting tank boundary in {} via {} backend",
            region.name(),
            self.backend.name()
        );

        let query = ExtentQuery::historical(region.geometry());
        tracing::debug!(
            "Extent query: {} {} at {} m, max component size {}",
            query.dataset,
            query.band,
            query.vectorize.scale,
            query.components.max_size
        );

        let components = self.backend.extent_vectors(&query).await?;

        let mut measured = Vec::with_capacity(components.len());
        for feature in components {
            let area_ha = to_hectares(self.backend.area(&feature.geometry).await?);
            measured.push(feature.with_property(AREA_PROPERTY, area_ha));
        }
        measured.sort_by(|a, b| area_of(b).total_cmp(&area_of(a)));

        let detection = select(measured, self.cutoff);
        match detection.threshold_ha {
            Some(threshold) => tracing::info!(
                "Kept {} of {} component(s) with area >= {:.4} ha",
                detection.tank.len(),
                detection.candidates.len(),
                threshold
            ),
            None => tracing::warn!("No historical water found in {}", region.name()),
        }

        Ok(detection)
    }
}

fn area_of(feature: &VectorFeature) -> f64 {
    feature.property(AREA_PROPERTY).unwrap_or(0.0)
}

/// Apply the keep rule to measured components
fn select(measured: Vec<VectorFeature>, cutoff: f64) -> BoundaryDetection {
    let threshold_ha = measured.iter().map(area_of).reduce(f64::max).map(|max| max * cutoff);

    let mut candidates = Vec::with_capacity(measured.len());
    let mut tank = Vec::new();
    for feature in measured {
        let area_ha = area_of(&feature);
        let kept = threshold_ha.is_some_and(|t| area_ha >= t);
        candidates.push(CandidateArea { id: feature.id.clone(), area_ha, kept });
        if kept {
            tank.push(feature);
        }
    }

    BoundaryDetection { candidates, cutoff, threshold_ha, tank }
}
