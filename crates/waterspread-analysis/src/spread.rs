//! Water-Spread Estimator.
//!
//! Area is measured on the vectorized mask as returned by the backend; the
//! reported outline is the dissolve of those same polygons. If the mask
//! cannot be vectorized or dissolved the outline degrades to the boundary
//! rings and the run continues. Other backend failures end the run.

use geo::MultiPolygon;
use waterspread_backend::ImageryBackend;
use waterspread_core::models::{CompositeQuery, DateRange, Roi, VectorFeature};
use waterspread_core::Result;
use waterspread_geo::{dissolve, round_to, to_hectares};

use crate::models::{SpreadOutline, WaterSpread};

pub struct WaterSpreadEstimator<'a, B: ImageryBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: ImageryBackend + ?Sized> WaterSpreadEstimator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn estimate(&self, boundary: &Roi, dates: DateRange) -> Result<WaterSpread> {
        if dates.is_reversed() {
            tracing::warn!("Date range {} ends before it starts; no imagery will match", dates);
        } else if dates.starts_before_floor() {
            tracing::warn!("Date range {} starts before imagery coverage (March 2016)", dates);
        }

        tracing::info!("Estimating water spread of {} for {}", boundary.name(), dates);

        let query = CompositeQuery::water_spread(boundary.geometry(), dates);
        tracing::debug!(
            "Composite query: {} {} > {} at {} m",
            query.collection,
            query.index.name,
            query.threshold,
            query.vectorize.scale
        );

        let vectors = match self.backend.composite_vectors(&query).await {
            Err(e) if !e.is_vectorization_failure() => return Err(e),
            result => result,
        };

        // A mask that failed to vectorize has no polygons and measures zero
        let features: &[VectorFeature] = vectors.as_deref().unwrap_or(&[]);
        let polygon_count = features.len();
        let area_ha = round_to(to_hectares(self.mask_area(features).await?), 2);

        let outline = match vectors.and_then(|features| dissolve(&features)) {
            Ok(dissolved) => SpreadOutline::Dissolved(dissolved),
            Err(e) => {
                tracing::warn!("Using the boundary of {} as the outline: {}", boundary.name(), e);
                SpreadOutline::Boundary(boundary.outline())
            }
        };

        tracing::info!("Water spread area: {} ha", area_ha);

        Ok(WaterSpread { dates, area_ha, polygon_count, outline })
    }

    /// Area in m² of all polygons as one geometry
    async fn mask_area(&self, features: &[VectorFeature]) -> Result<f64> {
        if features.is_empty() {
            return Ok(0.0);
        }
        let combined: MultiPolygon<f64> =
            features.iter().flat_map(|f| f.geometry.0.iter().cloned()).collect();
        self.backend.area(&combined).await
    }
}
