use serde::{Deserialize, Serialize};
use waterspread_backend::ImageryBackend;
use waterspread_core::config::DEFAULT_BOUNDARY_CUTOFF;
use waterspread_core::models::{DateRange, Roi};
use waterspread_core::{Result, WaterspreadError};
use waterspread_geo::{centroid, round_to, to_hectares};

use crate::boundary::BoundaryDetector;
use crate::models::{RunOutcome, RunReport, TankSummary};
use crate::spread::WaterSpreadEstimator;

/// What the uploaded geometry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundarySource {
    /// The geometry is the tank boundary itself
    Declared,
    /// The geometry contains the tank; detect the boundary first
    Detect,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub roi: Roi,
    pub boundary: BoundarySource,
    pub dates: DateRange,
}

/// Boundary resolution, tank summary and water-spread estimation in sequence
pub struct RunPipeline<'a, B: ImageryBackend + ?Sized> {
    backend: &'a B,
    cutoff: f64,
}

impl<'a, B: ImageryBackend + ?Sized> RunPipeline<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend, cutoff: DEFAULT_BOUNDARY_CUTOFF }
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let (tank, detection) = match request.boundary {
            BoundarySource::Declared => (request.roi.clone(), None),
            BoundarySource::Detect => {
                let detector = BoundaryDetector::new(self.backend).with_cutoff(self.cutoff)?;
                let detection = detector.detect(&request.roi).await?;
                match detection.tank_roi(&format!("{} (detected)", request.roi.name()))? {
                    Some(tank) => (tank, Some(detection)),
                    None => {
                        tracing::warn!("Boundary not found in {}", request.roi.name());
                        return Ok(RunOutcome::BoundaryNotFound(detection));
                    }
                }
            }
        };

        let summary = tank_summary(self.backend, &tank).await?;
        let spread = WaterSpreadEstimator::new(self.backend).estimate(&tank, request.dates).await?;

        Ok(RunOutcome::Estimated(Box::new(RunReport { tank, summary, spread, detection })))
    }
}

/// Area of the whole tank and centroid of its first feature
pub async fn tank_summary<B: ImageryBackend + ?Sized>(
    backend: &B,
    tank: &Roi,
) -> Result<TankSummary> {
    let area_ha = round_to(to_hectares(backend.area(&tank.geometry()).await?), 2);

    let center = centroid(tank.first_part()).ok_or_else(|| WaterspreadError::InvalidGeometry {
        feature_id: tank.name().to_string(),
        reason: "Tank has no centroid".to_string(),
    })?;

    let summary = TankSummary {
        area_ha,
        centroid_lat: round_to(center.y(), 2),
        centroid_lon: round_to(center.x(), 2),
    };
    tracing::info!(
        "Tank {}: {} ha, centroid ({}, {})",
        tank.name(),
        summary.area_ha,
        summary.centroid_lat,
        summary.centroid_lon
    );

    Ok(summary)
}
