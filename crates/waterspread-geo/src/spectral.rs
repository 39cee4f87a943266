//! Multispectral scenes, cloud masking, and index compositing

use chrono::NaiveDate;
use geo::{Intersects, MultiPolygon};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::grid::SamplingGrid;
use crate::raster::{GridTransform, Raster};
use waterspread_core::models::{CloudMask, DateRange, SpectralIndex};
use waterspread_core::{Result, WaterspreadError};

/// One acquisition: co-registered bands sharing a single georeference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub acquired: NaiveDate,
    pub transform: GridTransform,
    pub bands: HashMap<String, Array2<f32>>,
}

impl Scene {
    pub fn band(&self, name: &str) -> Result<&Array2<f32>> {
        self.bands.get(name).ok_or_else(|| WaterspreadError::BackendResponse {
            reason: format!("Scene {} has no band {}", self.id, name),
        })
    }

    pub fn footprint(&self) -> Option<geo::Rect<f64>> {
        let (rows, cols) = self.bands.values().next()?.dim();
        Some(self.transform.bounds(rows, cols))
    }

    /// Spectral index with cloudy pixels masked out
    pub fn masked_index(&self, mask: &CloudMask, index: &SpectralIndex) -> Result<Raster<f32>> {
        let qa = self.band(&mask.qa_band)?;
        let first = self.band(&index.first_band)?;
        let second = self.band(&index.second_band)?;

        if qa.dim() != first.dim() || first.dim() != second.dim() {
            return Err(WaterspreadError::BackendResponse {
                reason: format!("Scene {} has bands of different shapes", self.id),
            });
        }

        let data = Array2::from_shape_fn(first.dim(), |idx| {
            if mask.is_clear(qa[idx] as u16) {
                normalized_difference(first[idx], second[idx])
            } else {
                None
            }
        });

        Ok(Raster::new(self.transform, data))
    }
}

/// (a - b) / (a + b); undefined for negative or non-finite reflectance and a zero sum
pub fn normalized_difference(a: f32, b: f32) -> Option<f32> {
    if !a.is_finite() || !b.is_finite() || a < 0.0 || b < 0.0 {
        return None;
    }
    let sum = a + b;
    if sum == 0.0 {
        return None;
    }
    Some((a - b) / sum)
}

/// Scenes acquired within `dates` whose footprint touches `region`
pub fn filter_scenes<'a>(
    scenes: &'a [Scene],
    dates: &DateRange,
    region: &MultiPolygon<f64>,
) -> Vec<&'a Scene> {
    scenes
        .iter()
        .filter(|s| dates.contains(s.acquired))
        .filter(|s| s.footprint().is_some_and(|fp| fp.intersects(region)))
        .collect()
}

/// Per-cell maximum of the cloud-masked index over all scenes, clipped to the grid's region.
///
/// Cells where no scene has a valid value stay `None`.
pub fn composite_index(
    scenes: &[&Scene],
    mask: &CloudMask,
    index: &SpectralIndex,
    grid: &SamplingGrid,
) -> Result<Array2<Option<f32>>> {
    let mut composite: Array2<Option<f32>> = Array2::from_elem(grid.shape(), None);

    for scene in scenes {
        let sampled = grid.sample(&scene.masked_index(mask, index)?);
        composite.zip_mut_with(&sampled, |acc, &value| {
            *acc = match (*acc, value) {
                (Some(a), Some(v)) => Some(a.max(v)),
                (a, v) => a.or(v),
            };
        });
    }

    Ok(composite)
}
