//! In-process imagery backend.
//!
//! Holds a historical maximum-extent raster and a set of multispectral scenes,
//! and evaluates queries with the raster operations in `waterspread-geo`. A
//! scene file lets the CLI run the full pipeline offline.

use async_trait::async_trait;
use chrono::NaiveDate;
use geo::MultiPolygon;
use ndarray::Array2;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::ports::ImageryBackend;
use waterspread_core::models::{CompositeQuery, ExtentQuery, VectorFeature};
use waterspread_core::{Result, WaterspreadError};
use waterspread_geo::{
    clip, composite_index, filter_scenes, geodesic_area_m2, label_components, vectorize,
    GridTransform, Raster, SamplingGrid, Scene,
};

/// Extent raster value marking water
const WATER: u8 = 1;

/// Largest grid evaluated in process, whatever the query allows
pub const MAX_LOCAL_CELLS: u64 = 10_000_000;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    extent: Option<Raster<u8>>,
    scenes: Vec<Scene>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extent(mut self, extent: Raster<u8>) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Load an extent raster and scenes from a JSON scene file
    pub fn from_scene_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WaterspreadError::FileNotFound { path: path.to_path_buf() });
        }
        let content = std::fs::read_to_string(path)?;
        let file: SceneFile = serde_json::from_str(&content).map_err(|e| {
            WaterspreadError::FormatError {
                format: "Scene file".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut backend = Self::new();
        if let Some(extent) = file.extent {
            let values = to_array("extent", extent.values)?;
            backend.extent = Some(Raster::new(extent.transform, values));
        }
        for scene in file.scenes {
            let bands = scene
                .bands
                .into_iter()
                .map(|(name, rows)| {
                    let array = to_array(&format!("{}/{}", scene.id, name), rows)?;
                    Ok((name, array))
                })
                .collect::<Result<HashMap<_, _>>>()?;
            backend.scenes.push(Scene {
                id: scene.id,
                acquired: scene.acquired,
                transform: scene.transform,
                bands,
            });
        }

        tracing::info!(
            "Loaded scene file {} ({} scene(s), extent raster {})",
            path.display(),
            backend.scenes.len(),
            if backend.extent.is_some() { "present" } else { "absent" }
        );

        Ok(backend)
    }
}

#[async_trait]
impl ImageryBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn extent_vectors(&self, query: &ExtentQuery) -> Result<Vec<VectorFeature>> {
        let extent = self.extent.as_ref().ok_or_else(|| WaterspreadError::BackendResponse {
            reason: format!("Dataset {} ({}) is not loaded", query.dataset, query.band),
        })?;

        let grid = local_grid(&query.region, query.vectorize.scale, query.vectorize.max_pixels)?;

        let mask = grid.sample(extent).mapv(|v| v == Some(WATER));
        let labels = label_components(&mask, &query.components);
        let attribute = labels.mapv(|label| label.map(f64::from));

        let features = vectorize(&mask, &attribute, grid.transform(), &query.vectorize);
        let features = clip(features, &query.region);
        tracing::debug!("Extent query produced {} polygon(s)", features.len());

        Ok(features)
    }

    async fn composite_vectors(&self, query: &CompositeQuery) -> Result<Vec<VectorFeature>> {
        let grid = local_grid(&query.region, query.vectorize.scale, query.vectorize.max_pixels)?;

        let scenes = filter_scenes(&self.scenes, &query.dates, &query.region);
        tracing::debug!("{} scene(s) of {} match {}", scenes.len(), query.collection, query.dates);

        let composite = composite_index(&scenes, &query.cloud_mask, &query.index, &grid)?;
        let mask = composite.mapv(|v| v.is_some_and(|v| f64::from(v) > query.threshold));
        let attribute = composite.mapv(|v| v.map(f64::from));

        let features = vectorize(&mask, &attribute, grid.transform(), &query.vectorize);
        let features = clip(features, &query.region);
        tracing::debug!("Composite query produced {} polygon(s)", features.len());

        Ok(features)
    }

    async fn area(&self, geometry: &MultiPolygon<f64>) -> Result<f64> {
        Ok(geodesic_area_m2(geometry))
    }
}

fn local_grid(region: &MultiPolygon<f64>, scale: f64, max_pixels: u64) -> Result<SamplingGrid> {
    let limit = max_pixels.min(MAX_LOCAL_CELLS);
    if limit < max_pixels {
        tracing::debug!("Capping grid at {} cells (query allows {})", limit, max_pixels);
    }
    SamplingGrid::for_region(region, scale, limit)
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    extent: Option<ExtentEntry>,
    #[serde(default)]
    scenes: Vec<SceneEntry>,
}

#[derive(Debug, Deserialize)]
struct ExtentEntry {
    transform: GridTransform,
    /// Row-major values; null marks no-data
    values: Vec<Vec<Option<u8>>>,
}

#[derive(Debug, Deserialize)]
struct SceneEntry {
    id: String,
    acquired: NaiveDate,
    transform: GridTransform,
    bands: HashMap<String, Vec<Vec<f32>>>,
}

fn to_array<T: Clone>(name: &str, rows: Vec<Vec<T>>) -> Result<Array2<T>> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != width) {
        return Err(WaterspreadError::FormatError {
            format: "Scene file".to_string(),
            message: format!("Raster {} has rows of different lengths", name),
        });
    }

    Array2::from_shape_vec((height, width), rows.into_iter().flatten().collect()).map_err(|e| {
        WaterspreadError::FormatError {
            format: "Scene file".to_string(),
            message: format!("Raster {}: {}", name, e),
        }
    })
}
