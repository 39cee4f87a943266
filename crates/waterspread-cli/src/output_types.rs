use serde::Serialize;
use waterspread_analysis::{
    BoundaryDetection, BoundarySource, CandidateArea, TankSummary, WaterSpread,
};
use waterspread_core::config::ConfigSource;
use waterspread_core::models::{feature_collection, Basemap, DateRange};

/// Output for detect command
#[derive(Debug, Serialize)]
pub struct DetectOutput {
    pub region: String,
    pub boundary_found: bool,
    pub detection: DetectionOutput,
    pub summary: Option<TankSummary>,
}

#[derive(Debug, Serialize)]
pub struct DetectionOutput {
    pub cutoff: f64,
    pub threshold_ha: Option<f64>,
    pub candidates: Vec<CandidateArea>,
    pub tank: geojson::FeatureCollection,
}

impl From<&BoundaryDetection> for DetectionOutput {
    fn from(detection: &BoundaryDetection) -> Self {
        Self {
            cutoff: detection.cutoff,
            threshold_ha: detection.threshold_ha,
            candidates: detection.candidates.clone(),
            tank: feature_collection(&detection.tank),
        }
    }
}

/// Output for estimate command
#[derive(Debug, Serialize)]
pub struct EstimateOutput {
    pub tank: String,
    pub summary: TankSummary,
    pub spread: SpreadOutput,
}

#[derive(Debug, Serialize)]
pub struct SpreadOutput {
    pub dates: DateRange,
    pub area_ha: f64,
    pub polygon_count: usize,
    pub fallback: bool,
    pub outline: geojson::Geometry,
}

impl From<&WaterSpread> for SpreadOutput {
    fn from(spread: &WaterSpread) -> Self {
        Self {
            dates: spread.dates,
            area_ha: spread.area_ha,
            polygon_count: spread.polygon_count,
            fallback: spread.fallback(),
            outline: spread.outline.to_geojson(),
        }
    }
}

/// Output for run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// "estimated" or "boundary_not_found"
    pub outcome: &'static str,
    pub boundary: BoundarySource,
    pub basemap: BasemapOutput,
    pub dates: DateRange,
    pub detection: Option<DetectionOutput>,
    pub summary: Option<TankSummary>,
    pub spread: Option<SpreadOutput>,
    pub plot_layer: Option<geojson::FeatureCollection>,
}

#[derive(Debug, Serialize)]
pub struct BasemapOutput {
    pub name: &'static str,
    pub tile_url: &'static str,
}

impl From<Basemap> for BasemapOutput {
    fn from(basemap: Basemap) -> Self {
        Self { name: basemap.label(), tile_url: basemap.tile_url() }
    }
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub backend: ConfigValue<String>,
    pub endpoint: ConfigValue<String>,
    pub basemap: ConfigValue<String>,
    pub boundary_cutoff: ConfigValue<f64>,
}

#[derive(Debug, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: String,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source: source.to_string() }
    }
}
