use geo::{LineString, MultiLineString, MultiPolygon};
use serde::Serialize;
use serde_json::json;
use waterspread_core::models::{DateRange, Roi, VectorFeature};
use waterspread_core::Result;

/// Feature property holding a candidate's area in hectares
pub const AREA_PROPERTY: &str = "area";

/// Area of one connected component of the historical water extent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateArea {
    pub id: String,
    pub area_ha: f64,
    /// Whether the candidate passed the keep rule
    pub kept: bool,
}

/// Result of running the Boundary Detector over a containing region
#[derive(Debug, Clone)]
pub struct BoundaryDetection {
    /// Every component found, largest first
    pub candidates: Vec<CandidateArea>,

    /// Fraction of the largest area a component needs to be kept
    pub cutoff: f64,

    /// Minimum kept area in hectares; `None` when no component was found
    pub threshold_ha: Option<f64>,

    /// Components interpreted as the tank, each carrying an `area` property
    pub tank: Vec<VectorFeature>,
}

impl BoundaryDetection {
    /// An empty detection means "boundary not found"
    pub fn is_empty(&self) -> bool {
        self.tank.is_empty()
    }

    /// The detected tank as a region, one part per kept component
    pub fn tank_roi(&self, name: &str) -> Result<Option<Roi>> {
        if self.is_empty() {
            return Ok(None);
        }
        Roi::from_features(name, &self.tank).map(Some)
    }
}

/// Geometry reported for a water spread
#[derive(Debug, Clone, PartialEq)]
pub enum SpreadOutline {
    /// Union of every vectorized water polygon
    Dissolved(MultiPolygon<f64>),

    /// Rings of the boundary, used when the mask could not be vectorized
    Boundary(Vec<LineString<f64>>),
}

impl SpreadOutline {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SpreadOutline::Boundary(_))
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        match self {
            SpreadOutline::Dissolved(polygons) => {
                geojson::Geometry::new(geojson::Value::from(polygons))
            }
            SpreadOutline::Boundary(rings) => {
                let lines = MultiLineString::new(rings.clone());
                geojson::Geometry::new(geojson::Value::from(&lines))
            }
        }
    }
}

/// Maximum observed water spread over a date range
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSpread {
    pub dates: DateRange,

    /// Area of the vectorized water mask, hectares rounded to 2 decimals
    pub area_ha: f64,

    /// Number of polygons the mask vectorized into
    pub polygon_count: usize,

    pub outline: SpreadOutline,
}

impl WaterSpread {
    pub fn fallback(&self) -> bool {
        self.outline.is_fallback()
    }
}

/// Headline figures for a resolved tank boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TankSummary {
    /// Hectares, rounded to 2 decimals
    pub area_ha: f64,
    /// Centroid of the first tank feature, rounded to 2 decimals
    pub centroid_lat: f64,
    pub centroid_lon: f64,
}

/// Everything a completed run produces
#[derive(Debug, Clone)]
pub struct RunReport {
    pub tank: Roi,
    pub summary: TankSummary,
    pub spread: WaterSpread,
    /// Present when the tank was detected rather than declared
    pub detection: Option<BoundaryDetection>,
}

impl RunReport {
    /// Spread outline plus the tank boundary, for plotting one against the other
    pub fn plot_layer(&self) -> geojson::FeatureCollection {
        let spread = plot_feature(self.spread.outline.to_geojson(), "spread");
        let tank_lines = MultiLineString::new(self.tank.outline());
        let tank = plot_feature(geojson::Geometry::new(geojson::Value::from(&tank_lines)), "tank");

        geojson::FeatureCollection {
            bbox: None,
            features: vec![spread, tank],
            foreign_members: None,
        }
    }
}

fn plot_feature(geometry: geojson::Geometry, layer: &str) -> geojson::Feature {
    let mut properties = geojson::JsonObject::new();
    properties.insert("layer".to_string(), json!(layer));
    geojson::Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Detection found no qualifying component; nothing was estimated
    BoundaryNotFound(BoundaryDetection),
    Estimated(Box<RunReport>),
}
