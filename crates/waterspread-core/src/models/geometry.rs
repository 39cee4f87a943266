//! Geometry types shared across all waterspread crates.
//!
//! Computation happens on `geo` types; these wrappers add the identity and
//! attributes that travel with a region or a vectorized feature, plus the
//! GeoJSON bridge used by readers, the HTTP backend, and the CLI.

use geo::{BoundingRect, Geometry, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, WaterspreadError};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    pub fn is_geographic_wgs84(&self) -> bool {
        self.epsg == 4326
    }
}

/// Region of interest: the polygon(s) bounding a candidate or confirmed water body.
///
/// Each part corresponds to one input feature. A region is never empty and is not
/// modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    name: String,
    parts: Vec<MultiPolygon<f64>>,
}

impl Roi {
    /// Build a region from one multipolygon per feature
    pub fn new(name: impl Into<String>, parts: Vec<MultiPolygon<f64>>) -> Result<Self> {
        let name = name.into();
        let parts: Vec<MultiPolygon<f64>> = parts.into_iter().filter(|p| !p.0.is_empty()).collect();
        if parts.is_empty() {
            return Err(WaterspreadError::InvalidGeometry {
                feature_id: name,
                reason: "Region of interest has no polygons".to_string(),
            });
        }

        for (idx, part) in parts.iter().enumerate() {
            for polygon in part {
                validate_polygon(polygon).map_err(|reason| WaterspreadError::InvalidGeometry {
                    feature_id: format!("{}[{}]", name, idx),
                    reason,
                })?;
            }
        }

        Ok(Self { name, parts })
    }

    /// Build a region from a single polygon
    pub fn from_polygon(name: impl Into<String>, polygon: Polygon<f64>) -> Result<Self> {
        Self::new(name, vec![MultiPolygon::new(vec![polygon])])
    }

    /// Build a region from vectorized features, one part per feature
    pub fn from_features(name: impl Into<String>, features: &[VectorFeature]) -> Result<Self> {
        Self::new(name, features.iter().map(|f| f.geometry.clone()).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[MultiPolygon<f64>] {
        &self.parts
    }

    /// The part coming from the first input feature
    pub fn first_part(&self) -> &MultiPolygon<f64> {
        &self.parts[0]
    }

    /// All parts as a single multipolygon
    pub fn geometry(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.parts.iter().flat_map(|p| p.0.iter().cloned()).collect())
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry().bounding_rect()
    }

    /// Exterior and interior rings of every part
    pub fn outline(&self) -> Vec<LineString<f64>> {
        self.parts
            .iter()
            .flat_map(|p| p.0.iter())
            .flat_map(|poly| {
                std::iter::once(poly.exterior().clone()).chain(poly.interiors().iter().cloned())
            })
            .collect()
    }
}

/// A polygon (or set of polygons) produced by vectorizing a raster mask, with
/// its scalar attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    pub properties: HashMap<String, f64>,
}

impl VectorFeature {
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self { id: id.into(), geometry, properties: HashMap::new() }
    }

    /// Set a numeric attribute
    pub fn with_property(mut self, key: impl Into<String>, value: f64) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }

    /// Convert to a GeoJSON feature
    pub fn to_geojson(&self) -> geojson::Feature {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(k, v)| {
                let value = serde_json::Number::from_f64(*v)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null);
                (k.clone(), value)
            })
            .collect();

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: Some(geojson::feature::Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Parse a GeoJSON feature with polygonal geometry
    pub fn from_geojson(feature: &geojson::Feature, idx: usize) -> Result<Self> {
        let id = feature
            .id
            .as_ref()
            .map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            })
            .unwrap_or_else(|| idx.to_string());

        let geometry = feature.geometry.as_ref().ok_or_else(|| WaterspreadError::InvalidGeometry {
            feature_id: id.clone(),
            reason: "Feature has no geometry".to_string(),
        })?;

        let geometry = Geometry::<f64>::try_from(geometry.clone()).map_err(|e| {
            WaterspreadError::InvalidGeometry { feature_id: id.clone(), reason: e.to_string() }
        })?;

        let geometry = into_multi_polygon(geometry).ok_or_else(|| {
            WaterspreadError::InvalidGeometry {
                feature_id: id.clone(),
                reason: "Expected Polygon or MultiPolygon geometry".to_string(),
            }
        })?;

        let properties = feature
            .properties
            .as_ref()
            .map(|props| {
                props.iter().filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n))).collect()
            })
            .unwrap_or_default();

        Ok(Self { id, geometry, properties })
    }
}

/// Collect features into a GeoJSON FeatureCollection
pub fn feature_collection(features: &[VectorFeature]) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: features.iter().map(VectorFeature::to_geojson).collect(),
        foreign_members: None,
    }
}

/// Extract the polygonal part of a geometry, if it has one
pub fn into_multi_polygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        Geometry::GeometryCollection(gc) => {
            let polygons: Vec<Polygon<f64>> = gc
                .into_iter()
                .filter_map(into_multi_polygon)
                .flat_map(|mp| mp.0)
                .collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon::new(polygons))
            }
        }
        _ => None,
    }
}

/// Check ring closure, ring length, and coordinate finiteness
pub fn validate_polygon(polygon: &Polygon<f64>) -> std::result::Result<(), String> {
    validate_ring(polygon.exterior(), "exterior")?;
    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior, &format!("interior[{}]", i))?;
    }

    match polygon.bounding_rect() {
        Some(rect) if rect.width() > 0.0 && rect.height() > 0.0 => Ok(()),
        _ => Err("Polygon has zero extent".to_string()),
    }
}

fn validate_ring(ring: &LineString<f64>, location: &str) -> std::result::Result<(), String> {
    if ring.0.len() < 4 {
        return Err(format!(
            "Polygon {} must have at least 4 points, found {}",
            location,
            ring.0.len()
        ));
    }

    if let Some(coord) = ring.0.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(format!(
            "Polygon {} has non-finite coordinate ({}, {})",
            location, coord.x, coord.y
        ));
    }

    if ring.0.first() != ring.0.last() {
        return Err(format!("Polygon {} must be closed (first point == last point)", location));
    }

    Ok(())
}
