//! GeoJSON format reader implementation

use async_trait::async_trait;
use std::fs;
use std::path::Path;

use crate::error::{Result, WaterspreadError};
use crate::formats::validation::{FormatValidator, MAX_UPLOAD_SIZE_MB};
use crate::formats::{FormatDataset, FormatFeature, FormatReader, FormatValidation};
use crate::models::Crs;

/// GeoJSON format reader
pub struct GeoJsonReader;

#[async_trait]
impl FormatReader for GeoJsonReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        let content = fs::read_to_string(path)?;

        let geojson: geojson::GeoJson =
            content.parse().map_err(|e| WaterspreadError::FormatValidation {
                format: "GeoJSON".to_string(),
                reason: format!("Failed to parse GeoJSON: {}", e),
            })?;

        let (features, crs) = self.extract_features_and_crs(&geojson)?;

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string();

        Ok(FormatDataset { name, format_name: "GeoJSON".to_string(), crs, features })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let mut json_validation = FormatValidator::validate_json_structure(path);
        if json_validation.is_valid() {
            match fs::read_to_string(path) {
                Ok(content) => {
                    if let Err(e) = content.parse::<geojson::GeoJson>() {
                        json_validation.errors.push(format!("Invalid GeoJSON: {}", e));
                    }
                }
                Err(e) => json_validation.errors.push(format!("Cannot read file: {}", e)),
            }
        }

        Ok(FormatValidator::merge_validations(vec![
            validation,
            FormatValidator::validate_file_size(path, MAX_UPLOAD_SIZE_MB),
            json_validation,
        ]))
    }
}

impl GeoJsonReader {
    /// Extract features and CRS from GeoJSON
    fn extract_features_and_crs(
        &self,
        geojson: &geojson::GeoJson,
    ) -> Result<(Vec<FormatFeature>, Crs)> {
        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                let features = fc
                    .features
                    .iter()
                    .enumerate()
                    .map(|(idx, feature)| self.convert_feature(feature, idx))
                    .collect::<Result<Vec<_>>>()?;

                // Legacy "crs" member; RFC 7946 files are always WGS 84
                let crs = fc
                    .foreign_members
                    .as_ref()
                    .and_then(|fm| fm.get("crs"))
                    .and_then(extract_epsg_from_crs)
                    .map(|epsg| Crs::new(epsg, format!("EPSG:{}", epsg)))
                    .unwrap_or_else(Crs::wgs84);

                Ok((features, crs))
            }
            geojson::GeoJson::Feature(feature) => {
                Ok((vec![self.convert_feature(feature, 0)?], Crs::wgs84()))
            }
            geojson::GeoJson::Geometry(geom) => {
                let feature = FormatFeature {
                    id: "0".to_string(),
                    geometry: Some(convert_geometry(geom, "0")?),
                };
                Ok((vec![feature], Crs::wgs84()))
            }
        }
    }

    /// Convert a GeoJSON feature to FormatFeature
    fn convert_feature(&self, feature: &geojson::Feature, idx: usize) -> Result<FormatFeature> {
        let id = feature
            .id
            .as_ref()
            .map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            })
            .unwrap_or_else(|| idx.to_string());

        let geometry = feature.geometry.as_ref().map(|g| convert_geometry(g, &id)).transpose()?;

        Ok(FormatFeature { id, geometry })
    }
}

fn convert_geometry(geometry: &geojson::Geometry, feature_id: &str) -> Result<geo::Geometry<f64>> {
    geo::Geometry::<f64>::try_from(geometry.clone()).map_err(|e| WaterspreadError::InvalidGeometry {
        feature_id: feature_id.to_string(),
        reason: e.to_string(),
    })
}

/// Extract EPSG code from a legacy CRS object
fn extract_epsg_from_crs(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    // "EPSG:4326", "urn:ogc:def:crs:EPSG::4326", or the OGC CRS84 alias
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    name.split(':').next_back()?.parse().ok()
}
