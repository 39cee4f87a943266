//! Input formats for boundary and region-of-interest uploads
//!
//! Each format implements the `FormatReader` trait, and the `FormatRegistry`
//! dispatches a path to the reader registered for its extension. `load_roi`
//! runs the whole validate → read → convert sequence, so every input error is
//! reported before any backend call is made.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{Result, WaterspreadError};
use crate::models::{into_multi_polygon, Crs, Roi};

pub mod geojson;
pub mod shapefile;
pub mod validation;

use validation::FormatValidator;

/// Format reader trait that all format implementations must implement
#[async_trait]
pub trait FormatReader: Send + Sync {
    /// Read a dataset from the given path
    async fn read(&self, path: &Path) -> Result<FormatDataset>;

    /// Get supported file extensions (e.g., ["shp", "geojson"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without full read (optional)
    async fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Vector dataset returned by format readers
#[derive(Debug, Clone)]
pub struct FormatDataset {
    /// Dataset name, taken from the file stem
    pub name: String,

    /// Format name (e.g., "GeoJSON", "Shapefile")
    pub format_name: String,

    /// Declared coordinate reference system
    pub crs: Crs,

    pub features: Vec<FormatFeature>,
}

/// Feature extracted from a format
#[derive(Debug, Clone)]
pub struct FormatFeature {
    pub id: String,

    /// None for null shapes or features without geometry
    pub geometry: Option<geo::Geometry<f64>>,
}

impl FormatDataset {
    /// Convert to a region of interest, keeping polygonal features only
    pub fn into_roi(self, path: &Path) -> Result<Roi> {
        if !self.crs.is_geographic_wgs84() {
            return Err(WaterspreadError::CrsMismatch {
                found: format!("EPSG:{} ({})", self.crs.epsg, self.crs.name),
                expected: "EPSG:4326 (WGS 84)".to_string(),
            });
        }

        let mut parts = Vec::new();
        for feature in self.features {
            match feature.geometry.and_then(into_multi_polygon) {
                Some(polygons) => parts.push(polygons),
                None => tracing::warn!(
                    "Skipping feature {} in {}: not a polygon",
                    feature.id,
                    self.name
                ),
            }
        }

        if parts.is_empty() {
            return Err(WaterspreadError::NoPolygonFeatures { path: path.to_path_buf() });
        }

        Roi::new(self.name, parts)
    }
}

/// Central registry for format readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every upload format: GeoJSON, shapefile, zipped shapefile
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(geojson::GeoJsonReader));
        registry.register(Box::new(shapefile::ShapefileFormatReader));
        registry.register(Box::new(shapefile::ZippedShapefileReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| WaterspreadError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| WaterspreadError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn FormatReader>] {
        &self.readers
    }

    /// Validate, read, and convert an uploaded file into a region of interest
    pub async fn load_roi(&self, path: &Path) -> Result<Roi> {
        if !path.exists() {
            return Err(WaterspreadError::FileNotFound { path: path.to_path_buf() });
        }

        let reader = self.detect_format(path)?;

        let validation = reader.validate(path).await?;
        for warning in &validation.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        FormatValidator::validation_to_result(&validation, reader.format_name())?;

        let dataset = reader.read(path).await?;
        tracing::debug!(
            "Read {} feature(s) from {} ({})",
            dataset.features.len(),
            path.display(),
            dataset.format_name
        );

        dataset.into_roi(path)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Load a region of interest with the default registry
pub async fn load_roi(path: &Path) -> Result<Roi> {
    FormatRegistry::with_defaults().load_roi(path).await
}
