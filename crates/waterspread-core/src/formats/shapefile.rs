//! Shapefile format readers
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj)
//! that must all sit next to each other. Uploads usually arrive as a zip
//! archive, which `ZippedShapefileReader` unpacks into a temporary directory
//! before handing the `.shp` to `ShapefileFormatReader`.

use async_trait::async_trait;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Reader as ShapefileReader, Shape};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{Result, WaterspreadError};
use crate::formats::validation::{FormatValidator, MAX_UPLOAD_SIZE_MB};
use crate::formats::{FormatDataset, FormatFeature, FormatReader, FormatValidation};
use crate::models::Crs;

/// Shapefile format reader
pub struct ShapefileFormatReader;

#[async_trait]
impl FormatReader for ShapefileFormatReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        self.verify_components(path)?;

        let mut reader = ShapefileReader::from_path(path).map_err(|e| format_error(
            format!("Failed to open Shapefile: {}", e),
        ))?;

        let crs = self.extract_crs(path)?;

        let mut features = Vec::new();
        for (idx, result) in reader.iter_shapes_and_records().enumerate() {
            let (shape, _record) =
                result.map_err(|e| format_error(format!("Failed to read feature {}: {}", idx, e)))?;
            features.push(FormatFeature { id: idx.to_string(), geometry: convert_shape(&shape) });
        }

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string();

        Ok(FormatDataset { name, format_name: "Shapefile".to_string(), crs, features })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = match shapefile_base(path) {
            Ok(b) => b,
            Err(e) => {
                validation.errors.push(format!("Invalid Shapefile path: {}", e));
                return Ok(validation);
            }
        };

        let component_validation =
            FormatValidator::validate_component_files(&base, &["shp", "shx", "dbf"], &["prj"]);

        Ok(FormatValidator::merge_validations(vec![
            validation,
            FormatValidator::validate_file_size(path, MAX_UPLOAD_SIZE_MB),
            component_validation,
        ]))
    }
}

impl ShapefileFormatReader {
    /// Verify that all required Shapefile component files exist
    fn verify_components(&self, path: &Path) -> Result<()> {
        let base = shapefile_base(path)?;
        let missing: Vec<String> = ["shp", "shx", "dbf"]
            .iter()
            .filter(|ext| !base.with_extension(ext).exists())
            .map(|ext| format!(".{}", ext))
            .collect();

        if !missing.is_empty() {
            return Err(format_error(format!(
                "Missing required component files: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Read the CRS from the .prj sidecar; a missing .prj means WGS 84
    fn extract_crs(&self, path: &Path) -> Result<Crs> {
        let prj_path = shapefile_base(path)?.with_extension("prj");
        if !prj_path.exists() {
            return Ok(Crs::wgs84());
        }

        let wkt = fs::read_to_string(&prj_path)
            .map_err(|e| format_error(format!("Failed to read .prj file: {}", e)))?;

        Ok(crs_from_wkt(&wkt))
    }
}

/// Zipped shapefile reader
pub struct ZippedShapefileReader;

#[async_trait]
impl FormatReader for ZippedShapefileReader {
    async fn read(&self, path: &Path) -> Result<FormatDataset> {
        let extract_dir = tempfile::tempdir()?;
        let shp_path = extract_archive(path, extract_dir.path())?;

        let mut dataset = ShapefileFormatReader.read(&shp_path).await?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            dataset.name = stem.to_string();
        }
        dataset.format_name = "Zipped Shapefile".to_string();

        Ok(dataset)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["zip"]
    }

    fn format_name(&self) -> &str {
        "Zipped Shapefile"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        Ok(FormatValidator::merge_validations(vec![
            validation,
            FormatValidator::validate_file_size(path, MAX_UPLOAD_SIZE_MB),
            FormatValidator::validate_zipped_shapefile(path),
        ]))
    }
}

/// Unpack every file of the archive flat into `dir`, returning the first .shp
fn extract_archive(path: &Path, dir: &Path) -> Result<PathBuf> {
    let zip_error = |e: zip::result::ZipError| WaterspreadError::FormatError {
        format: "Zipped Shapefile".to_string(),
        message: e.to_string(),
    };

    let mut archive = zip::ZipArchive::new(File::open(path)?).map_err(zip_error)?;
    let mut shp_path = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let (Some(stem), Some(ext)) = (
            relative.file_stem().and_then(|s| s.to_str()).map(str::to_string),
            relative.extension().and_then(|e| e.to_str()).map(str::to_lowercase),
        ) else {
            continue;
        };

        // Lowercased extensions let the sidecar lookup work on case-sensitive filesystems
        let target = dir.join(&stem).with_extension(&ext);
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;

        if ext == "shp" && shp_path.is_none() {
            shp_path = Some(target);
        }
    }

    shp_path.ok_or_else(|| {
        format_error(format!("No .shp file found in archive {}", path.display()))
    })
}

fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);

    if !is_shp {
        return Err(WaterspreadError::InvalidPath {
            path: path.to_path_buf(),
            reason: "Not a Shapefile (.shp)".to_string(),
        });
    }

    Ok(path.with_extension(""))
}

fn format_error(message: String) -> WaterspreadError {
    WaterspreadError::FormatError { format: "Shapefile".to_string(), message }
}

/// Identify the CRS declared by a .prj WKT string
fn crs_from_wkt(wkt: &str) -> Crs {
    if let Some(epsg) = parse_epsg_from_wkt(wkt) {
        let name = wkt_name(wkt).unwrap_or_else(|| format!("EPSG:{}", epsg));
        return Crs::new(epsg, name);
    }

    // ESRI .prj files rarely carry an AUTHORITY clause
    match wkt_name(wkt) {
        Some(name) if wkt.trim_start().starts_with("GEOGCS") && name.contains("WGS_1984") => {
            Crs::wgs84()
        }
        Some(name) => Crs::new(0, name),
        None => Crs::new(0, "unknown"),
    }
}

/// Find the outermost AUTHORITY["EPSG","code"] clause
fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    const MARKER: &str = "AUTHORITY[\"EPSG\",\"";
    let start = wkt.rfind(MARKER)? + MARKER.len();
    let end = wkt[start..].find('"')?;
    wkt[start..start + end].parse().ok()
}

/// Name of the top-level WKT node, e.g. "GCS_WGS_1984"
fn wkt_name(wkt: &str) -> Option<String> {
    let start = wkt.find('"')? + 1;
    let end = wkt[start..].find('"')?;
    Some(wkt[start..start + end].to_string())
}

/// Convert polygonal shapes; other shape types yield no geometry
fn convert_shape(shape: &Shape) -> Option<geo::Geometry<f64>> {
    let rings: Vec<(bool, LineString<f64>)> = match shape {
        Shape::Polygon(polygon) => polygon
            .rings()
            .iter()
            .map(|ring| (is_outer(ring), ring_coords(ring.points().iter().map(|p| (p.x, p.y)))))
            .collect(),
        Shape::PolygonZ(polygon) => polygon
            .rings()
            .iter()
            .map(|ring| (is_outer(ring), ring_coords(ring.points().iter().map(|p| (p.x, p.y)))))
            .collect(),
        Shape::PolygonM(polygon) => polygon
            .rings()
            .iter()
            .map(|ring| (is_outer(ring), ring_coords(ring.points().iter().map(|p| (p.x, p.y)))))
            .collect(),
        _ => return None,
    };

    // Each outer ring opens a polygon; inner rings belong to the preceding outer ring
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for (outer, ring) in rings {
        match (outer, polygons.last_mut()) {
            (false, Some((_, holes))) => holes.push(ring),
            _ => polygons.push((ring, Vec::new())),
        }
    }

    let polygons: Vec<Polygon<f64>> =
        polygons.into_iter().map(|(exterior, holes)| Polygon::new(exterior, holes)).collect();

    match polygons.len() {
        0 => None,
        1 => polygons.into_iter().next().map(geo::Geometry::Polygon),
        _ => Some(geo::Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

fn is_outer<P>(ring: &PolygonRing<P>) -> bool {
    matches!(ring, PolygonRing::Outer(_))
}

fn ring_coords(points: impl Iterator<Item = (f64, f64)>) -> LineString<f64> {
    LineString::new(points.map(|(x, y)| Coord { x, y }).collect())
}
