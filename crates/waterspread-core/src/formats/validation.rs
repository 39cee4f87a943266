use crate::error::{Result, WaterspreadError};
use crate::formats::FormatValidation;
use std::fs::File;
use std::path::Path;

/// Uploads larger than this are rejected before parsing
pub const MAX_UPLOAD_SIZE_MB: u64 = 200;

pub struct FormatValidator;

impl FormatValidator {
    /// Validate that a file exists and is readable
    pub fn validate_file_exists(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        if !path.exists() {
            validation.errors.push(format!("File not found: {}", path.display()));
            return validation;
        }
        if let Err(e) = std::fs::metadata(path) {
            validation.errors.push(format!("Cannot access file: {}", e));
        }

        validation
    }

    /// Validate that a file has a specific extension
    pub fn validate_extension(path: &Path, expected_ext: &str) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(expected_ext) => {}
            Some(ext) => validation
                .errors
                .push(format!("Unexpected file extension: .{} (expected .{})", ext, expected_ext)),
            None => validation
                .errors
                .push(format!("File has no extension (expected .{})", expected_ext)),
        }

        validation
    }

    /// Validate that sibling component files of a multi-file format exist
    pub fn validate_component_files(
        base_path: &Path,
        required_extensions: &[&str],
        optional_extensions: &[&str],
    ) -> FormatValidation {
        let mut validation = FormatValidation::default();

        for ext in required_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation
                    .errors
                    .push(format!("Missing required file: {}", component_path.display()));
            }
        }

        for ext in optional_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation.warnings.push(format!(
                    "Optional file not found: {} (assuming EPSG:4326)",
                    component_path.display()
                ));
            }
        }

        validation
    }

    /// Validate file size against an upload limit
    pub fn validate_file_size(path: &Path, max_size_mb: u64) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::metadata(path) {
            Ok(metadata) => {
                let size_mb = metadata.len() / (1024 * 1024);
                if size_mb > max_size_mb {
                    validation.errors.push(format!(
                        "File size ({} MB) exceeds maximum allowed size ({} MB)",
                        size_mb, max_size_mb
                    ));
                } else if size_mb > max_size_mb / 2 {
                    validation
                        .warnings
                        .push(format!("Large file ({} MB) may take longer to process", size_mb));
                }
            }
            Err(e) => validation.errors.push(format!("Cannot read file metadata: {}", e)),
        }

        validation
    }

    /// Validate JSON structure by attempting to parse
    pub fn validate_json_structure(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                    validation.errors.push(format!("Invalid JSON structure: {}", e));
                }
            }
            Err(e) => validation.errors.push(format!("Cannot read file: {}", e)),
        }

        validation
    }

    /// Validate that a zip archive opens and carries a complete shapefile
    pub fn validate_zipped_shapefile(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        let archive = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|file| zip::ZipArchive::new(file).map_err(|e| e.to_string()));

        let archive = match archive {
            Ok(archive) => archive,
            Err(e) => {
                validation.errors.push(format!("Invalid zip archive: {}", e));
                return validation;
            }
        };

        let names: Vec<String> = archive.file_names().map(|n| n.to_lowercase()).collect();
        let Some(shp) = names.iter().find(|n| n.ends_with(".shp")) else {
            validation.errors.push("Archive contains no .shp file".to_string());
            return validation;
        };

        let stem = shp.trim_end_matches(".shp");
        for ext in ["shx", "dbf"] {
            if !names.contains(&format!("{}.{}", stem, ext)) {
                validation.errors.push(format!("Archive is missing {}.{}", stem, ext));
            }
        }
        if !names.contains(&format!("{}.prj", stem)) {
            validation
                .warnings
                .push(format!("Archive has no {}.prj (assuming EPSG:4326)", stem));
        }

        validation
    }

    /// Merge multiple validation results
    pub fn merge_validations(validations: Vec<FormatValidation>) -> FormatValidation {
        let mut merged = FormatValidation::default();

        for validation in validations {
            merged.errors.extend(validation.errors);
            merged.warnings.extend(validation.warnings);
        }

        merged
    }

    /// Convert a validation result to a Result type
    pub fn validation_to_result(validation: &FormatValidation, format_name: &str) -> Result<()> {
        if validation.is_valid() {
            Ok(())
        } else {
            Err(WaterspreadError::FormatValidation {
                format: format_name.to_string(),
                reason: validation.errors.join("; "),
            })
        }
    }
}
