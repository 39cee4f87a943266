//! Error types for Waterspread

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaterspreadError {
    // Input errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Unsupported format '.{extension}'. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    #[error("{format} validation failed: {reason}")]
    FormatValidation { format: String, reason: String },

    #[error("No polygon features found in {path}")]
    NoPolygonFeatures { path: PathBuf },

    #[error("CRS mismatch: input has {found}, expected {expected}")]
    CrsMismatch { found: String, expected: String },

    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry {
        feature_id: String,
        reason: String,
    },

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    // Backend errors
    #[error("Backend unavailable: {reason}. Try: {remediation}")]
    BackendUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Backend returned an unexpected response: {reason}")]
    BackendResponse { reason: String },

    #[error("Too many pixels: {count} exceeds the limit of {max}")]
    TooManyPixels { count: u64, max: u64 },

    #[error("Vectorization failed: {reason}")]
    Vectorization { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WaterspreadError {
    /// Errors raised while turning a water mask into vectors.
    ///
    /// The water-spread estimator degrades to the declared boundary on these;
    /// every other error ends the current run.
    pub fn is_vectorization_failure(&self) -> bool {
        matches!(
            self,
            WaterspreadError::Vectorization { .. } | WaterspreadError::TooManyPixels { .. }
        )
    }

    /// Errors caused by the user's input rather than by processing.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WaterspreadError::FileNotFound { .. }
                | WaterspreadError::InvalidPath { .. }
                | WaterspreadError::UnsupportedFormat { .. }
                | WaterspreadError::FormatError { .. }
                | WaterspreadError::FormatValidation { .. }
                | WaterspreadError::NoPolygonFeatures { .. }
                | WaterspreadError::CrsMismatch { .. }
                | WaterspreadError::InvalidGeometry { .. }
                | WaterspreadError::InvalidDate { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WaterspreadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorization_failures() {
        let err = WaterspreadError::Vectorization { reason: "empty mask".to_string() };
        assert!(err.is_vectorization_failure());

        let err = WaterspreadError::TooManyPixels { count: 10, max: 5 };
        assert!(err.is_vectorization_failure());

        let err = WaterspreadError::BackendUnavailable {
            reason: "connection refused".to_string(),
            remediation: "start the service".to_string(),
        };
        assert!(!err.is_vectorization_failure());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = WaterspreadError::UnsupportedFormat {
            extension: "kml".to_string(),
            supported: vec!["geojson".to_string(), "zip".to_string()],
        };
        assert_eq!(err.to_string(), "Unsupported format '.kml'. Supported: geojson, zip");
        assert!(err.is_input_error());
    }
}
