use crate::error::{Result, WaterspreadError};
use crate::models::Basemap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default share of the largest candidate's area a polygon needs to be kept as the tank
pub const DEFAULT_BOUNDARY_CUTOFF: f64 = 0.9;

/// Default base URL of the remote analysis service
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "environment",
            ConfigSource::Cli => "cli",
        };
        f.write_str(label)
    }
}

/// Which imagery backend executes the queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic in-process backend over a local scene
    #[default]
    Memory,
    /// Remote analysis service over HTTP
    Http,
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Waterspread
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub backend: ConfigValue<BackendKind>,
    pub endpoint: ConfigValue<String>,
    pub basemap: ConfigValue<Basemap>,
    pub boundary_cutoff: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            backend: ConfigValue::new(BackendKind::Memory, ConfigSource::Default),
            endpoint: ConfigValue::new(DEFAULT_ENDPOINT.to_string(), ConfigSource::Default),
            basemap: ConfigValue::new(Basemap::OpenStreetMap, ConfigSource::Default),
            boundary_cutoff: ConfigValue::new(DEFAULT_BOUNDARY_CUTOFF, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| WaterspreadError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| WaterspreadError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(backend) = file_config.backend {
            self.backend.update(parse_backend_kind(&backend)?, ConfigSource::File);
        }

        if let Some(endpoint) = file_config.endpoint {
            self.endpoint.update(endpoint, ConfigSource::File);
        }

        if let Some(basemap) = file_config.basemap {
            self.basemap.update(parse_basemap(&basemap)?, ConfigSource::File);
        }

        if let Some(cutoff) = file_config.boundary_cutoff {
            self.boundary_cutoff.update(validate_cutoff(cutoff)?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // WATERSPREAD_BACKEND
        if let Ok(backend_str) = env::var("WATERSPREAD_BACKEND") {
            match parse_backend_kind(&backend_str) {
                Ok(kind) => self.backend.update(kind, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid WATERSPREAD_BACKEND value '{}': expected memory or http",
                    backend_str
                ),
            }
        }

        // WATERSPREAD_ENDPOINT
        if let Ok(endpoint) = env::var("WATERSPREAD_ENDPOINT") {
            self.endpoint.update(endpoint, ConfigSource::Environment);
        }

        // WATERSPREAD_BASEMAP
        if let Ok(basemap_str) = env::var("WATERSPREAD_BASEMAP") {
            match parse_basemap(&basemap_str) {
                Ok(basemap) => self.basemap.update(basemap, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid WATERSPREAD_BASEMAP value '{}': expected osm, terrain, or hybrid",
                    basemap_str
                ),
            }
        }

        // WATERSPREAD_BOUNDARY_CUTOFF
        if let Ok(cutoff_str) = env::var("WATERSPREAD_BOUNDARY_CUTOFF") {
            match cutoff_str.trim().parse::<f64>().ok().and_then(|c| validate_cutoff(c).ok()) {
                Some(cutoff) => self.boundary_cutoff.update(cutoff, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid WATERSPREAD_BOUNDARY_CUTOFF value '{}': expected a number in (0, 1]",
                    cutoff_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(backend) = overrides.backend {
            self.backend.update(backend, ConfigSource::Cli);
        }

        if let Some(endpoint) = overrides.endpoint {
            self.endpoint.update(endpoint, ConfigSource::Cli);
        }

        if let Some(basemap) = overrides.basemap {
            self.basemap.update(basemap, ConfigSource::Cli);
        }

        if let Some(cutoff) = overrides.boundary_cutoff {
            self.boundary_cutoff.update(cutoff, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "backend".to_string(),
            (format!("{:?}", self.backend.value).to_lowercase(), self.backend.source),
        );

        map.insert("endpoint".to_string(), (self.endpoint.value.clone(), self.endpoint.source));

        map.insert("basemap".to_string(), (self.basemap.value.to_string(), self.basemap.source));

        map.insert(
            "boundary_cutoff".to_string(),
            (self.boundary_cutoff.value.to_string(), self.boundary_cutoff.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    backend: Option<String>,
    endpoint: Option<String>,
    basemap: Option<String>,
    boundary_cutoff: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub backend: Option<BackendKind>,
    pub endpoint: Option<String>,
    pub basemap: Option<Basemap>,
    pub boundary_cutoff: Option<f64>,
}

/// Parse backend kind from string
pub fn parse_backend_kind(s: &str) -> Result<BackendKind> {
    match s.to_lowercase().as_str() {
        "memory" | "local" => Ok(BackendKind::Memory),
        "http" | "remote" => Ok(BackendKind::Http),
        _ => Err(WaterspreadError::ConfigInvalid {
            key: "backend".to_string(),
            reason: format!("Invalid backend: {}. Use memory or http", s),
        }),
    }
}

/// Parse basemap from string
pub fn parse_basemap(s: &str) -> Result<Basemap> {
    match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "openstreetmap" | "osm" => Ok(Basemap::OpenStreetMap),
        "googleterrain" | "terrain" => Ok(Basemap::GoogleTerrain),
        "googlehybrid" | "hybrid" => Ok(Basemap::GoogleHybrid),
        _ => Err(WaterspreadError::ConfigInvalid {
            key: "basemap".to_string(),
            reason: format!("Invalid basemap: {}. Use osm, terrain, or hybrid", s),
        }),
    }
}

/// Check that a boundary cutoff lies in (0, 1]
pub fn validate_cutoff(cutoff: f64) -> Result<f64> {
    if cutoff.is_finite() && cutoff > 0.0 && cutoff <= 1.0 {
        Ok(cutoff)
    } else {
        Err(WaterspreadError::ConfigInvalid {
            key: "boundary_cutoff".to_string(),
            reason: format!("{} is outside (0, 1]", cutoff),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.backend.value, BackendKind::Memory);
        assert_eq!(config.backend.source, ConfigSource::Default);
        assert_eq!(config.basemap.value, Basemap::OpenStreetMap);
        assert_eq!(config.boundary_cutoff.value, 0.9);
        assert_eq!(config.endpoint.value, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(0.9, ConfigSource::Default);

        value.update(0.8, ConfigSource::File);
        assert_eq!(value.value, 0.8);
        assert_eq!(value.source, ConfigSource::File);

        value.update(0.7, ConfigSource::Environment);
        assert_eq!(value.value, 0.7);

        value.update(0.6, ConfigSource::Cli);
        assert_eq!(value.value, 0.6);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(0.5, ConfigSource::File);
        assert_eq!(value.value, 0.6);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
backend = "http"
endpoint = "https://analysis.example.org"
basemap = "hybrid"
boundary_cutoff = 0.75
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.backend.value, BackendKind::Http);
        assert_eq!(config.backend.source, ConfigSource::File);
        assert_eq!(config.endpoint.value, "https://analysis.example.org");
        assert_eq!(config.basemap.value, Basemap::GoogleHybrid);
        assert_eq!(config.boundary_cutoff.value, 0.75);
    }

    #[test]
    fn test_load_from_file_rejects_bad_cutoff() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "boundary_cutoff = 1.5").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(WaterspreadError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            backend: Some(BackendKind::Http),
            basemap: Some(Basemap::GoogleTerrain),
            ..Default::default()
        });

        assert_eq!(config.backend.value, BackendKind::Http);
        assert_eq!(config.backend.source, ConfigSource::Cli);
        assert_eq!(config.basemap.value, Basemap::GoogleTerrain);
        // These should still be defaults
        assert_eq!(config.endpoint.source, ConfigSource::Default);
        assert_eq!(config.boundary_cutoff.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_basemap() {
        assert_eq!(parse_basemap("OpenStreetMap").unwrap(), Basemap::OpenStreetMap);
        assert_eq!(parse_basemap("Google Terrain").unwrap(), Basemap::GoogleTerrain);
        assert_eq!(parse_basemap("google-hybrid").unwrap(), Basemap::GoogleHybrid);
        assert!(parse_basemap("satellite").is_err());
    }

    #[test]
    fn test_parse_backend_kind() {
        assert_eq!(parse_backend_kind("MEMORY").unwrap(), BackendKind::Memory);
        assert_eq!(parse_backend_kind("remote").unwrap(), BackendKind::Http);
        assert!(parse_backend_kind("grpc").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();
        assert_eq!(map.get("backend").unwrap().0, "memory");
        assert_eq!(map.get("basemap").unwrap().0, "OpenStreetMap");
        assert_eq!(map.get("boundary_cutoff").unwrap().0, "0.9");
        assert_eq!(map.len(), 4);
    }
}
