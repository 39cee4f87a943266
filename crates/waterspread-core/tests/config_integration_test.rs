//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use waterspread_core::config::{
    BackendKind, CliConfigOverrides, ConfigSource, LayeredConfig, DEFAULT_BOUNDARY_CUTOFF,
};
use waterspread_core::models::Basemap;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [
        "WATERSPREAD_BACKEND",
        "WATERSPREAD_ENDPOINT",
        "WATERSPREAD_BASEMAP",
        "WATERSPREAD_BOUNDARY_CUTOFF",
    ] {
        env::remove_var(key);
    }
}

#[test]
fn test_default_configuration() {
    let config = LayeredConfig::with_defaults();

    assert_eq!(config.backend.value, BackendKind::Memory);
    assert_eq!(config.backend.source, ConfigSource::Default);
    assert_eq!(config.basemap.value, Basemap::OpenStreetMap);
    assert_eq!(config.boundary_cutoff.value, DEFAULT_BOUNDARY_CUTOFF);
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
backend = "http"
endpoint = "http://imagery.internal:9000"
boundary_cutoff = 0.75
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.backend.value, BackendKind::Http);
    assert_eq!(config.backend.source, ConfigSource::File);
    assert_eq!(config.endpoint.value, "http://imagery.internal:9000");
    assert_eq!(config.boundary_cutoff.value, 0.75);
    // Untouched keys keep their defaults
    assert_eq!(config.basemap.source, ConfigSource::Default);
}

#[test]
fn test_file_with_invalid_cutoff_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "boundary_cutoff = 1.5").unwrap();

    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "basemap = \"terrain\"").unwrap();

    env::set_var("WATERSPREAD_BASEMAP", "hybrid");
    env::set_var("WATERSPREAD_BOUNDARY_CUTOFF", "0.8");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.basemap.value, Basemap::GoogleHybrid);
    assert_eq!(config.basemap.source, ConfigSource::Environment);
    assert_eq!(config.boundary_cutoff.value, 0.8);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("WATERSPREAD_BACKEND", "satellite");
    env::set_var("WATERSPREAD_BOUNDARY_CUTOFF", "zero");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.backend.value, BackendKind::Memory);
    assert_eq!(config.backend.source, ConfigSource::Default);
    assert_eq!(config.boundary_cutoff.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    env::set_var("WATERSPREAD_BACKEND", "http");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        backend: Some(BackendKind::Memory),
        boundary_cutoff: Some(0.5),
        ..Default::default()
    });

    assert_eq!(config.backend.value, BackendKind::Memory);
    assert_eq!(config.backend.source, ConfigSource::Cli);
    assert_eq!(config.boundary_cutoff.value, 0.5);

    let map = config.to_inspection_map();
    assert_eq!(map["backend"], ("memory".to_string(), ConfigSource::Cli));

    clear_env();
}
