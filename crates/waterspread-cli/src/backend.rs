use anyhow::Result;
use std::path::Path;
use waterspread_backend::{HttpBackend, ImageryBackend, MemoryBackend};
use waterspread_core::config::{BackendKind, LayeredConfig};

use crate::errors;

/// Build the configured imagery backend
pub fn connect(config: &LayeredConfig, scene: Option<&Path>) -> Result<Box<dyn ImageryBackend>> {
    match config.backend.value {
        BackendKind::Memory => {
            let path = scene.ok_or_else(errors::scene_required)?;
            Ok(Box::new(MemoryBackend::from_scene_file(path)?))
        }
        BackendKind::Http => {
            tracing::info!("Using imagery service at {}", config.endpoint.value);
            Ok(Box::new(HttpBackend::from_env(config.endpoint.value.as_str())))
        }
    }
}
