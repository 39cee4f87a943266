//! Fixed set of basemaps offered to the map renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Basemap {
    #[default]
    OpenStreetMap,
    GoogleTerrain,
    GoogleHybrid,
}

impl Basemap {
    pub const ALL: [Basemap; 3] =
        [Basemap::OpenStreetMap, Basemap::GoogleTerrain, Basemap::GoogleHybrid];

    /// XYZ tile URL template
    pub fn tile_url(&self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Basemap::GoogleTerrain => "https://mt1.google.com/vt/lyrs=p&x={x}&y={y}&z={z}",
            Basemap::GoogleHybrid => "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "OpenStreetMap",
            Basemap::GoogleTerrain => "Google Terrain",
            Basemap::GoogleHybrid => "Google Hybrid",
        }
    }
}

impl fmt::Display for Basemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
