use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use waterspread_analysis::BoundarySource;
use waterspread_core::config::{BackendKind, CliConfigOverrides};
use waterspread_core::models::Basemap;

/// Waterspread - Seasonal water-spread estimation for irrigation tanks
#[derive(Parser, Debug)]
#[command(name = "waterspread")]
#[command(about = "Seasonal water-spread estimation for irrigation tanks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./waterspread.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Imagery backend to use
    #[arg(long, global = true)]
    pub backend: Option<BackendArg>,

    /// Scene file for the memory backend
    #[arg(long, global = true, value_name = "FILE")]
    pub scene: Option<PathBuf>,

    /// Base URL of the remote imagery service (http backend)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Basemap reported for the map renderer
    #[arg(long, global = true)]
    pub basemap: Option<BasemapArg>,

    /// Share of the largest component's area a component needs to count as the tank
    #[arg(long, global = true, value_name = "FRACTION")]
    pub boundary_cutoff: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            backend: self.backend.map(Into::into),
            endpoint: self.endpoint.clone(),
            basemap: self.basemap.map(Into::into),
            boundary_cutoff: self.boundary_cutoff,
        }
    }
}

/// Imagery backend selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// In-process backend over a scene file
    Memory,
    /// Remote imagery service
    Http,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => BackendKind::Memory,
            BackendArg::Http => BackendKind::Http,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasemapArg {
    Osm,
    Terrain,
    Hybrid,
}

impl From<BasemapArg> for Basemap {
    fn from(arg: BasemapArg) -> Self {
        match arg {
            BasemapArg::Osm => Basemap::OpenStreetMap,
            BasemapArg::Terrain => Basemap::GoogleTerrain,
            BasemapArg::Hybrid => Basemap::GoogleHybrid,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the tank boundary inside a containing region
    Detect(DetectArgs),

    /// Estimate the water spread of a declared tank boundary
    Estimate(EstimateArgs),

    /// Resolve the boundary, summarize the tank and estimate its water spread
    Run(RunArgs),

    /// Show configuration values and where they come from
    Config,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Region file (GeoJSON, shapefile, or zipped shapefile)
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DateArgs {
    /// First day of the range, inclusive (YYYY-MM-DD)
    #[arg(long, default_value = "2016-03-01")]
    pub start: String,

    /// Last day of the range, exclusive (YYYY-MM-DD)
    #[arg(long, default_value = "2022-03-31")]
    pub end: String,
}

#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Tank boundary file (GeoJSON, shapefile, or zipped shapefile)
    pub path: PathBuf,

    #[command(flatten)]
    pub dates: DateArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Boundary or region file (GeoJSON, shapefile, or zipped shapefile)
    pub path: PathBuf,

    /// Whether the file is the tank boundary itself
    #[arg(long, default_value = "yes")]
    pub boundary: BoundaryFlag,

    #[command(flatten)]
    pub dates: DateArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BoundaryFlag {
    /// The file is the tank boundary
    Yes,
    /// The file contains the tank; detect its boundary first
    No,
}

impl From<BoundaryFlag> for BoundarySource {
    fn from(flag: BoundaryFlag) -> Self {
        match flag {
            BoundaryFlag::Yes => BoundarySource::Declared,
            BoundaryFlag::No => BoundarySource::Detect,
        }
    }
}
