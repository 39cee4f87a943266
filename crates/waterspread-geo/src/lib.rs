//! Waterspread Geo - Raster processing on sampling grids
//!
//! The building blocks the in-process imagery backend composes into the two
//! queries: sampling a region at a fixed linear scale, cloud-masked spectral
//! compositing, connected-component labeling, and raster-to-polygon
//! vectorization. Geodesic area helpers are shared with the analysis layer.

pub mod area;
pub mod components;
pub mod grid;
pub mod raster;
pub mod spectral;
pub mod vectorize;

pub use area::{centroid, geodesic_area_m2, round_to, to_hectares};
pub use components::{connected_regions, label_components};
pub use grid::{estimate_pixels, meters_per_degree_lat, meters_per_degree_lon, SamplingGrid};
pub use raster::{GridTransform, Raster};
pub use spectral::{composite_index, filter_scenes, normalized_difference, Scene};
pub use vectorize::{clip, dissolve, vectorize};
