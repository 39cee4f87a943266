//! Synthetic imagery shared by the analysis tests

#![allow(dead_code)]

use chrono::NaiveDate;
use geo::{MultiPolygon, Polygon, Rect};
use ndarray::Array2;
use std::collections::HashMap;
use waterspread_core::models::Roi;
use waterspread_geo::{meters_per_degree_lat, meters_per_degree_lon, GridTransform, Raster, Scene};

/// Reflectances giving an index of exactly 0.5
pub const WATER: (f32, f32) = (0.75, 0.25);

/// Reflectances giving an index of exactly -0.5
pub const LAND: (f32, f32) = (0.25, 0.75);

/// QA value with the cloud bit set
pub const CLOUD: f32 = 1024.0;

/// QA value with the cirrus bit set
pub const CIRRUS: f32 = 2048.0;

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn rect(min: (f64, f64), max: (f64, f64)) -> Polygon<f64> {
    Rect::new(min, max).to_polygon()
}

pub fn roi(name: &str, polygon: Polygon<f64>) -> Roi {
    Roi::from_polygon(name, polygon).unwrap()
}

/// Square with `side_m` meter sides, south-west corner at (lon, lat)
pub fn square_m(lon: f64, lat: f64, side_m: f64) -> Polygon<f64> {
    let mid_lat = lat + side_m / meters_per_degree_lat(lat) / 2.0;
    let width = side_m / meters_per_degree_lon(mid_lat);
    let height = side_m / meters_per_degree_lat(mid_lat);
    rect((lon, lat), (lon + width, lat + height))
}

pub fn multi(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon])
}

/// Historical extent raster where `water` cells are 1 and the rest 0
pub fn extent(
    transform: GridTransform,
    shape: (usize, usize),
    water: &[(usize, usize)],
) -> Raster<u8> {
    let mut values = Array2::from_elem(shape, 0u8);
    for &cell in water {
        values[cell] = 1;
    }
    Raster::from_values(transform, values)
}

/// Scene with per-cell reflectance pairs and QA values
pub fn scene(
    id: &str,
    acquired: &str,
    transform: GridTransform,
    reflectance: Array2<(f32, f32)>,
    qa: Array2<f32>,
) -> Scene {
    let mut bands = HashMap::new();
    bands.insert("B3".to_string(), reflectance.mapv(|(green, _)| green));
    bands.insert("B8".to_string(), reflectance.mapv(|(_, nir)| nir));
    bands.insert("QA60".to_string(), qa);
    Scene { id: id.to_string(), acquired: date(acquired), transform, bands }
}

/// Cloud-free scene with the same reflectance everywhere
pub fn uniform_scene(
    id: &str,
    acquired: &str,
    transform: GridTransform,
    shape: (usize, usize),
    reflectance: (f32, f32),
) -> Scene {
    scene(id, acquired, transform, Array2::from_elem(shape, reflectance), Array2::zeros(shape))
}
