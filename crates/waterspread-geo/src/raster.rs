//! Georeferenced single-band rasters in geographic coordinates

use geo::{coord, Coord, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// North-up affine georeference: row 0 is the northern edge, column 0 the western edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    /// Longitude of the western edge of column 0
    pub origin_x: f64,
    /// Latitude of the northern edge of row 0
    pub origin_y: f64,
    /// Cell width in degrees
    pub pixel_width: f64,
    /// Cell height in degrees, positive
    pub pixel_height: f64,
}

impl GridTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self { origin_x, origin_y, pixel_width, pixel_height }
    }

    /// Fractional (row, col) of a coordinate
    pub fn pixel_of(&self, c: Coord<f64>) -> (f64, f64) {
        ((self.origin_y - c.y) / self.pixel_height, (c.x - self.origin_x) / self.pixel_width)
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Coord<f64> {
        coord! {
            x: self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            y: self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        }
    }

    /// Cell bounds spanning `cols` cells to the east
    pub fn run_rect(&self, row: usize, col: usize, cols: usize) -> Rect<f64> {
        let west = self.origin_x + col as f64 * self.pixel_width;
        let north = self.origin_y - row as f64 * self.pixel_height;
        Rect::new(
            coord! { x: west, y: north - self.pixel_height },
            coord! { x: west + cols as f64 * self.pixel_width, y: north },
        )
    }

    /// Bounds of a `rows` x `cols` raster
    pub fn bounds(&self, rows: usize, cols: usize) -> Rect<f64> {
        Rect::new(
            coord! { x: self.origin_x, y: self.origin_y - rows as f64 * self.pixel_height },
            coord! { x: self.origin_x + cols as f64 * self.pixel_width, y: self.origin_y },
        )
    }
}

/// Single-band raster; `None` marks masked (no-data) cells
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    pub transform: GridTransform,
    pub data: Array2<Option<T>>,
}

impl<T: Copy> Raster<T> {
    pub fn new(transform: GridTransform, data: Array2<Option<T>>) -> Self {
        Self { transform, data }
    }

    /// Fully valid raster
    pub fn from_values(transform: GridTransform, values: Array2<T>) -> Self {
        Self { transform, data: values.mapv(Some) }
    }

    /// Nearest-neighbour value at a coordinate; `None` outside the raster or where masked
    pub fn sample(&self, c: Coord<f64>) -> Option<T> {
        let (row, col) = self.transform.pixel_of(c);
        if row < 0.0 || col < 0.0 {
            return None;
        }
        let (row, col) = (row.floor() as usize, col.floor() as usize);
        self.data.get((row, col)).copied().flatten()
    }
}
