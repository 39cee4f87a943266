//! Sampling grids: a region of interest discretized at a linear scale in meters.
//!
//! The grid is anchored at the north-west corner of the region's bounding box.
//! Cell size in degrees is derived from the requested scale at the latitude of
//! the box center, so cells are close to square on the ground. A cell belongs
//! to the region when its center does; everything outside is clipped away.

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use ndarray::Array2;

use crate::raster::{GridTransform, Raster};
use waterspread_core::{Result, WaterspreadError};

/// Length of one degree of latitude in meters (WGS 84)
pub fn meters_per_degree_lat(lat_deg: f64) -> f64 {
    let phi = lat_deg.to_radians();
    111_132.92 - 559.82 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos()
}

/// Length of one degree of longitude in meters (WGS 84)
pub fn meters_per_degree_lon(lat_deg: f64) -> f64 {
    let phi = lat_deg.to_radians();
    111_412.84 * phi.cos() - 93.5 * (3.0 * phi).cos()
}

/// Number of cells a grid over `region` at `scale` meters would have, checked against `max_pixels`
pub fn estimate_pixels(region: &MultiPolygon<f64>, scale: f64, max_pixels: u64) -> Result<u64> {
    let (_, rows, cols) = layout(region, scale)?;
    check_pixels(rows, cols, max_pixels)
}

fn check_pixels(rows: f64, cols: f64, max_pixels: u64) -> Result<u64> {
    let count = rows * cols;
    if count > max_pixels as f64 {
        return Err(WaterspreadError::TooManyPixels { count: count as u64, max: max_pixels });
    }
    Ok(count as u64)
}

/// Grid georeference plus row and column counts
fn layout(region: &MultiPolygon<f64>, scale: f64) -> Result<(GridTransform, f64, f64)> {
    let bounds = region.bounding_rect().ok_or_else(|| WaterspreadError::InvalidGeometry {
        feature_id: "region".to_string(),
        reason: "Region has no extent".to_string(),
    })?;

    let mid_lat = bounds.center().y;
    let lon_step = meters_per_degree_lon(mid_lat);
    if !scale.is_finite() || scale <= 0.0 || lon_step <= 0.0 {
        return Err(WaterspreadError::InvalidGeometry {
            feature_id: "region".to_string(),
            reason: format!("Cannot sample at {} m near latitude {:.4}", scale, mid_lat),
        });
    }
    let pixel_width = scale / lon_step;
    let pixel_height = scale / meters_per_degree_lat(mid_lat);

    let cols = (bounds.width() / pixel_width).ceil().max(1.0);
    let rows = (bounds.height() / pixel_height).ceil().max(1.0);
    let transform = GridTransform::new(bounds.min().x, bounds.max().y, pixel_width, pixel_height);

    Ok((transform, rows, cols))
}

#[derive(Debug, Clone)]
pub struct SamplingGrid {
    transform: GridTransform,
    scale: f64,
    inside: Array2<bool>,
}

impl SamplingGrid {
    /// Discretize `region` at `scale` meters, refusing grids above `max_pixels` cells
    pub fn for_region(region: &MultiPolygon<f64>, scale: f64, max_pixels: u64) -> Result<Self> {
        let (transform, rows, cols) = layout(region, scale)?;
        check_pixels(rows, cols, max_pixels)?;
        let (rows, cols) = (rows as usize, cols as usize);

        let inside = Array2::from_shape_fn((rows, cols), |(r, c)| {
            region.contains(&Point::from(transform.cell_center(r, c)))
        });

        let grid = Self { transform, scale, inside };
        tracing::debug!(
            "Sampling grid {}x{} at {} m ({} cells inside region)",
            rows,
            cols,
            scale,
            grid.inside_count()
        );

        Ok(grid)
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Linear scale in meters
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn shape(&self) -> (usize, usize) {
        self.inside.dim()
    }

    pub fn is_inside(&self, row: usize, col: usize) -> bool {
        self.inside.get((row, col)).copied().unwrap_or(false)
    }

    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&v| v).count()
    }

    /// Resample a raster onto the grid (nearest neighbour), clipped to the region
    pub fn sample<T: Copy>(&self, raster: &Raster<T>) -> Array2<Option<T>> {
        Array2::from_shape_fn(self.shape(), |(r, c)| {
            if self.is_inside(r, c) {
                raster.sample(self.transform.cell_center(r, c))
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Rect};
    use ndarray::array;

    fn square_region(size_deg: f64) -> MultiPolygon<f64> {
        let rect = Rect::new((80.0, 13.0), (80.0 + size_deg, 13.0 + size_deg));
        MultiPolygon::new(vec![rect.to_polygon()])
    }

    #[test]
    fn test_meters_per_degree() {
        assert!((meters_per_degree_lat(0.0) - 110_574.0).abs() < 1.0);
        assert!((meters_per_degree_lon(0.0) - 111_319.0).abs() < 1.0);
        assert!((meters_per_degree_lat(45.0) - 111_132.0).abs() < 2.0);
        assert!(meters_per_degree_lon(60.0) < meters_per_degree_lon(30.0));
    }

    #[test]
    fn test_grid_dimensions() {
        // 0.01 degrees is roughly 1.1 km
        let grid = SamplingGrid::for_region(&square_region(0.01), 10.0, 1_000_000).unwrap();
        let (rows, cols) = grid.shape();
        assert!((108..=112).contains(&rows), "rows = {}", rows);
        assert!((106..=110).contains(&cols), "cols = {}", cols);
        assert_eq!(grid.scale(), 10.0);
        // Cells past the eastern or southern edge fall outside the region
        assert!(grid.inside_count() >= (rows - 1) * (cols - 1));
        assert!(grid.inside_count() <= rows * cols);
    }

    #[test]
    fn test_grid_clips_to_region() {
        let triangle = MultiPolygon::new(vec![polygon![
            (x: 80.0, y: 13.0),
            (x: 80.01, y: 13.0),
            (x: 80.0, y: 13.01),
            (x: 80.0, y: 13.0),
        ]]);
        let grid = SamplingGrid::for_region(&triangle, 30.0, 1_000_000).unwrap();
        let (rows, cols) = grid.shape();
        let inside = grid.inside_count();
        assert!(inside > rows * cols / 3 && inside < rows * cols * 2 / 3);
        // North-east corner lies outside the triangle
        assert!(!grid.is_inside(0, cols - 1));
        assert!(grid.is_inside(rows - 1, 0));
    }

    #[test]
    fn test_too_many_pixels() {
        let err = SamplingGrid::for_region(&square_region(1.0), 10.0, 1_000).unwrap_err();
        match err {
            WaterspreadError::TooManyPixels { count, max } => {
                assert!(count > 100_000_000);
                assert_eq!(max, 1_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_estimate_matches_grid() {
        let region = square_region(0.01);
        let grid = SamplingGrid::for_region(&region, 30.0, 1_000_000).unwrap();
        let (rows, cols) = grid.shape();
        assert_eq!(estimate_pixels(&region, 30.0, 1_000_000).unwrap(), (rows * cols) as u64);
        assert!(estimate_pixels(&region, 30.0, 10).is_err());
    }

    #[test]
    fn test_sample_onto_grid() {
        let region = square_region(0.002);
        let grid = SamplingGrid::for_region(&region, 100.0, 1_000).unwrap();
        let source = Raster::from_values(
            GridTransform::new(80.0, 13.002, 0.001, 0.001),
            array![[1u8, 2], [3, 4]],
        );

        let sampled = grid.sample(&source);
        assert_eq!(sampled.dim(), grid.shape());
        assert_eq!(sampled[[0, 0]], Some(1));
        assert_eq!(sampled[[1, 1]], Some(4));
        let (rows, cols) = grid.shape();
        assert_eq!((rows, cols), (3, 3));
        assert_eq!(sampled[[rows - 1, cols - 1]], None);
    }
}
