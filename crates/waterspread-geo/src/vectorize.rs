//! Raster-to-polygon conversion.
//!
//! Set cells of a mask are grouped into regions by 4- or 8-connectivity. Each
//! region becomes one feature whose geometry is the union of its cells, built
//! from horizontal runs so the union sees one rectangle per run rather than
//! one per cell. The attribute band is reduced over the region's cells.
//!
//! Cells are selected by their center, so edge cells can overhang the sampled
//! region; `clip` trims features back to it.

use geo::{unary_union, BooleanOps, MultiPolygon, Polygon};
use ndarray::Array2;

use crate::components::connected_regions;
use crate::raster::GridTransform;
use waterspread_core::models::{Kernel, VectorFeature, VectorizeParams};
use waterspread_core::{Result, WaterspreadError};

/// Property holding the mask value shared by every cell of a polygon
pub const LABEL_PROPERTY: &str = "label";

/// Property holding the number of cells in a polygon
pub const COUNT_PROPERTY: &str = "count";

/// Vectorize the set cells of `mask`, reducing `attribute` per polygon
pub fn vectorize(
    mask: &Array2<bool>,
    attribute: &Array2<Option<f64>>,
    transform: &GridTransform,
    params: &VectorizeParams,
) -> Vec<VectorFeature> {
    let kernel = if params.eight_connected { Kernel::square(1) } else { Kernel::plus(1) };
    let regions = connected_regions(mask, &kernel.offsets());

    regions
        .into_iter()
        .map(|mut cells| {
            cells.sort_unstable();
            let (first_row, first_col) = cells[0];

            let values: Vec<f64> =
                cells.iter().filter_map(|&cell| attribute.get(cell).copied().flatten()).collect();

            let id = format!("{}_{}", first_row, first_col);
            let mut feature = VectorFeature::new(id, region_geometry(&cells, transform))
                .with_property(LABEL_PROPERTY, 1.0)
                .with_property(COUNT_PROPERTY, cells.len() as f64);
            if let Some(reduced) = params.reducer.apply(&values) {
                feature = feature.with_property(params.reducer.output_name(), reduced);
            }
            feature
        })
        .collect()
}

/// Union of the cells of one region; `cells` must be sorted row-major
fn region_geometry(cells: &[(usize, usize)], transform: &GridTransform) -> MultiPolygon<f64> {
    let mut runs: Vec<Polygon<f64>> = Vec::new();
    let mut iter = cells.iter().copied().peekable();

    while let Some((row, start)) = iter.next() {
        let mut end = start;
        while let Some(&(next_row, next_col)) = iter.peek() {
            if next_row != row || next_col != end + 1 {
                break;
            }
            end = next_col;
            iter.next();
        }
        runs.push(transform.run_rect(row, start, end - start + 1).to_polygon());
    }

    unary_union(&runs)
}

/// Intersect each feature with `region`, dropping features left empty
pub fn clip(features: Vec<VectorFeature>, region: &MultiPolygon<f64>) -> Vec<VectorFeature> {
    features
        .into_iter()
        .filter_map(|mut feature| {
            feature.geometry = feature.geometry.intersection(region);
            (!feature.geometry.0.is_empty()).then_some(feature)
        })
        .collect()
}

/// Merge every feature into a single geometry
pub fn dissolve(features: &[VectorFeature]) -> Result<MultiPolygon<f64>> {
    if features.is_empty() {
        return Err(WaterspreadError::Vectorization {
            reason: "No features to dissolve".to_string(),
        });
    }

    let polygons: Vec<Polygon<f64>> =
        features.iter().flat_map(|f| f.geometry.0.iter().cloned()).collect();

    Ok(unary_union(&polygons))
}
