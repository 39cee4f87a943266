//! Vectorized polygons must cover exactly the cells that produced them

use geo::{MultiPolygon, Rect};
use ndarray::Array2;
use proptest::prelude::*;
use waterspread_core::models::VectorizeParams;
use waterspread_geo::{dissolve, geodesic_area_m2, to_hectares, vectorize, SamplingGrid};

fn region(lat: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Rect::new((80.0, lat), (80.002, lat + 0.002)).to_polygon()])
}

fn water_mask(grid: &SamplingGrid, cells: &[bool]) -> Array2<bool> {
    let (rows, cols) = grid.shape();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        grid.is_inside(r, c) && cells[(r * cols + c) % cells.len()]
    })
}

#[test]
fn test_full_region_area_matches_cell_count() {
    let params = VectorizeParams::water_spread();
    let grid = SamplingGrid::for_region(&region(13.0), params.scale, params.max_pixels).unwrap();
    let mask = water_mask(&grid, &[true]);
    let attribute = mask.mapv(|set| set.then_some(0.5));

    let features = vectorize(&mask, &attribute, grid.transform(), &params);
    assert_eq!(features.len(), 1);

    let cells = mask.iter().filter(|&&v| v).count() as f64;
    assert_eq!(features[0].property("count"), Some(cells));
    assert_eq!(features[0].property("sum"), Some(cells * 0.5));

    let expected_ha = to_hectares(cells * params.scale * params.scale);
    let area_ha = to_hectares(geodesic_area_m2(&features[0].geometry));
    assert!((area_ha - expected_ha).abs() / expected_ha < 0.01);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_area_is_cell_count_times_scale_squared(
        cells in prop::collection::vec(any::<bool>(), 1..64),
        lat in -60.0f64..60.0,
    ) {
        let params = VectorizeParams::water_spread();
        let grid = SamplingGrid::for_region(&region(lat), params.scale, params.max_pixels).unwrap();
        let mask = water_mask(&grid, &cells);
        let attribute = mask.mapv(|set| set.then_some(1.0));
        let count = mask.iter().filter(|&&v| v).count() as f64;

        let features = vectorize(&mask, &attribute, grid.transform(), &params);
        let total: f64 = features.iter().map(|f| geodesic_area_m2(&f.geometry)).sum();
        let expected = count * params.scale * params.scale;

        prop_assert!((total - expected).abs() <= expected * 0.01 + 1e-6);

        match dissolve(&features) {
            Ok(merged) => {
                prop_assert!((geodesic_area_m2(&merged) - total).abs() <= total * 1e-6 + 1e-6)
            }
            Err(e) => {
                prop_assert!(features.is_empty());
                prop_assert!(e.is_vectorization_failure());
            }
        }
    }
}
