use geo::{Centroid, GeodesicArea, MultiPolygon, Point};

/// Square meters in one hectare
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Area on the WGS 84 ellipsoid, in square meters
pub fn geodesic_area_m2(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.geodesic_area_unsigned()
}

pub fn to_hectares(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_HECTARE
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn centroid(geometry: &MultiPolygon<f64>) -> Option<Point<f64>> {
    geometry.centroid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{meters_per_degree_lat, meters_per_degree_lon};
    use geo::Rect;

    fn square_m(lat: f64, side_m: f64) -> MultiPolygon<f64> {
        let w = side_m / meters_per_degree_lon(lat);
        let h = side_m / meters_per_degree_lat(lat);
        MultiPolygon::new(vec![Rect::new((80.0, lat), (80.0 + w, lat + h)).to_polygon()])
    }

    #[test]
    fn test_hundred_meter_square_is_one_hectare() {
        let ha = to_hectares(geodesic_area_m2(&square_m(13.0, 100.0)));
        assert!((ha - 1.0).abs() < 0.01, "area = {} ha", ha);
        assert_eq!(round_to(ha, 2), 1.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345_67, 2), 12.35);
        assert_eq!(round_to(80.004, 2), 80.0);
        assert_eq!(round_to(-0.125, 1), -0.1);
    }

    #[test]
    fn test_centroid() {
        let square = MultiPolygon::new(vec![Rect::new((80.0, 13.0), (80.02, 13.02)).to_polygon()]);
        let c = centroid(&square).unwrap();
        assert_eq!((round_to(c.x(), 2), round_to(c.y(), 2)), (80.01, 13.01));
        assert!(centroid(&MultiPolygon::new(vec![])).is_none());
    }
}
