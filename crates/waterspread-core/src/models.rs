pub mod basemap;
pub mod dates;
pub mod geometry;
pub mod query;

pub use basemap::Basemap;
pub use dates::{imagery_floor, parse_date, DateRange};
pub use geometry::{
    feature_collection, into_multi_polygon, validate_polygon, Crs, Roi, VectorFeature,
};
pub use query::{
    CloudMask, ComponentParams, CompositeQuery, ExtentQuery, Kernel, KernelShape, Reducer,
    SpectralIndex, VectorizeParams, AREA_MAX_ERROR_M, HISTORICAL_EXTENT_SCALE_M,
    WATER_SPREAD_SCALE_M,
};
