use async_trait::async_trait;
use geo::MultiPolygon;
use waterspread_core::models::{CompositeQuery, ExtentQuery, VectorFeature};
use waterspread_core::Result;

/// Port for the imagery service that evaluates raster queries
#[async_trait]
pub trait ImageryBackend: Send + Sync {
    /// Short backend name for logs and reports
    fn name(&self) -> &str;

    /// Vectorized connected components of the historical maximum water extent
    async fn extent_vectors(&self, query: &ExtentQuery) -> Result<Vec<VectorFeature>>;

    /// Vectorized water mask of a max-composited, cloud-masked spectral index.
    ///
    /// Fails with `Vectorization` or `TooManyPixels` when the mask cannot be vectorized.
    async fn composite_vectors(&self, query: &CompositeQuery) -> Result<Vec<VectorFeature>>;

    /// Geodesic area of a geometry in square meters
    async fn area(&self, geometry: &MultiPolygon<f64>) -> Result<f64>;
}
