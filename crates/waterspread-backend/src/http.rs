//! Remote imagery service client.
//!
//! Query descriptions are POSTed as JSON with the region encoded as GeoJSON;
//! vector results come back as a GeoJSON FeatureCollection. The service answers
//! 422 when a mask cannot be vectorized, which maps to `Vectorization` so the
//! estimator can fall back to the declared boundary.

use async_trait::async_trait;
use geo::MultiPolygon;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ports::ImageryBackend;
use waterspread_core::models::{
    CloudMask, ComponentParams, CompositeQuery, DateRange, ExtentQuery, SpectralIndex,
    VectorFeature, VectorizeParams, AREA_MAX_ERROR_M,
};
use waterspread_core::{Result, WaterspreadError};
use waterspread_geo::estimate_pixels;

/// Environment variable holding the bearer token for the imagery service
pub const TOKEN_ENV: &str = "WATERSPREAD_BACKEND_TOKEN";

pub struct HttpBackend {
    /// Base URL of the imagery service (e.g., "http://localhost:8080")
    endpoint: String,

    token: Option<String>,

    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Client for `endpoint`, authenticated when the token variable is set
    pub fn from_env(endpoint: impl Into<String>) -> Self {
        let backend = Self::new(endpoint);
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => backend.with_token(token),
            _ => backend,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| WaterspreadError::BackendUnavailable {
            reason: format!("Failed to reach imagery service at {}: {}", self.endpoint, e),
            remediation: format!(
                "Check that the service is running at {} \
                 or set backend = \"memory\" with a scene file",
                self.endpoint
            ),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(WaterspreadError::Vectorization { reason: error_text });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WaterspreadError::BackendUnavailable {
                reason: format!("Imagery service rejected credentials ({})", status),
                remediation: format!("Set {} to a valid token", TOKEN_ENV),
            });
        }

        Err(WaterspreadError::BackendResponse {
            reason: format!("{} returned {}: {}", path, status, error_text),
        })
    }

    async fn post_for_features<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<VectorFeature>> {
        let collection: geojson::FeatureCollection =
            self.post(path, body).await?.json().await.map_err(|e| {
                WaterspreadError::BackendResponse {
                    reason: format!("Invalid FeatureCollection from {}: {}", path, e),
                }
            })?;

        collection
            .features
            .iter()
            .enumerate()
            .map(|(idx, feature)| VectorFeature::from_geojson(feature, idx))
            .collect()
    }
}

#[async_trait]
impl ImageryBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn extent_vectors(&self, query: &ExtentQuery) -> Result<Vec<VectorFeature>> {
        estimate_pixels(&query.region, query.vectorize.scale, query.vectorize.max_pixels)?;

        let body = ExtentRequest {
            region: region_geojson(&query.region),
            dataset: &query.dataset,
            band: &query.band,
            components: &query.components,
            vectorize: &query.vectorize,
        };
        self.post_for_features("/v1/extent/vectors", &body).await
    }

    async fn composite_vectors(&self, query: &CompositeQuery) -> Result<Vec<VectorFeature>> {
        estimate_pixels(&query.region, query.vectorize.scale, query.vectorize.max_pixels)?;

        let body = CompositeRequest {
            region: region_geojson(&query.region),
            collection: &query.collection,
            dates: &query.dates,
            cloud_mask: &query.cloud_mask,
            index: &query.index,
            threshold: query.threshold,
            vectorize: &query.vectorize,
        };
        self.post_for_features("/v1/composite/vectors", &body).await
    }

    async fn area(&self, geometry: &MultiPolygon<f64>) -> Result<f64> {
        let body = AreaRequest { geometry: region_geojson(geometry), max_error: AREA_MAX_ERROR_M };
        let response: AreaResponse =
            self.post("/v1/area", &body).await?.json().await.map_err(|e| {
                WaterspreadError::BackendResponse {
                    reason: format!("Invalid area response: {}", e),
                }
            })?;
        Ok(response.area_m2)
    }
}

fn region_geojson(region: &MultiPolygon<f64>) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::from(region))
}

#[derive(Debug, Serialize)]
struct ExtentRequest<'a> {
    region: geojson::Geometry,
    dataset: &'a str,
    band: &'a str,
    components: &'a ComponentParams,
    vectorize: &'a VectorizeParams,
}

#[derive(Debug, Serialize)]
struct CompositeRequest<'a> {
    region: geojson::Geometry,
    collection: &'a str,
    dates: &'a DateRange,
    cloud_mask: &'a CloudMask,
    index: &'a SpectralIndex,
    threshold: f64,
    vectorize: &'a VectorizeParams,
}

#[derive(Debug, Serialize)]
struct AreaRequest {
    geometry: geojson::Geometry,
    /// Tolerated error in meters
    max_error: f64,
}

#[derive(Debug, Deserialize)]
struct AreaResponse {
    area_m2: f64,
}
