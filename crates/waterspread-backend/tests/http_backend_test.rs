//! HttpBackend against a one-shot local HTTP server

use geo::{MultiPolygon, Rect};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use waterspread_backend::{HttpBackend, ImageryBackend};
use waterspread_core::models::{CompositeQuery, DateRange, ExtentQuery};
use waterspread_core::WaterspreadError;

/// Serve a single canned response; the handle yields the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        // Read headers, then the body announced by content-length
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{}", addr), handle)
}

fn region() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Rect::new((80.0, 13.0), (80.01, 13.01)).to_polygon()])
}

#[tokio::test]
async fn test_composite_vectors_parses_feature_collection() {
    let (endpoint, handle) = serve_once(
        "200 OK",
        r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature", "id": "+12-34",
            "geometry": {"type": "Polygon", "coordinates": [[[80.0, 13.0], [80.001, 13.0], [80.001, 13.001], [80.0, 13.0]]]},
            "properties": {"label": 1, "sum": 4.5}
        }]}"#,
    )
    .await;

    let backend = HttpBackend::new(endpoint).with_token("secret");
    let query = CompositeQuery::water_spread(region(), DateRange::session_default());
    let features = backend.composite_vectors(&query).await.unwrap();

    assert_eq!(features.len(), 1);
    assert_eq!(features[0].id, "+12-34");
    assert_eq!(features[0].property("sum"), Some(4.5));

    let request = handle.await.unwrap();
    assert!(request.starts_with("POST /v1/composite/vectors"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
    assert!(request.contains("\"collection\":\"COPERNICUS/S2\""));
}

#[tokio::test]
async fn test_unprocessable_maps_to_vectorization() {
    let (endpoint, _handle) =
        serve_once("422 Unprocessable Entity", r#"{"error": "empty mask"}"#).await;

    let backend = HttpBackend::new(endpoint);
    let query = CompositeQuery::water_spread(region(), DateRange::session_default());
    let err = backend.composite_vectors(&query).await.unwrap_err();

    assert!(matches!(err, WaterspreadError::Vectorization { .. }));
    assert!(err.is_vectorization_failure());
}

#[tokio::test]
async fn test_server_error_is_not_a_vectorization_failure() {
    let (endpoint, _handle) = serve_once("500 Internal Server Error", "boom").await;

    let err = HttpBackend::new(endpoint)
        .extent_vectors(&ExtentQuery::historical(region()))
        .await
        .unwrap_err();

    assert!(matches!(err, WaterspreadError::BackendResponse { .. }));
    assert!(!err.is_vectorization_failure());
}

#[tokio::test]
async fn test_area_endpoint() {
    let (endpoint, handle) = serve_once("200 OK", r#"{"area_m2": 12345.6}"#).await;

    let area = HttpBackend::new(endpoint).area(&region()).await.unwrap();
    assert_eq!(area, 12345.6);

    let request = handle.await.unwrap();
    assert!(request.starts_with("POST /v1/area"));
    assert!(request.contains("\"max_error\":10.0"));
}

#[tokio::test]
async fn test_unreachable_service() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpBackend::new(format!("http://{}", addr)).area(&region()).await.unwrap_err();
    assert!(matches!(err, WaterspreadError::BackendUnavailable { .. }));
}

#[tokio::test]
async fn test_oversized_region_is_rejected_before_sending() {
    let huge = MultiPolygon::new(vec![Rect::new((60.0, 5.0), (100.0, 35.0)).to_polygon()]);
    let backend = HttpBackend::new("http://127.0.0.1:9");

    let err = backend.extent_vectors(&ExtentQuery::historical(huge)).await.unwrap_err();
    assert!(matches!(err, WaterspreadError::TooManyPixels { .. }));
}
