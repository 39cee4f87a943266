//! Full runs: declared and detected boundaries

mod common;

use common::{date, extent, multi, rect, roi, square_m, uniform_scene, WATER};
use waterspread_analysis::{
    tank_summary, BoundarySource, RunOutcome, RunPipeline, RunRequest,
};
use waterspread_backend::MemoryBackend;
use waterspread_core::models::{DateRange, Roi};
use waterspread_geo::GridTransform;

fn year_2020() -> DateRange {
    DateRange::new(date("2020-01-01"), date("2020-12-31"))
}

/// Extent raster with a 4x4 cell reservoir, and one flooded scene over it
fn reservoir_backend() -> MemoryBackend {
    let transform = GridTransform::new(80.0, 13.012, 0.001, 0.001);
    let water: Vec<(usize, usize)> = (2..6).flat_map(|r| (2..6).map(move |c| (r, c))).collect();

    MemoryBackend::new()
        .with_extent(extent(transform, (12, 12), &water))
        .with_scene(uniform_scene("S2A_20200610", "2020-06-10", transform, (12, 12), WATER))
}

#[tokio::test]
async fn test_declared_tank_run() {
    let scene_transform = GridTransform::new(79.999, 13.002, 0.0005, 0.0005);
    let backend = MemoryBackend::new()
        .with_scene(uniform_scene("S2A_20200115", "2020-01-15", scene_transform, (6, 6), WATER));

    let request = RunRequest {
        roi: roi("tank", square_m(80.0, 13.0, 100.0)),
        boundary: BoundarySource::Declared,
        dates: year_2020(),
    };

    let outcome = RunPipeline::new(&backend).run(&request).await.unwrap();
    let RunOutcome::Estimated(report) = outcome else {
        panic!("declared tank must be estimated");
    };

    assert!(report.detection.is_none());
    assert_eq!(report.tank, request.roi);
    assert!((report.summary.area_ha - 1.0).abs() < 0.015);
    assert_eq!((report.summary.centroid_lat, report.summary.centroid_lon), (13.0, 80.0));
    assert!((report.spread.area_ha - 1.0).abs() < 0.015);
    assert!(!report.spread.fallback());

    let layer = report.plot_layer();
    assert_eq!(layer.features.len(), 2);
}

#[tokio::test]
async fn test_detected_tank_run() {
    let backend = reservoir_backend();
    let request = RunRequest {
        roi: roi("drawn", rect((80.0, 13.0), (80.012, 13.012))),
        boundary: BoundarySource::Detect,
        dates: year_2020(),
    };

    let outcome = RunPipeline::new(&backend).run(&request).await.unwrap();
    let RunOutcome::Estimated(report) = outcome else {
        panic!("reservoir must be detected");
    };

    let detection = report.detection.as_ref().unwrap();
    assert_eq!(detection.tank.len(), 1);
    assert_eq!(report.tank.name(), "drawn (detected)");

    // The reservoir center is at (80.004, 13.008)
    assert_eq!((report.summary.centroid_lat, report.summary.centroid_lon), (13.01, 80.0));

    // Fully flooded: the spread fills the detected tank
    let ratio = report.spread.area_ha / report.summary.area_ha;
    assert!(
        ratio > 0.9 && ratio < 1.1,
        "spread {} vs tank {}",
        report.spread.area_ha,
        report.summary.area_ha
    );
}

#[tokio::test]
async fn test_boundary_not_found_ends_run() {
    let transform = GridTransform::new(80.0, 13.012, 0.001, 0.001);
    let backend = MemoryBackend::new().with_extent(extent(transform, (12, 12), &[]));
    let request = RunRequest {
        roi: roi("drawn", rect((80.0, 13.0), (80.012, 13.012))),
        boundary: BoundarySource::Detect,
        dates: year_2020(),
    };

    let outcome = RunPipeline::new(&backend).run(&request).await.unwrap();
    let RunOutcome::BoundaryNotFound(detection) = outcome else {
        panic!("expected boundary not found");
    };
    assert!(detection.is_empty());
}

#[tokio::test]
async fn test_invalid_cutoff_rejected_when_detecting() {
    let backend = reservoir_backend();
    let request = RunRequest {
        roi: roi("drawn", rect((80.0, 13.0), (80.012, 13.012))),
        boundary: BoundarySource::Detect,
        dates: year_2020(),
    };
    assert!(RunPipeline::new(&backend).with_cutoff(2.0).run(&request).await.is_err());
}

#[tokio::test]
async fn test_summary_uses_first_feature_centroid() {
    let backend = MemoryBackend::new();
    let tank = Roi::new(
        "two basins",
        vec![multi(rect((80.0, 13.0), (80.02, 13.02))), multi(rect((81.0, 14.0), (81.02, 14.02)))],
    )
    .unwrap();

    let summary = tank_summary(&backend, &tank).await.unwrap();
    assert_eq!((summary.centroid_lat, summary.centroid_lon), (13.01, 80.01));

    let one = tank_summary(&backend, &Roi::new("one", vec![tank.parts()[0].clone()]).unwrap())
        .await
        .unwrap();
    assert!(summary.area_ha > one.area_ha * 1.9);
}
