//! Waterspread Analysis - Tank boundary detection and water-spread estimation
//!
//! The two procedures run against any `ImageryBackend`; `RunPipeline` chains
//! them the way an analyst session does.

pub mod boundary;
pub mod models;
pub mod pipeline;
pub mod spread;

pub use boundary::BoundaryDetector;
pub use models::{
    BoundaryDetection, CandidateArea, RunOutcome, RunReport, SpreadOutline, TankSummary,
    WaterSpread,
};
pub use pipeline::{tank_summary, BoundarySource, RunPipeline, RunRequest};
pub use spread::WaterSpreadEstimator;
