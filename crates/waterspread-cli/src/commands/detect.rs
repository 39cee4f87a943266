//! Detect command implementation

use anyhow::Result;
use std::path::Path;
use waterspread_analysis::{tank_summary, BoundaryDetector};
use waterspread_core::config::LayeredConfig;
use waterspread_core::formats::load_roi;

use super::{print_detection, print_summary};
use crate::backend;
use crate::cli::DetectArgs;
use crate::output::OutputWriter;
use crate::output_types::DetectOutput;

pub async fn execute(
    args: DetectArgs,
    config: &LayeredConfig,
    scene: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let region = load_roi(&args.path).await?;
    output.success(format!(
        "Loaded region {} ({} feature(s))",
        region.name(),
        region.parts().len()
    ));

    let backend = backend::connect(config, scene)?;
    let detection = BoundaryDetector::new(backend.as_ref())
        .with_cutoff(config.boundary_cutoff.value)?
        .detect(&region)
        .await?;

    let summary = match detection.tank_roi(region.name())? {
        Some(tank) => Some(tank_summary(backend.as_ref(), &tank).await?),
        None => None,
    };

    if output.is_json() {
        return output.result(DetectOutput {
            region: region.name().to_string(),
            boundary_found: summary.is_some(),
            detection: (&detection).into(),
            summary,
        });
    }

    print_detection(&detection, output);
    match summary {
        Some(summary) => print_summary(&summary, output),
        None => output.warning(format!(
            "Boundary not found: no historical water in {}",
            region.name()
        )),
    }

    Ok(())
}
