//! Run command implementation

use anyhow::Result;
use std::path::Path;
use waterspread_analysis::{BoundarySource, RunOutcome, RunPipeline, RunRequest};
use waterspread_core::config::LayeredConfig;
use waterspread_core::formats::load_roi;

use super::{parse_dates, print_detection, print_spread, print_summary};
use crate::backend;
use crate::cli::RunArgs;
use crate::output::OutputWriter;
use crate::output_types::{DetectionOutput, RunOutput};

pub async fn execute(
    args: RunArgs,
    config: &LayeredConfig,
    scene: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let dates = parse_dates(&args.dates)?;
    let roi = load_roi(&args.path).await?;
    output.success(format!("Loaded {} ({} feature(s))", roi.name(), roi.parts().len()));

    let boundary = BoundarySource::from(args.boundary);
    let basemap = config.basemap.value;
    output.info(format!("Basemap: {} ({})", basemap, basemap.tile_url()));
    output.info(format!("The selected date range is from {} to {}", dates.start, dates.end));

    let backend = backend::connect(config, scene)?;
    let request = RunRequest { roi, boundary, dates };
    let outcome = RunPipeline::new(backend.as_ref())
        .with_cutoff(config.boundary_cutoff.value)
        .run(&request)
        .await?;

    match outcome {
        RunOutcome::BoundaryNotFound(detection) => {
            if output.is_json() {
                return output.result(RunOutput {
                    outcome: "boundary_not_found",
                    boundary,
                    basemap: basemap.into(),
                    dates,
                    detection: Some((&detection).into()),
                    summary: None,
                    spread: None,
                    plot_layer: None,
                });
            }
            print_detection(&detection, output);
            output.warning(format!(
                "Boundary not found: no historical water in {}",
                request.roi.name()
            ));
        }
        RunOutcome::Estimated(report) => {
            if output.is_json() {
                return output.result(RunOutput {
                    outcome: "estimated",
                    boundary,
                    basemap: basemap.into(),
                    dates,
                    detection: report.detection.as_ref().map(DetectionOutput::from),
                    summary: Some(report.summary),
                    spread: Some((&report.spread).into()),
                    plot_layer: Some(report.plot_layer()),
                });
            }
            if let Some(detection) = &report.detection {
                print_detection(detection, output);
            }
            print_summary(&report.summary, output);
            print_spread(&report.spread, output);
            output.info("Use --json to get the outline and plot layer as GeoJSON");
        }
    }

    Ok(())
}
