//! Estimate command implementation

use anyhow::Result;
use std::path::Path;
use waterspread_analysis::{tank_summary, WaterSpreadEstimator};
use waterspread_core::config::LayeredConfig;
use waterspread_core::formats::load_roi;

use super::{parse_dates, print_spread, print_summary};
use crate::backend;
use crate::cli::EstimateArgs;
use crate::output::OutputWriter;
use crate::output_types::EstimateOutput;

pub async fn execute(
    args: EstimateArgs,
    config: &LayeredConfig,
    scene: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let dates = parse_dates(&args.dates)?;
    let tank = load_roi(&args.path).await?;
    output.success(format!("Loaded tank {} ({} feature(s))", tank.name(), tank.parts().len()));

    let backend = backend::connect(config, scene)?;
    let summary = tank_summary(backend.as_ref(), &tank).await?;
    let spread = WaterSpreadEstimator::new(backend.as_ref()).estimate(&tank, dates).await?;

    if output.is_json() {
        return output.result(EstimateOutput {
            tank: tank.name().to_string(),
            summary,
            spread: (&spread).into(),
        });
    }

    print_summary(&summary, output);
    print_spread(&spread, output);

    Ok(())
}
