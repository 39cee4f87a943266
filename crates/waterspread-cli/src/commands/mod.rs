//! Command implementations

mod config;
mod detect;
mod estimate;
mod run;

use anyhow::{Context, Result};
use tabled::Tabled;
use waterspread_analysis::{BoundaryDetection, TankSummary, WaterSpread};
use waterspread_core::models::DateRange;

use crate::cli::{Cli, Commands, DateArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref(), cli.config_overrides())?;
    let scene = cli.scene;

    match cli.command {
        Commands::Detect(args) => detect::execute(args, &config, scene.as_deref(), &output).await,
        Commands::Estimate(args) => {
            estimate::execute(args, &config, scene.as_deref(), &output).await
        }
        Commands::Run(args) => run::execute(args, &config, scene.as_deref(), &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

fn parse_dates(args: &DateArgs) -> Result<DateRange> {
    DateRange::parse(&args.start, &args.end).context("Invalid date range")
}

fn print_detection(detection: &BoundaryDetection, output: &OutputWriter) {
    output.section("Historical Water Components");

    #[derive(Tabled)]
    struct CandidateRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Area (ha)")]
        area: String,
        #[tabled(rename = "Tank")]
        kept: &'static str,
    }

    let rows: Vec<CandidateRow> = detection
        .candidates
        .iter()
        .map(|c| CandidateRow {
            id: c.id.clone(),
            area: format!("{:.2}", c.area_ha),
            kept: if c.kept { "yes" } else { "" },
        })
        .collect();
    output.table(rows);

    if let Some(threshold) = detection.threshold_ha {
        output.kv(
            "Keep threshold",
            format!("{:.2} ha ({} of largest)", threshold, detection.cutoff),
        );
    }
}

fn print_summary(summary: &TankSummary, output: &OutputWriter) {
    output.section("Tank Details");
    output.kv("Maximum water-spread area of the tank", format!("{} Ha", summary.area_ha));
    output.kv("Centroid latitude", summary.centroid_lat);
    output.kv("Centroid longitude", summary.centroid_lon);
}

fn print_spread(spread: &WaterSpread, output: &OutputWriter) {
    output.section("Water Spread");
    output.kv("Date range", spread.dates);
    output.kv("Water-spread area", format!("{} Ha", spread.area_ha));
    output.kv("Polygons", spread.polygon_count);
    if spread.fallback() {
        output.warning("No water polygons could be traced; the outline is the tank boundary");
    }
}
