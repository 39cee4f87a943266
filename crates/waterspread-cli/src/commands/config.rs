//! Config command implementation

use anyhow::Result;
use tabled::Tabled;
use waterspread_core::config::LayeredConfig;

use crate::output::OutputWriter;
use crate::output_types::{ConfigOutput, ConfigValue};

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        return output.result(ConfigOutput {
            backend: ConfigValue::new(
                format!("{:?}", config.backend.value).to_lowercase(),
                config.backend.source,
            ),
            endpoint: ConfigValue::new(config.endpoint.value.clone(), config.endpoint.source),
            basemap: ConfigValue::new(config.basemap.value.to_string(), config.basemap.source),
            boundary_cutoff: ConfigValue::new(
                config.boundary_cutoff.value,
                config.boundary_cutoff.source,
            ),
        });
    }

    output.section("Configuration");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: source.to_string() })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.table(rows);
    Ok(())
}
