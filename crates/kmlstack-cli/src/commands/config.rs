//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use kmlstack_core::config::SessionConfig;
use std::collections::BTreeMap;
use tabled::Tabled;

pub fn execute(config: &SessionConfig, output: &OutputWriter) -> Result<()> {
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let entries: BTreeMap<String, ConfigEntry> = inspection_map
            .into_iter()
            .map(|(key, (value, source))| {
                (
                    key,
                    ConfigEntry {
                        value,
                        source: format!("{:?}", source),
                    },
                )
            })
            .collect();
        output.result(ConfigOutput { entries })?;
        return Ok(());
    }

    output.section("Configuration Values");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let mut rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.table(rows);

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");

    Ok(())
}
