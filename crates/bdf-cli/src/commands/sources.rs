//! `bdf sources` command implementation
//!
//! Lists the registered data sources and, for multi-option sources, their options.

use crate::error::Result;
use bdf_core::{FetchOp, PipelineConfig, SourceRegistry};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Show the data sources a query can select
pub fn run() -> Result<()> {
    let config = PipelineConfig::default();
    let registry = SourceRegistry::with_defaults(&config, config.http_client()?);

    println!("{}", "Data Sources:".cyan().bold());
    println!("{}", sources_table(&registry));
    println!("Select with --source SOURCE or --source 'SOURCE:OPTION[,OPTION...]'");
    Ok(())
}

fn sources_table(registry: &SourceRegistry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Source", "Options"]);

    for (name, op) in registry.sources() {
        let options = match op {
            FetchOp::Single(_) => "-".to_string(),
            FetchOp::Options(_) => op.option_names().join("\n"),
        };
        table.add_row(vec![name.to_string(), options]);
    }
    table
}
