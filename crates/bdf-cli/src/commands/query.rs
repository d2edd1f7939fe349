//! `bdf query` command implementation
//!
//! Runs one query end to end and writes the combined table and metadata to disk.

use crate::error::Result;
use crate::progress::create_spinner;
use crate::QueryArgs;
use bdf_common::Species;
use bdf_core::export::{self, ExportedFiles};
use bdf_core::graph::cytoscape::CytoscapeClient;
use bdf_core::loader::InputFile;
use bdf_core::{Notice, Pipeline, PipelineConfig, QueryOutcome, QueryRequest};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use tracing::{debug, info};

/// Run the query command
pub async fn run(args: QueryArgs) -> Result<()> {
    info!("Running query command");

    let mut config = PipelineConfig::from_env()?;
    if let Some(species) = &args.species {
        config = config.with_species(Species::new(species.as_str()));
        config.validate()?;
    }
    let pipeline = Pipeline::from_config(&config)?;

    let mut request = QueryRequest::new(args.id_type).with_species(config.species.clone());
    if let Some(text) = &args.ids {
        request = request.with_text(text.as_str());
    }
    if let Some(path) = &args.file {
        request = request.with_file(InputFile::from_path(path)?);
    }
    for selection in &args.sources {
        request = request.with_selection(selection.clone());
    }
    debug!(selections = request.selections.len(), "Query request built");

    let spinner = create_spinner("Querying data sources...");
    let outcome = pipeline.run(request).await;
    spinner.finish_and_clear();
    let mut outcome = outcome?;

    print_notices(&outcome.notices);

    if args.cytoscape {
        let cytoscape = CytoscapeClient::new(config.http_client()?, config.cytoscape_url.clone());
        if let Some(warning) = outcome.visualize(&cytoscape, &args.network_name).await {
            print_warning(&warning);
        }
    }

    if outcome.table.is_empty() {
        print_warning("The combined table is empty; nothing was exported");
        return Ok(());
    }

    let files = export::export_all(
        &outcome.table,
        &outcome.metadata,
        &args.output_dir,
        args.export_options(),
    )?;

    print_summary(&outcome);
    print_files(&files);
    Ok(())
}

fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        print_warning(&notice.to_string());
    }
}

fn print_summary(outcome: &QueryOutcome) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Identifiers", "Mapped targets", "Rows", "Annotation columns"]);
    table.add_row(vec![
        outcome.identifiers.len().to_string(),
        outcome.mapped.len().to_string(),
        outcome.table.len().to_string(),
        outcome.table.columns().len().to_string(),
    ]);
    println!("{}", table);
}

fn print_files(files: &ExportedFiles) {
    for path in files.paths() {
        println!("{} Output written to: {}", "✓".green(), path.display().to_string().cyan());
    }
}
