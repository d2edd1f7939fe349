//! BioDataFuse CLI Library
//!
//! Command-line front-end for querying and combining biological annotations.
//!
//! # Overview
//!
//! - **Query**: map identifiers, fetch annotations, export the combined table (`bdf query`)
//! - **Sources**: list data sources and their options (`bdf sources`)
//! - **Identifier types**: list accepted input namespaces (`bdf id-types`)

pub mod commands;
pub mod error;
pub mod progress;

pub use error::{CliError, Result};

use bdf_common::IdentifierType;
use bdf_core::export::ExportOptions;
use bdf_core::graph::cytoscape::DEFAULT_NETWORK_NAME;
use bdf_core::SourceSelection;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// BioDataFuse - query and combine biological annotations
#[derive(Parser, Debug)]
#[command(name = "bdf")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the command reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map identifiers, fetch annotations and export the combined table
    Query(QueryArgs),

    /// List data sources and their options
    Sources,

    /// List accepted identifier types
    IdTypes,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Identifiers, separated by newlines, commas or tabs
    #[arg(short, long)]
    pub ids: Option<String>,

    /// File with identifiers (.txt, .csv or .tsv)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Namespace of the input identifiers (display name or system code, e.g. "HGNC" or "H")
    #[arg(short = 't', long)]
    pub id_type: IdentifierType,

    /// Data source to query, as SOURCE or SOURCE:OPTION[,OPTION...] (repeatable)
    #[arg(short, long = "source", required = true)]
    pub sources: Vec<SourceSelection>,

    /// Species for identifier mapping (overrides BDF_SPECIES)
    #[arg(long)]
    pub species: Option<String>,

    /// Directory for the exported files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip the TSV export
    #[arg(long)]
    pub no_tsv: bool,

    /// Skip the Parquet export
    #[arg(long)]
    pub no_parquet: bool,

    /// Skip the metadata JSON export
    #[arg(long)]
    pub no_metadata: bool,

    /// Push the annotation network to a running Cytoscape
    #[arg(long)]
    pub cytoscape: bool,

    /// Network title in Cytoscape
    #[arg(long, default_value = DEFAULT_NETWORK_NAME)]
    pub network_name: String,
}

impl QueryArgs {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            tsv: !self.no_tsv,
            parquet: !self.no_parquet,
            metadata: !self.no_metadata,
        }
    }
}
