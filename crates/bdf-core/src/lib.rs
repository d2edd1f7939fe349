//! BioDataFuse Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Identifier loading, cross-referencing, multi-source annotation and result merging.
//!
//! # Overview
//!
//! - **Loader**: free text / uploaded files to an ordered, de-duplicated identifier list
//! - **Cross-reference**: BridgeDb mapping from the input namespace to every known namespace
//! - **Registry & Dispatch**: selected (source, option) fetches run concurrently, failures isolated
//! - **Merge**: per-source tables outer-joined into one table keyed by input identifier
//! - **Export**: TSV, Parquet and JSON metadata; optional Cytoscape network
//!
//! # Example
//!
//! ```no_run
//! use bdf_common::IdentifierType;
//! use bdf_core::config::PipelineConfig;
//! use bdf_core::pipeline::{Pipeline, QueryRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::from_config(&PipelineConfig::from_env()?)?;
//!     let request = QueryRequest::new(IdentifierType::Hgnc)
//!         .with_text("BRCA1\nTP53")
//!         .with_selection("WikiPathway".parse()?)
//!         .with_selection("OpenTarget:Gene location".parse()?);
//!
//!     let outcome = pipeline.run(request).await?;
//!     println!("{} rows", outcome.table.len());
//!     Ok(())
//! }
//! ```

pub mod annotators;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod graph;
pub mod loader;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod xref;

pub use config::PipelineConfig;
pub use dispatch::{DispatchReport, Dispatcher, Notice, NoticeKind};
pub use merge::merge;
pub use model::{
    AnnotationResult, Cell, CellKind, ColumnSpec, CombinedMetadata, IdentifierRecord, MappedIdentifier,
    MetadataDocument, QueryMetadata, Record, ResultRow, ResultTable, SourceSelection, UnifiedRow, UnifiedTable,
};
pub use pipeline::{Pipeline, QueryOutcome, QueryRequest};
pub use registry::{AnnotationFetcher, FetchOp, SourceRegistry};
