//! Annotation providers
//!
//! Each provider implements [`crate::registry::AnnotationFetcher`]: it takes the mapped
//! identifiers, keeps those in the namespace it understands, queries its service and
//! returns one list-of-record column plus `{datasource, query: {...}}` metadata.

pub mod disgenet;
pub mod opentargets;
pub mod wikipathways;

use crate::model::{AnnotationResult, MappedIdentifier, ResultTable};
use bdf_common::IdentifierType;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Instant;

// ============================================================================
// Output Column Names
// ============================================================================

pub const WIKIPATHWAYS_COLUMN: &str = "WikiPathways";
pub const DISGENET_COLUMN: &str = "DisGeNET";
pub const OPENTARGETS_LOCATION_COLUMN: &str = "OpenTargets_Location";
pub const GO_PROCESS_COLUMN: &str = "GO_Process";
pub const REACTOME_COLUMN: &str = "Reactome_Pathways";
pub const CHEMBL_DRUGS_COLUMN: &str = "ChEMBL_Drugs";
pub const OPENTARGETS_DISEASES_COLUMN: &str = "OpenTargets_Diseases";

/// Wall-clock start of a query, for the metadata block
pub struct QueryClock {
    started: Instant,
    date: String,
}

impl QueryClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// `{size, time, date, url}` block shared by every provider and the xref client
pub fn query_metadata(clock: &QueryClock, size: usize, url: &str) -> Value {
    json!({
        "size": size,
        "time": format!("{:.3}s", clock.started.elapsed().as_secs_f64()),
        "date": clock.date,
        "url": url,
    })
}

/// Metadata of a provider query
pub fn provider_metadata(datasource: &str, clock: &QueryClock, size: usize, url: &str) -> Value {
    json!({
        "datasource": datasource,
        "query": query_metadata(clock, size, url),
    })
}

/// Mapped rows whose target is in `namespace`
pub fn targets_in(mapped: &[MappedIdentifier], namespace: IdentifierType) -> Vec<&MappedIdentifier> {
    mapped
        .iter()
        .filter(|m| m.target_source == namespace.display_name())
        .collect()
}

/// Distinct target ids, in first-seen order
pub fn distinct_targets<'a>(rows: &[&'a MappedIdentifier]) -> Vec<&'a str> {
    let mut ids: Vec<&str> = Vec::new();
    for row in rows {
        if !ids.contains(&row.target.as_str()) {
            ids.push(row.target.as_str());
        }
    }
    ids
}

/// Result for a provider that had nothing to ask about; no request is made
pub fn empty_result(datasource: &str, table: ResultTable) -> AnnotationResult {
    let clock = QueryClock::start();
    AnnotationResult {
        table,
        metadata: provider_metadata(datasource, &clock, 0, ""),
    }
}
