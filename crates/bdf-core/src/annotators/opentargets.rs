//! Open Targets Platform annotations over GraphQL
//!
//! One fetcher per facet (sub-option); each sends a single `targets(ensemblIds: ...)`
//! query for all Ensembl targets and keeps the fields of its facet.

use super::{
    distinct_targets, empty_result, provider_metadata, targets_in, QueryClock, CHEMBL_DRUGS_COLUMN,
    GO_PROCESS_COLUMN, OPENTARGETS_DISEASES_COLUMN, OPENTARGETS_LOCATION_COLUMN, REACTOME_COLUMN,
};
use crate::model::{AnnotationResult, Cell, ColumnSpec, MappedIdentifier, Record, ResultRow, ResultTable};
use crate::registry::AnnotationFetcher;
use async_trait::async_trait;
use bdf_common::{BdfError, IdentifierType, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

const DATASOURCE: &str = "Open Targets GraphQL & REST API Beta";
const SOURCE_NAME: &str = "OpenTarget";

/// Selectable Open Targets facets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenTargetsFacet {
    Location,
    GeneOntology,
    Reactome,
    Drugs,
    Diseases,
}

impl OpenTargetsFacet {
    pub const ALL: [OpenTargetsFacet; 5] = [
        OpenTargetsFacet::Location,
        OpenTargetsFacet::GeneOntology,
        OpenTargetsFacet::Reactome,
        OpenTargetsFacet::Drugs,
        OpenTargetsFacet::Diseases,
    ];

    /// Sub-option name as selected by users
    pub fn option_name(self) -> &'static str {
        match self {
            OpenTargetsFacet::Location => "Gene location",
            OpenTargetsFacet::GeneOntology => "Gene Ontology (GO)",
            OpenTargetsFacet::Reactome => "Reactome pathways",
            OpenTargetsFacet::Drugs => "Drug interactions",
            OpenTargetsFacet::Diseases => "Disease associations",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            OpenTargetsFacet::Location => OPENTARGETS_LOCATION_COLUMN,
            OpenTargetsFacet::GeneOntology => GO_PROCESS_COLUMN,
            OpenTargetsFacet::Reactome => REACTOME_COLUMN,
            OpenTargetsFacet::Drugs => CHEMBL_DRUGS_COLUMN,
            OpenTargetsFacet::Diseases => OPENTARGETS_DISEASES_COLUMN,
        }
    }

    fn selection(self) -> &'static str {
        match self {
            OpenTargetsFacet::Location => "subcellularLocations { location source termSL labelSL }",
            OpenTargetsFacet::GeneOntology => "geneOntology { aspect term { id name } }",
            OpenTargetsFacet::Reactome => "pathways { pathwayId pathway topLevelTerm }",
            OpenTargetsFacet::Drugs => "knownDrugs { rows { drugId prefName mechanismOfAction } }",
            OpenTargetsFacet::Diseases => {
                "associatedDiseases { rows { score disease { id name therapeuticAreas { id name } } } }"
            }
        }
    }

    /// GraphQL document for this facet
    pub fn query(self) -> String {
        format!(
            "query targetAnnotation($ids: [String!]!) {{ targets(ensemblIds: $ids) {{ id approvedSymbol {} }} }}",
            self.selection()
        )
    }

    /// Records of this facet for one `targets[]` entry
    fn extract(self, target: &Value) -> Vec<Record> {
        let items = |pointer: &str| -> Vec<Value> {
            target
                .pointer(pointer)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };
        let text = |item: &Value, pointer: &str| item.pointer(pointer).cloned().unwrap_or(Value::Null);

        let values: Vec<Value> = match self {
            OpenTargetsFacet::Location => items("/subcellularLocations")
                .iter()
                .map(|item| {
                    json!({
                        "location": text(item, "/location"),
                        "subcellular_loc": text(item, "/labelSL"),
                        "loc_identifier": text(item, "/termSL"),
                    })
                })
                .collect(),
            OpenTargetsFacet::GeneOntology => items("/geneOntology")
                .iter()
                .filter(|item| item.pointer("/aspect").and_then(Value::as_str) == Some("P"))
                .map(|item| {
                    json!({
                        "go_id": text(item, "/term/id"),
                        "go_name": text(item, "/term/name"),
                    })
                })
                .collect(),
            OpenTargetsFacet::Reactome => items("/pathways")
                .iter()
                .map(|item| {
                    json!({
                        "pathway_id": text(item, "/pathwayId"),
                        "pathway_name": text(item, "/pathway"),
                    })
                })
                .collect(),
            OpenTargetsFacet::Drugs => items("/knownDrugs/rows")
                .iter()
                .map(|item| {
                    json!({
                        "chembl_id": text(item, "/drugId"),
                        "drug_name": text(item, "/prefName"),
                        "relation": text(item, "/mechanismOfAction"),
                    })
                })
                .collect(),
            OpenTargetsFacet::Diseases => items("/associatedDiseases/rows")
                .iter()
                .map(|item| {
                    let areas: Vec<&str> = item
                        .pointer("/disease/therapeuticAreas")
                        .and_then(Value::as_array)
                        .map(|areas| areas.iter().filter_map(|a| a["name"].as_str()).collect())
                        .unwrap_or_default();
                    json!({
                        "disease_id": text(item, "/disease/id"),
                        "disease_name": text(item, "/disease/name"),
                        "therapeutic_areas": areas.join(", "),
                    })
                })
                .collect(),
        };

        let mut records: Vec<Record> = Vec::new();
        for value in values {
            if let Value::Object(record) = value {
                if !records.contains(&record) {
                    records.push(record);
                }
            }
        }
        records
    }
}

impl std::fmt::Display for OpenTargetsFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.option_name())
    }
}

#[derive(Debug, Clone)]
pub struct OpenTargetsFetcher {
    client: Client,
    endpoint: String,
    facet: OpenTargetsFacet,
}

impl OpenTargetsFetcher {
    pub fn new(client: Client, endpoint: impl Into<String>, facet: OpenTargetsFacet) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            facet,
        }
    }

    fn columns(&self) -> ResultTable {
        ResultTable::new(vec![ColumnSpec::records(self.facet.column())])
    }

    fn failure(&self, message: impl Into<String>) -> BdfError {
        BdfError::annotation_fetch(SOURCE_NAME, Some(self.facet.option_name()), message)
    }
}

#[async_trait]
impl AnnotationFetcher for OpenTargetsFetcher {
    async fn fetch(&self, mapped: &[MappedIdentifier]) -> Result<AnnotationResult> {
        let rows = targets_in(mapped, IdentifierType::Ensembl);
        if rows.is_empty() {
            return Ok(empty_result(DATASOURCE, self.columns()));
        }
        let ensembl_ids = distinct_targets(&rows);
        let clock = QueryClock::start();

        debug!(facet = %self.facet, targets = ensembl_ids.len(), "Querying Open Targets");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "query": self.facet.query(),
                "variables": { "ids": ensembl_ids },
            }))
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP {}", status.as_u16())));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| self.failure(format!("invalid GraphQL response: {}", e)))?;

        let targets = match body.pointer("/data/targets").and_then(Value::as_array) {
            Some(targets) => targets,
            None => {
                let message = body
                    .pointer("/errors/0/message")
                    .and_then(Value::as_str)
                    .unwrap_or("response has no data.targets");
                return Err(self.failure(message.to_string()));
            }
        };
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            warn!(facet = %self.facet, errors = errors.len(), "Open Targets returned partial errors");
        }

        let by_target: HashMap<&str, Vec<Record>> = targets
            .iter()
            .filter_map(|target| Some((target.get("id")?.as_str()?, self.facet.extract(target))))
            .collect();

        let mut table = self.columns();
        for row in rows {
            match by_target.get(row.target.as_str()) {
                Some(records) if !records.is_empty() => {
                    table.push(ResultRow::for_mapped(row).with_cell(self.facet.column(), Cell::Records(records.clone())))?;
                }
                _ => {}
            }
        }

        Ok(AnnotationResult {
            table,
            metadata: provider_metadata(DATASOURCE, &clock, ensembl_ids.len(), &self.endpoint),
        })
    }
}
