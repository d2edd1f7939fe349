//! DisGeNET gene-disease associations

use super::{distinct_targets, empty_result, provider_metadata, targets_in, QueryClock, DISGENET_COLUMN};
use crate::model::{AnnotationResult, Cell, ColumnSpec, MappedIdentifier, Record, ResultRow, ResultTable};
use crate::registry::AnnotationFetcher;
use async_trait::async_trait;
use bdf_common::{BdfError, IdentifierType, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

const DATASOURCE: &str = "DisGeNET";
const SOURCE_NAME: &str = "DisGeNet";

/// Fields kept from each association, in output order
pub const DISGENET_FIELDS: &[&str] = &[
    "diseaseid",
    "disease_name",
    "disease_class",
    "disease_class_name",
    "disease_type",
    "disease_semantic_type",
    "score",
    "ei",
    "el",
    "source",
    "gene_dsi",
    "gene_dpi",
    "gene_pli",
];

#[derive(Debug, Clone)]
pub struct DisGeNetFetcher {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl DisGeNetFetcher {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn columns() -> ResultTable {
        ResultTable::new(vec![ColumnSpec::records(DISGENET_COLUMN)])
    }

    fn gda_url(&self, genes: &[&str]) -> String {
        format!("{}/gda/gene/{}", self.base_url, genes.join(","))
    }
}

/// Group association objects by `geneid`, keeping only [`DISGENET_FIELDS`]
fn records_by_gene(associations: Vec<Value>) -> HashMap<String, Vec<Record>> {
    let mut by_gene: HashMap<String, Vec<Record>> = HashMap::new();

    for association in associations {
        let Value::Object(mut fields) = association else {
            continue;
        };
        let gene_id = match fields.remove("geneid") {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => continue,
        };

        let record: Record = DISGENET_FIELDS
            .iter()
            .map(|name| (name.to_string(), fields.remove(*name).unwrap_or(Value::Null)))
            .collect();
        let records = by_gene.entry(gene_id).or_default();
        if !records.contains(&record) {
            records.push(record);
        }
    }
    by_gene
}

#[async_trait]
impl AnnotationFetcher for DisGeNetFetcher {
    async fn fetch(&self, mapped: &[MappedIdentifier]) -> Result<AnnotationResult> {
        let rows = targets_in(mapped, IdentifierType::NcbiGene);
        if rows.is_empty() {
            return Ok(empty_result(DATASOURCE, Self::columns()));
        }
        let failure = |message: String| BdfError::annotation_fetch(SOURCE_NAME, None, message);
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| failure("no API key configured (set BDF_DISGENET_API_KEY)".to_string()))?;

        let genes = distinct_targets(&rows);
        let url = self.gda_url(&genes);
        let clock = QueryClock::start();

        debug!(genes = genes.len(), "Querying DisGeNET");
        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        let associations: Vec<Value> = if status == StatusCode::NOT_FOUND {
            Vec::new()
        } else if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| failure(format!("invalid DisGeNET response: {}", e)))?
        } else {
            return Err(failure(format!("HTTP {}", status.as_u16())));
        };

        let by_gene = records_by_gene(associations);
        let mut table = Self::columns();
        for row in rows {
            if let Some(records) = by_gene.get(&row.target) {
                table.push(ResultRow::for_mapped(row).with_cell(DISGENET_COLUMN, Cell::Records(records.clone())))?;
            }
        }

        Ok(AnnotationResult {
            table,
            metadata: provider_metadata(DATASOURCE, &clock, genes.len(), &url),
        })
    }
}
