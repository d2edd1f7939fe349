//! WikiPathways gene-pathway annotations over SPARQL

use super::{distinct_targets, empty_result, provider_metadata, targets_in, QueryClock, WIKIPATHWAYS_COLUMN};
use crate::model::{AnnotationResult, Cell, ColumnSpec, MappedIdentifier, Record, ResultRow, ResultTable};
use crate::registry::AnnotationFetcher;
use async_trait::async_trait;
use bdf_common::{BdfError, IdentifierType, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

const DATASOURCE: &str = "WikiPathways";
const SOURCE_NAME: &str = "WikiPathway";

/// Fetches the human pathways each NCBI gene takes part in
#[derive(Debug, Clone)]
pub struct WikiPathwaysFetcher {
    client: Client,
    endpoint: String,
}

impl WikiPathwaysFetcher {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn columns() -> ResultTable {
        ResultTable::new(vec![ColumnSpec::records(WIKIPATHWAYS_COLUMN)])
    }
}

/// SPARQL query for the pathways of the given NCBI gene ids
pub fn build_query(gene_ids: &[&str]) -> String {
    let values = gene_ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"PREFIX wp: <http://vocabularies.wikipathways.org/wp#>
PREFIX dcterms: <http://purl.org/dc/terms/>
PREFIX dc: <http://purl.org/dc/elements/1.1/>

SELECT DISTINCT ?gene_id ?pathway_id ?pathway_label (COUNT(DISTINCT ?member) AS ?pathway_gene_count)
WHERE {{
  VALUES ?gene_id {{ {values} }}
  ?gene a wp:GeneProduct ;
        dcterms:identifier ?gene_id ;
        dcterms:isPartOf ?pathway .
  ?pathway a wp:Pathway ;
           wp:organismName "Homo sapiens" ;
           dcterms:identifier ?pathway_id ;
           dc:title ?pathway_label .
  ?member a wp:GeneProduct ;
          dcterms:isPartOf ?pathway .
}}
GROUP BY ?gene_id ?pathway_id ?pathway_label
ORDER BY ?gene_id ?pathway_id"#
    )
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

/// Group SPARQL bindings into pathway records keyed by NCBI gene id
fn records_by_gene(response: SparqlResponse) -> HashMap<String, Vec<Record>> {
    let mut by_gene: HashMap<String, Vec<Record>> = HashMap::new();

    for binding in response.results.bindings {
        let value = |name: &str| binding.get(name).map(|term| term.value.clone());
        let (Some(gene_id), Some(pathway_id)) = (value("gene_id"), value("pathway_id")) else {
            continue;
        };

        let gene_count = value("pathway_gene_count")
            .and_then(|count| count.parse::<u64>().ok())
            .map(Value::from)
            .unwrap_or(Value::Null);

        let record = json!({
            "pathway_id": pathway_id,
            "pathway_label": value("pathway_label").map(Value::from).unwrap_or(Value::Null),
            "pathway_gene_count": gene_count,
        });
        if let Value::Object(record) = record {
            let records = by_gene.entry(gene_id).or_default();
            if !records.contains(&record) {
                records.push(record);
            }
        }
    }
    by_gene
}

#[async_trait]
impl AnnotationFetcher for WikiPathwaysFetcher {
    async fn fetch(&self, mapped: &[MappedIdentifier]) -> Result<AnnotationResult> {
        let rows = targets_in(mapped, IdentifierType::NcbiGene);
        if rows.is_empty() {
            return Ok(empty_result(DATASOURCE, Self::columns()));
        }
        let genes = distinct_targets(&rows);
        let clock = QueryClock::start();

        debug!(genes = genes.len(), endpoint = %self.endpoint, "Querying WikiPathways");
        let failure = |message: String| BdfError::annotation_fetch(SOURCE_NAME, None, message);

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/sparql-results+json")
            .form(&[("query", build_query(&genes))])
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("HTTP {}", status.as_u16())));
        }
        let body: SparqlResponse = response
            .json()
            .await
            .map_err(|e| failure(format!("invalid SPARQL response: {}", e)))?;

        let by_gene = records_by_gene(body);
        let mut table = Self::columns();
        for row in rows {
            if let Some(records) = by_gene.get(&row.target) {
                table.push(
                    ResultRow::for_mapped(row).with_cell(WIKIPATHWAYS_COLUMN, Cell::Records(records.clone())),
                )?;
            }
        }

        Ok(AnnotationResult {
            table,
            metadata: provider_metadata(DATASOURCE, &clock, genes.len(), &self.endpoint),
        })
    }
}
