//! Identifier cross-referencing through the BridgeDb web service
//!
//! `POST {base}/{species}/xrefsBatch/{system_code}` with one identifier per line. Each
//! response line reads `input \t input_source \t code:id,code:id,...`; every `code:id` with a
//! known system code becomes one [`MappedIdentifier`].

use crate::annotators::{query_metadata, QueryClock};
use crate::model::{IdentifierRecord, MappedIdentifier};
use async_trait::async_trait;
use bdf_common::{BdfError, IdentifierType, Result, Species};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Resolves input identifiers to identifiers in other namespaces
#[async_trait]
pub trait IdentifierMapper: Send + Sync {
    async fn xref(
        &self,
        identifiers: &[IdentifierRecord],
        species: &Species,
        input_type: IdentifierType,
    ) -> Result<XrefResult>;
}

/// Cross-reference output: the mapping table and the service metadata
#[derive(Debug, Clone, PartialEq)]
pub struct XrefResult {
    pub mapped: Vec<MappedIdentifier>,
    pub metadata: Value,
}

/// HTTP client for BridgeDb
#[derive(Debug, Clone)]
pub struct BridgeDbClient {
    client: Client,
    base_url: String,
}

impl BridgeDbClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn batch_url(&self, species: &Species, input_type: IdentifierType) -> String {
        format!(
            "{}/{}/xrefsBatch/{}",
            self.base_url,
            species.as_str(),
            input_type.system_code()
        )
    }

    /// BridgeDb version from `/config`, if the service reports it
    async fn service_version(&self) -> Option<String> {
        let url = format!("{}/config", self.base_url);
        let response = self.client.get(&url).send().await.ok()?.error_for_status().ok()?;
        let body = response.text().await.ok()?;
        body.lines().find_map(|line| {
            let (key, value) = line.split_once('\t')?;
            (key.trim() == "bridgedb.version").then(|| value.trim().to_string())
        })
    }
}

#[async_trait]
impl IdentifierMapper for BridgeDbClient {
    async fn xref(
        &self,
        identifiers: &[IdentifierRecord],
        species: &Species,
        input_type: IdentifierType,
    ) -> Result<XrefResult> {
        let url = self.batch_url(species, input_type);
        let clock = QueryClock::start();

        let body = identifiers
            .iter()
            .map(|r| r.identifier.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        debug!(url = %url, count = identifiers.len(), "Querying BridgeDb");
        let response = self
            .client
            .post(&url)
            .body(body)
            .send()
            .await
            .map_err(|e| BdfError::upstream(format!("BridgeDb request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BdfError::upstream(format!("BridgeDb returned HTTP {}", status.as_u16())));
        }
        let text = response
            .text()
            .await
            .map_err(|e| BdfError::upstream(format!("Failed to read BridgeDb response: {}", e)))?;

        let mapped = parse_batch_response(&text, input_type)?;
        info!(
            identifiers = identifiers.len(),
            mappings = mapped.len(),
            "Identifier cross-reference finished"
        );

        let mut metadata = json!({
            "datasource": "BridgeDb",
            "query": query_metadata(&clock, identifiers.len(), &url),
        });
        metadata["query"]["input_type"] = json!(input_type.display_name());
        match self.service_version().await {
            Some(version) => metadata["metadata"] = json!({ "bridgedb.version": version }),
            None => warn!("BridgeDb did not report its version"),
        }

        Ok(XrefResult { mapped, metadata })
    }
}

/// Parse the tab-separated `xrefsBatch` response.
///
/// Targets with unknown system codes are skipped; `N/A` or an empty list yields no rows.
pub fn parse_batch_response(text: &str, input_type: IdentifierType) -> Result<Vec<MappedIdentifier>> {
    let mut mapped = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [input, _input_source, xrefs] = fields.as_slice() else {
            return Err(BdfError::upstream(format!(
                "Malformed BridgeDb response at line {}: expected 3 tab-separated fields, got {}",
                number + 1,
                fields.len()
            )));
        };

        let xrefs = xrefs.trim();
        if xrefs.is_empty() || xrefs == "N/A" {
            continue;
        }

        for xref in xrefs.split(',') {
            let Some((code, id)) = xref.trim().split_once(':') else {
                debug!(xref, "Skipping cross-reference without system code");
                continue;
            };
            let Some(target_type) = IdentifierType::from_system_code(code) else {
                continue;
            };
            if id.is_empty() {
                continue;
            }
            let row = MappedIdentifier::new(
                input.trim(),
                input_type.display_name(),
                id,
                target_type.display_name(),
            );
            if !mapped.contains(&row) {
                mapped.push(row);
            }
        }
    }

    Ok(mapped)
}
