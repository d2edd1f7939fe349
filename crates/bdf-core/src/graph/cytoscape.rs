//! Cytoscape desktop adapter over CyREST
//!
//! Failures are returned as [`BdfError::Visualization`], which callers downgrade to a
//! warning so that table export still happens.

use super::{Network, NodeType};
use bdf_common::{BdfError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const COLLECTION_NAME: &str = "BioDataFuse";
pub const STYLE_NAME: &str = "BioDataFuse_style";
pub const DEFAULT_NETWORK_NAME: &str = "Network";

/// Node shape and fill colour per node type
fn node_appearance(node_type: NodeType) -> (&'static str, &'static str) {
    match node_type {
        NodeType::Gene => ("DIAMOND", "#AAFF88"),
        NodeType::Disease => ("RECTANGLE", "#B0C4DE"),
        NodeType::GeneOntology => ("OCTAGON", "#FFC0CB"),
        NodeType::ReactomePathway => ("HEXAGON", "#FFFF00"),
        NodeType::WikiPathway => ("ROUND_RECTANGLE", "#F0E68C"),
        NodeType::Drug => ("ELLIPSE", "#FF0000"),
    }
}

/// The visual style document for `POST /v1/styles`
pub fn visual_style() -> Value {
    let entries = |pick: fn((&'static str, &'static str)) -> &'static str| -> Vec<Value> {
        NodeType::ALL
            .iter()
            .map(|ty| json!({ "key": ty.label(), "value": pick(node_appearance(*ty)) }))
            .collect()
    };

    json!({
        "title": STYLE_NAME,
        "defaults": [
            { "visualProperty": "NODE_FILL_COLOR", "value": "#FF0000" },
            { "visualProperty": "EDGE_COLOR", "value": "#000000" },
        ],
        "mappings": [
            {
                "mappingType": "discrete",
                "mappingColumn": "node_type",
                "mappingColumnType": "String",
                "visualProperty": "NODE_FILL_COLOR",
                "map": entries(|(_, colour)| colour),
            },
            {
                "mappingType": "discrete",
                "mappingColumn": "node_type",
                "mappingColumnType": "String",
                "visualProperty": "NODE_SHAPE",
                "map": entries(|(shape, _)| shape),
            },
        ],
    })
}

#[derive(Debug, Clone)]
pub struct CytoscapeClient {
    client: Client,
    base_url: String,
}

impl CytoscapeClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    /// `GET /v1/version`; fails when Cytoscape is not reachable
    pub async fn version(&self) -> Result<Value> {
        let response = self
            .client
            .get(self.url("/version"))
            .send()
            .await
            .map_err(|e| {
                BdfError::visualization(format!(
                    "Cytoscape is not reachable at {} ({}). Start Cytoscape and try again",
                    self.base_url, e
                ))
            })?;
        check_status(&response, "version probe")?;
        response
            .json()
            .await
            .map_err(|e| BdfError::visualization(format!("invalid version response: {}", e)))
    }

    /// Create the network, install the style and apply it.
    ///
    /// Returns `None` without contacting Cytoscape when the network has no nodes or no
    /// edges; otherwise the visualization metadata block.
    pub async fn push(&self, network: &Network, title: &str) -> Result<Option<Value>> {
        if network.is_empty() {
            info!("No graph to import to Cytoscape");
            return Ok(None);
        }

        let version = self.version().await?;
        debug!(nodes = network.nodes.len(), edges = network.edges.len(), "Creating Cytoscape network");

        let response = self
            .client
            .post(self.url("/networks"))
            .query(&[("format", "cyjs"), ("collection", COLLECTION_NAME), ("title", title)])
            .json(&network.to_cyjs(title))
            .send()
            .await
            .map_err(|e| BdfError::visualization(format!("network upload failed: {}", e)))?;
        check_status(&response, "network upload")?;
        let created: Value = response
            .json()
            .await
            .map_err(|e| BdfError::visualization(format!("invalid network response: {}", e)))?;
        let suid = created
            .get("networkSUID")
            .and_then(Value::as_u64)
            .ok_or_else(|| BdfError::visualization("network response has no networkSUID"))?;

        // An existing style with the same name is reused
        let response = self
            .client
            .post(self.url("/styles"))
            .json(&visual_style())
            .send()
            .await
            .map_err(|e| BdfError::visualization(format!("style upload failed: {}", e)))?;
        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Cytoscape rejected the visual style");
        }

        let response = self
            .client
            .get(self.url(&format!("/apply/styles/{}/{}", STYLE_NAME, suid)))
            .send()
            .await
            .map_err(|e| BdfError::visualization(format!("applying style failed: {}", e)))?;
        check_status(&response, "style application")?;

        info!(network = title, suid, "Data imported to Cytoscape");
        Ok(Some(json!({
            "datasource": "Cytoscape",
            "metadata": { "source_version": version },
        })))
    }
}

fn check_status(response: &reqwest::Response, step: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(BdfError::visualization(format!(
            "Cytoscape {} returned HTTP {}",
            step,
            status.as_u16()
        )))
    }
}
