//! Request pipeline: load → cross-reference → dispatch/merge
//!
//! All inputs arrive in a [`QueryRequest`] and everything produced comes back in a
//! [`QueryOutcome`]; there is no state shared between requests.

use crate::config::PipelineConfig;
use crate::dispatch::{Dispatcher, Notice};
use crate::graph::{self, cytoscape::CytoscapeClient};
use crate::loader::{self, InputFile};
use crate::model::{IdentifierRecord, MappedIdentifier, MetadataDocument, SourceSelection, UnifiedTable};
use crate::registry::SourceRegistry;
use crate::xref::{BridgeDbClient, IdentifierMapper};
use bdf_common::{BdfError, IdentifierType, Result, Species};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One user query
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub file: Option<InputFile>,
    pub free_text: Option<String>,
    pub identifier_type: IdentifierType,
    pub species: Species,
    pub selections: Vec<SourceSelection>,
}

impl QueryRequest {
    pub fn new(identifier_type: IdentifierType) -> Self {
        Self {
            file: None,
            free_text: None,
            identifier_type,
            species: Species::default(),
            selections: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    pub fn with_file(mut self, file: InputFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_species(mut self, species: Species) -> Self {
        self.species = species;
        self
    }

    pub fn with_selection(mut self, selection: SourceSelection) -> Self {
        self.selections.push(selection);
        self
    }
}

/// Everything a query produced
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub identifiers: Vec<IdentifierRecord>,
    pub mapped: Vec<MappedIdentifier>,
    pub table: UnifiedTable,
    pub metadata: MetadataDocument,
    pub notices: Vec<Notice>,
}

pub struct Pipeline {
    mapper: Arc<dyn IdentifierMapper>,
    registry: SourceRegistry,
    concurrency: usize,
    fetch_timeout: Duration,
}

impl Pipeline {
    pub fn new(mapper: Arc<dyn IdentifierMapper>, registry: SourceRegistry) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            mapper,
            registry,
            concurrency: defaults.concurrency,
            fetch_timeout: defaults.fetch_timeout,
        }
    }

    /// Pipeline against the configured BridgeDb and built-in providers
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let client = config.http_client()?;
        let mapper = Arc::new(BridgeDbClient::new(client.clone(), config.bridgedb_url.clone()));
        let registry = SourceRegistry::with_defaults(config, client);
        Ok(Self::new(mapper, registry)
            .with_concurrency(config.concurrency)
            .with_fetch_timeout(config.fetch_timeout))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Run one query end to end.
    ///
    /// Selections are validated before the cross-reference call, so a typo in a source
    /// name costs no network round trip.
    pub async fn run(&self, request: QueryRequest) -> Result<QueryOutcome> {
        let identifiers = loader::load(request.file.as_ref(), request.free_text.as_deref())?;
        self.registry.plan(&request.selections)?;

        let xref = self
            .mapper
            .xref(&identifiers, &request.species, request.identifier_type)
            .await?;
        if xref.mapped.is_empty() {
            return Err(BdfError::Unmapped(identifiers.len()));
        }

        let report = Dispatcher::new(&self.registry)
            .with_concurrency(self.concurrency)
            .with_fetch_timeout(self.fetch_timeout)
            .dispatch(&xref.mapped, &request.selections)
            .await?;

        if report.table.is_empty() {
            warn!("The combined table is empty");
        }
        info!(
            identifiers = identifiers.len(),
            mapped = xref.mapped.len(),
            rows = report.table.len(),
            "Query finished"
        );

        Ok(QueryOutcome {
            identifiers,
            mapped: xref.mapped,
            table: report.table,
            metadata: MetadataDocument {
                id_mapping: xref.metadata,
                queries: report.metadata,
                visualization: None,
            },
            notices: report.notices,
        })
    }
}

impl QueryOutcome {
    /// Push the network to Cytoscape, recording visualization metadata on success.
    ///
    /// Any failure is logged and returned as a warning message; the outcome stays usable
    /// for export either way.
    pub async fn visualize(&mut self, cytoscape: &CytoscapeClient, network_name: &str) -> Option<String> {
        let network = graph::build_network(&self.table);
        match cytoscape.push(&network, network_name).await {
            Ok(Some(metadata)) => {
                self.metadata.visualization = Some(metadata);
                None
            }
            Ok(None) => Some("No graph to import to Cytoscape".to_string()),
            Err(e) => {
                warn!(error = %e, "Cytoscape export failed");
                Some(e.to_string())
            }
        }
    }
}
