//! Pipeline configuration
//!
//! Service endpoints, timeouts and fan-out width, read from `BDF_*` environment variables
//! (a `.env` file is honoured) or set programmatically with the `with_*` builders.

use bdf_common::{BdfError, Result, Species};
use reqwest::Client;
use std::time::Duration;
use url::Url;

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// BridgeDb web service used for identifier cross-referencing.
pub const DEFAULT_BRIDGEDB_URL: &str = "https://webservice.bridgedb.org";

/// WikiPathways SPARQL endpoint.
pub const DEFAULT_WIKIPATHWAYS_SPARQL_URL: &str = "https://sparql.wikipathways.org/sparql";

/// DisGeNET REST API root.
pub const DEFAULT_DISGENET_API_URL: &str = "https://www.disgenet.org/api";

/// Open Targets Platform GraphQL endpoint.
pub const DEFAULT_OPENTARGETS_URL: &str = "https://api.platform.opentargets.org/api/v4/graphql";

/// CyREST endpoint of a locally running Cytoscape desktop.
pub const DEFAULT_CYTOSCAPE_URL: &str = "http://localhost:1234";

/// Upper bound for one (source, option) fetch, including retries inside the provider.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Timeout of a single HTTP request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Number of fetches allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Runtime configuration of a [`crate::pipeline::Pipeline`]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub bridgedb_url: String,
    pub wikipathways_sparql_url: String,
    pub disgenet_api_url: String,
    /// DisGeNET requires a key; without one the provider reports a fetch failure
    pub disgenet_api_key: Option<String>,
    pub opentargets_url: String,
    pub cytoscape_url: String,
    pub species: Species,
    pub fetch_timeout: Duration,
    pub http_timeout: Duration,
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bridgedb_url: DEFAULT_BRIDGEDB_URL.to_string(),
            wikipathways_sparql_url: DEFAULT_WIKIPATHWAYS_SPARQL_URL.to_string(),
            disgenet_api_url: DEFAULT_DISGENET_API_URL.to_string(),
            disgenet_api_key: None,
            opentargets_url: DEFAULT_OPENTARGETS_URL.to_string(),
            cytoscape_url: DEFAULT_CYTOSCAPE_URL.to_string(),
            species: Species::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the environment, after loading `.env` if present.
    ///
    /// Unset variables keep their defaults. The result is validated.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(url) = std::env::var("BDF_BRIDGEDB_URL") {
            config.bridgedb_url = url;
        }
        if let Ok(url) = std::env::var("BDF_WIKIPATHWAYS_SPARQL_URL") {
            config.wikipathways_sparql_url = url;
        }
        if let Ok(url) = std::env::var("BDF_DISGENET_API_URL") {
            config.disgenet_api_url = url;
        }
        if let Ok(key) = std::env::var("BDF_DISGENET_API_KEY") {
            if !key.trim().is_empty() {
                config.disgenet_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("BDF_OPENTARGETS_URL") {
            config.opentargets_url = url;
        }
        if let Ok(url) = std::env::var("BDF_CYTOSCAPE_URL") {
            config.cytoscape_url = url;
        }
        if let Ok(species) = std::env::var("BDF_SPECIES") {
            config.species = Species::new(species);
        }
        if let Some(secs) = env_number::<u64>("BDF_FETCH_TIMEOUT_SECS")? {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number::<u64>("BDF_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = env_number::<usize>("BDF_CONCURRENCY")? {
            config.concurrency = concurrency;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that endpoints are absolute URLs and limits are non-zero
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("BDF_BRIDGEDB_URL", &self.bridgedb_url),
            ("BDF_WIKIPATHWAYS_SPARQL_URL", &self.wikipathways_sparql_url),
            ("BDF_DISGENET_API_URL", &self.disgenet_api_url),
            ("BDF_OPENTARGETS_URL", &self.opentargets_url),
            ("BDF_CYTOSCAPE_URL", &self.cytoscape_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| BdfError::config(format!("{} is not a valid URL ('{}'): {}", name, value, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(BdfError::config(format!(
                    "{} must use http or https, got '{}'",
                    name,
                    url.scheme()
                )));
            }
        }

        if self.species.as_str().trim().is_empty() {
            return Err(BdfError::config("BDF_SPECIES must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(BdfError::config("BDF_CONCURRENCY must be at least 1"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(BdfError::config("BDF_FETCH_TIMEOUT_SECS must be at least 1"));
        }
        if self.http_timeout.is_zero() {
            return Err(BdfError::config("BDF_HTTP_TIMEOUT_SECS must be at least 1"));
        }
        Ok(())
    }

    /// Shared HTTP client for every upstream service
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("bdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BdfError::config(format!("Failed to build HTTP client: {}", e)))
    }

    pub fn with_bridgedb_url(mut self, url: impl Into<String>) -> Self {
        self.bridgedb_url = url.into();
        self
    }

    pub fn with_wikipathways_sparql_url(mut self, url: impl Into<String>) -> Self {
        self.wikipathways_sparql_url = url.into();
        self
    }

    pub fn with_disgenet_api_url(mut self, url: impl Into<String>) -> Self {
        self.disgenet_api_url = url.into();
        self
    }

    pub fn with_disgenet_api_key(mut self, key: impl Into<String>) -> Self {
        self.disgenet_api_key = Some(key.into());
        self
    }

    pub fn with_opentargets_url(mut self, url: impl Into<String>) -> Self {
        self.opentargets_url = url.into();
        self
    }

    pub fn with_cytoscape_url(mut self, url: impl Into<String>) -> Self {
        self.cytoscape_url = url.into();
        self
    }

    pub fn with_species(mut self, species: Species) -> Self {
        self.species = species;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BdfError::config(format!("{} must be a non-negative integer, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
