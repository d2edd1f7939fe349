//! Source registry
//!
//! Maps a data source name to its fetch operation. A source is either a single operation
//! or a set of independently selectable sub-options. Adding a provider only touches
//! [`SourceRegistry::with_defaults`]; the dispatcher never names a source.

use crate::annotators::{
    disgenet::DisGeNetFetcher,
    opentargets::{OpenTargetsFacet, OpenTargetsFetcher},
    wikipathways::WikiPathwaysFetcher,
};
use crate::config::PipelineConfig;
use crate::model::{AnnotationResult, MappedIdentifier, SourceSelection};
use async_trait::async_trait;
use bdf_common::{BdfError, Result};
use reqwest::Client;
use std::sync::Arc;

/// Source names as shown to users
pub const WIKIPATHWAY: &str = "WikiPathway";
pub const DISGENET: &str = "DisGeNet";
pub const OPENTARGET: &str = "OpenTarget";

/// Capability shared by every annotation provider
#[async_trait]
pub trait AnnotationFetcher: Send + Sync {
    /// Fetch annotations for the mapped identifiers.
    ///
    /// An empty table is a valid answer. Errors are reported per (source, option) by the
    /// dispatcher and never abort the batch.
    async fn fetch(&self, mapped: &[MappedIdentifier]) -> Result<AnnotationResult>;
}

/// How a source is fetched
#[derive(Clone)]
pub enum FetchOp {
    Single(Arc<dyn AnnotationFetcher>),
    /// Sub-options in display order
    Options(Vec<(String, Arc<dyn AnnotationFetcher>)>),
}

impl FetchOp {
    /// Names of the sub-options, empty for single-operation sources
    pub fn option_names(&self) -> Vec<&str> {
        match self {
            FetchOp::Single(_) => Vec::new(),
            FetchOp::Options(options) => options.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }
}

impl std::fmt::Debug for FetchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOp::Single(_) => f.write_str("Single"),
            FetchOp::Options(_) => f.debug_tuple("Options").field(&self.option_names()).finish(),
        }
    }
}

/// One resolved (source, option) fetch, ready to run
#[derive(Clone)]
pub struct PlannedFetch {
    pub source: String,
    pub option: Option<String>,
    pub fetcher: Arc<dyn AnnotationFetcher>,
}

impl std::fmt::Debug for PlannedFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannedFetch")
            .field("source", &self.source)
            .field("option", &self.option)
            .finish_non_exhaustive()
    }
}

/// Registered sources in registration order
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<(String, FetchOp)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider, sharing one HTTP client
    pub fn with_defaults(config: &PipelineConfig, client: Client) -> Self {
        let mut registry = Self::new();

        registry.register_single(
            WIKIPATHWAY,
            Arc::new(WikiPathwaysFetcher::new(
                client.clone(),
                config.wikipathways_sparql_url.clone(),
            )),
        );
        registry.register_single(
            DISGENET,
            Arc::new(DisGeNetFetcher::new(
                client.clone(),
                config.disgenet_api_url.clone(),
                config.disgenet_api_key.clone(),
            )),
        );
        for facet in OpenTargetsFacet::ALL {
            registry.register_option(
                OPENTARGET,
                facet.option_name(),
                Arc::new(OpenTargetsFetcher::new(
                    client.clone(),
                    config.opentargets_url.clone(),
                    facet,
                )),
            );
        }

        registry
    }

    /// Register (or replace) a single-operation source
    pub fn register_single(&mut self, source: &str, fetcher: Arc<dyn AnnotationFetcher>) {
        match self.position(source) {
            Some(i) => self.sources[i].1 = FetchOp::Single(fetcher),
            None => self.sources.push((source.to_string(), FetchOp::Single(fetcher))),
        }
    }

    /// Register (or replace) one sub-option of a multi-option source
    pub fn register_option(&mut self, source: &str, option: &str, fetcher: Arc<dyn AnnotationFetcher>) {
        let i = match self.position(source) {
            Some(i) => i,
            None => {
                self.sources.push((source.to_string(), FetchOp::Options(Vec::new())));
                self.sources.len() - 1
            }
        };

        let op = &mut self.sources[i].1;
        if let FetchOp::Single(_) = *op {
            *op = FetchOp::Options(Vec::new());
        }
        if let FetchOp::Options(options) = op {
            match options.iter_mut().find(|(name, _)| name == option) {
                Some(existing) => existing.1 = fetcher,
                None => options.push((option.to_string(), fetcher)),
            }
        }
    }

    pub fn get(&self, source: &str) -> Option<&FetchOp> {
        self.sources.iter().find(|(name, _)| name == source).map(|(_, op)| op)
    }

    /// Registered sources with their operations, in registration order
    pub fn sources(&self) -> impl Iterator<Item = (&str, &FetchOp)> {
        self.sources.iter().map(|(name, op)| (name.as_str(), op))
    }

    /// Validate every selection and expand it into concrete fetches.
    ///
    /// Nothing is fetched here, so a bad selection fails the request before any network
    /// call. Order follows the selections, then the sub-options as given.
    pub fn plan(&self, selections: &[SourceSelection]) -> Result<Vec<PlannedFetch>> {
        if selections.is_empty() {
            return Err(BdfError::NoSelection);
        }

        let mut planned = Vec::new();
        for selection in selections {
            let source = selection.source_name.as_str();
            let op = self
                .get(source)
                .ok_or_else(|| BdfError::UnknownSource(source.to_string()))?;

            match op {
                FetchOp::Single(fetcher) => {
                    if let Some(option) = selection.sub_options.first() {
                        return Err(BdfError::UnknownOption {
                            datasource: source.to_string(),
                            option: option.clone(),
                        });
                    }
                    planned.push(PlannedFetch {
                        source: source.to_string(),
                        option: None,
                        fetcher: Arc::clone(fetcher),
                    });
                }
                FetchOp::Options(options) => {
                    if selection.sub_options.is_empty() {
                        return Err(BdfError::MissingOption(source.to_string()));
                    }
                    for option in &selection.sub_options {
                        let (_, fetcher) = options
                            .iter()
                            .find(|(name, _)| name == option)
                            .ok_or_else(|| BdfError::UnknownOption {
                                datasource: source.to_string(),
                                option: option.clone(),
                            })?;
                        planned.push(PlannedFetch {
                            source: source.to_string(),
                            option: Some(option.clone()),
                            fetcher: Arc::clone(fetcher),
                        });
                    }
                }
            }
        }
        Ok(planned)
    }

    fn position(&self, source: &str) -> Option<usize> {
        self.sources.iter().position(|(name, _)| name == source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::ResultTable;
    use serde_json::json;

    struct Nothing;

    #[async_trait]
    impl AnnotationFetcher for Nothing {
        async fn fetch(&self, _mapped: &[MappedIdentifier]) -> Result<AnnotationResult> {
            Ok(AnnotationResult {
                table: ResultTable::default(),
                metadata: json!({}),
            })
        }
    }

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry.register_single("WikiPathway", Arc::new(Nothing));
        registry.register_option("OpenTarget", "Gene location", Arc::new(Nothing));
        registry.register_option("OpenTarget", "Drug interactions", Arc::new(Nothing));
        registry
    }

    #[test]
    fn test_plan_preserves_selection_order() {
        let selections = vec![
            "OpenTarget:Drug interactions,Gene location".parse().unwrap(),
            "WikiPathway".parse().unwrap(),
        ];
        let plan = registry().plan(&selections).unwrap();
        let order: Vec<_> = plan
            .iter()
            .map(|p| (p.source.as_str(), p.option.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("OpenTarget", Some("Drug interactions")),
                ("OpenTarget", Some("Gene location")),
                ("WikiPathway", None),
            ]
        );
    }

    #[test]
    fn test_plan_rejects_invalid_selections() {
        let registry = registry();
        let plan = |s: &str| registry.plan(&[s.parse().unwrap()]);

        assert!(matches!(plan("STRING-DB"), Err(BdfError::UnknownSource(s)) if s == "STRING-DB"));
        assert!(matches!(plan("OpenTarget:Gene Location"), Err(BdfError::UnknownOption { .. })));
        assert!(matches!(plan("OpenTarget"), Err(BdfError::MissingOption(_))));
        assert!(matches!(plan("WikiPathway:Gene location"), Err(BdfError::UnknownOption { .. })));
        assert!(matches!(registry.plan(&[]), Err(BdfError::NoSelection)));
    }

    #[test]
    fn test_a_bad_selection_fails_the_whole_plan() {
        let selections = vec![
            "WikiPathway".parse().unwrap(),
            "DisGeNet".parse().unwrap(),
        ];
        assert!(registry().plan(&selections).is_err());
    }

    #[test]
    fn test_registering_replaces_existing_entries() {
        let mut registry = registry();
        registry.register_option("OpenTarget", "Gene location", Arc::new(Nothing));
        assert_eq!(
            registry.get("OpenTarget").unwrap().option_names(),
            vec!["Gene location", "Drug interactions"]
        );

        let names: Vec<&str> = registry.sources().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["WikiPathway", "OpenTarget"]);
    }

    #[test]
    fn test_default_registry_lists_builtin_sources() {
        let config = PipelineConfig::default();
        let registry = SourceRegistry::with_defaults(&config, Client::new());

        let names: Vec<&str> = registry.sources().map(|(name, _)| name).collect();
        assert_eq!(names, vec![WIKIPATHWAY, DISGENET, OPENTARGET]);
        assert_eq!(
            registry.get(OPENTARGET).unwrap().option_names(),
            vec![
                "Gene location",
                "Gene Ontology (GO)",
                "Reactome pathways",
                "Drug interactions",
                "Disease associations",
            ]
        );
        assert!(registry.get("STRING-DB").is_none());
    }
}
