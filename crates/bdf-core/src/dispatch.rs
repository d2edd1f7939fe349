//! Dispatch engine
//!
//! Runs every planned (source, option) fetch, isolating failures per fetch, and folds the
//! results into one [`UnifiedTable`].
//!
//! Fetches run concurrently through an order-preserving bounded stream; results are then
//! merged one at a time, in selection order, by the single owner of the accumulator. The
//! outcome is therefore independent of which fetch finishes first.

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::model::{
    AnnotationResult, CombinedMetadata, MappedIdentifier, QueryMetadata, SourceSelection, UnifiedTable,
};
use crate::registry::{PlannedFetch, SourceRegistry};
use bdf_common::{BdfError, Result};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a (source, option) contributed nothing to the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    /// The fetch succeeded with zero rows
    EmptyResult,
    /// The fetch failed or timed out; the batch continued
    FetchFailed { message: String },
}

/// Non-fatal, per-(source, option) report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(flatten)]
    pub kind: NoticeKind,
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, NoticeKind::FetchFailed { .. })
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NoticeKind::EmptyResult => match &self.option {
                Some(option) => write!(f, "No annotation available for {}(option: {})", self.source, option),
                None => write!(f, "No annotation available for {}", self.source),
            },
            NoticeKind::FetchFailed { message } => write!(
                f,
                "{}",
                BdfError::annotation_fetch(&self.source, self.option.as_deref(), message.as_str())
            ),
        }
    }
}

/// Everything the dispatcher produced for one request
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub table: UnifiedTable,
    pub metadata: CombinedMetadata,
    pub notices: Vec<Notice>,
}

/// Fans selected fetches out over a [`SourceRegistry`]
pub struct Dispatcher<'a> {
    registry: &'a SourceRegistry,
    concurrency: usize,
    fetch_timeout: Duration,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a SourceRegistry) -> Self {
        Self {
            registry,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// Maximum fetches in flight; values below 1 are treated as 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fetch every selection and merge the results.
    ///
    /// Fails only when a selection is invalid (unknown source or option, nothing
    /// selected). Fetch errors, timeouts and merge conflicts are recorded as notices and
    /// as `{"error": ...}` metadata for that (source, option).
    pub async fn dispatch(
        &self,
        mapped: &[MappedIdentifier],
        selections: &[SourceSelection],
    ) -> Result<DispatchReport> {
        let plan = self.registry.plan(selections)?;
        info!(fetches = plan.len(), identifiers = mapped.len(), "Dispatching annotation fetches");

        let outcomes: Vec<(PlannedFetch, Result<AnnotationResult>)> = stream::iter(plan)
            .map(|planned| async move {
                let outcome = self.run_one(&planned, mapped).await;
                (planned, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = DispatchReport::default();
        for (planned, outcome) in outcomes {
            let source = planned.source.as_str();
            let option = planned.option.as_deref();

            match outcome {
                Ok(result) => {
                    report
                        .metadata
                        .record(source, option, QueryMetadata::Reported(result.metadata));

                    if result.table.is_empty() {
                        let notice = Notice {
                            source: planned.source.clone(),
                            option: planned.option.clone(),
                            kind: NoticeKind::EmptyResult,
                        };
                        warn!(source, option = ?option, "{}", notice);
                        report.notices.push(notice);
                        continue;
                    }

                    if let Err(e) = report.table.absorb(&result.table) {
                        self.record_failure(&mut report, &planned, e);
                        continue;
                    }
                    debug!(source, option = ?option, rows = result.table.len(), "Merged annotation result");
                }
                Err(e) => self.record_failure(&mut report, &planned, e),
            }
        }

        info!(
            rows = report.table.len(),
            columns = report.table.columns().len(),
            notices = report.notices.len(),
            "Dispatch finished"
        );
        Ok(report)
    }

    async fn run_one(&self, planned: &PlannedFetch, mapped: &[MappedIdentifier]) -> Result<AnnotationResult> {
        debug!(source = %planned.source, option = ?planned.option, "Fetching annotations");
        match tokio::time::timeout(self.fetch_timeout, planned.fetcher.fetch(mapped)).await {
            Ok(result) => result,
            Err(_) => Err(BdfError::annotation_fetch(
                &planned.source,
                planned.option.as_deref(),
                format!("timed out after {}s", self.fetch_timeout.as_secs_f64()),
            )),
        }
    }

    fn record_failure(&self, report: &mut DispatchReport, planned: &PlannedFetch, error: BdfError) {
        let message = match error {
            BdfError::AnnotationFetch { message, .. } => message,
            other => other.to_string(),
        };
        let notice = Notice {
            source: planned.source.clone(),
            option: planned.option.clone(),
            kind: NoticeKind::FetchFailed {
                message: message.clone(),
            },
        };
        warn!(source = %planned.source, option = ?planned.option, "{}", notice);

        report.metadata.record(
            &planned.source,
            planned.option.as_deref(),
            QueryMetadata::Failed { error: message },
        );
        report.notices.push(notice);
    }
}

/// Dispatch with default settings
pub async fn dispatch(
    registry: &SourceRegistry,
    mapped: &[MappedIdentifier],
    selections: &[SourceSelection],
) -> Result<DispatchReport> {
    Dispatcher::new(registry).dispatch(mapped, selections).await
}
