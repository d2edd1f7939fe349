//! Request-scoped data model
//!
//! Identifiers flow through the pipeline as [`IdentifierRecord`] (loader output),
//! [`MappedIdentifier`] (cross-reference output), per-fetch [`ResultTable`]s, and finally one
//! [`UnifiedTable`] plus [`CombinedMetadata`]. Nothing here outlives a single request.

use bdf_common::{BdfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One annotation item, e.g. a pathway or a disease association
pub type Record = serde_json::Map<String, Value>;

/// A user-supplied identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRecord {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_source: Option<String>,
}

impl IdentifierRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.identifier_source = Some(source.into());
        self
    }
}

/// One resolved (input identifier, external identifier) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedIdentifier {
    pub identifier: String,
    #[serde(rename = "identifier.source")]
    pub identifier_source: String,
    pub target: String,
    #[serde(rename = "target.source")]
    pub target_source: String,
}

impl MappedIdentifier {
    pub fn new(
        identifier: impl Into<String>,
        identifier_source: impl Into<String>,
        target: impl Into<String>,
        target_source: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_source: identifier_source.into(),
            target: target.into(),
            target_source: target_source.into(),
        }
    }
}

/// A data source chosen by the user, with the sub-options to fetch.
///
/// Parses from `SOURCE` or `SOURCE:OPTION[,OPTION...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub source_name: String,
    /// Empty means the source's single default operation. Duplicates are dropped, order kept.
    pub sub_options: Vec<String>,
}

impl SourceSelection {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            sub_options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for option in options {
            let option = option.into();
            if !self.sub_options.contains(&option) {
                self.sub_options.push(option);
            }
        }
        self
    }
}

impl std::str::FromStr for SourceSelection {
    type Err = BdfError;

    fn from_str(s: &str) -> Result<Self> {
        let (source, options) = match s.split_once(':') {
            Some((source, options)) => (source.trim(), Some(options)),
            None => (s.trim(), None),
        };
        if source.is_empty() {
            return Err(BdfError::config(format!(
                "Invalid source selection '{}'. Expected SOURCE or SOURCE:OPTION[,OPTION...]",
                s
            )));
        }

        let options = options
            .into_iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|option| !option.is_empty());
        Ok(SourceSelection::new(source).with_options(options))
    }
}

/// Declared shape of an annotation column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// One value per identifier; repeated distinct values accumulate
    Scalar,
    /// A list of annotation records per identifier
    Records,
}

/// Value of one annotation column for one identifier
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Scalar(Value),
    /// A scalar column that received several distinct values for the same identifier
    Many(Vec<Value>),
    Records(Vec<Record>),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Scalar(_) | Cell::Many(_) => CellKind::Scalar,
            Cell::Records(_) => CellKind::Records,
        }
    }

    /// Records of a list-of-record cell; empty for scalar cells
    pub fn records(&self) -> &[Record] {
        match self {
            Cell::Records(records) => records,
            _ => &[],
        }
    }

    /// JSON rendering used by the exporters
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Scalar(value) => value.clone(),
            Cell::Many(values) => Value::Array(values.clone()),
            Cell::Records(records) => {
                Value::Array(records.iter().cloned().map(Value::Object).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: CellKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: CellKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn records(name: impl Into<String>) -> Self {
        Self::new(name, CellKind::Records)
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, CellKind::Scalar)
    }
}

/// One row of a single fetch result, joined back to its mapped identifier
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub identifier: String,
    pub identifier_source: String,
    pub target: String,
    pub target_source: String,
    pub cells: BTreeMap<String, Cell>,
}

impl ResultRow {
    pub fn for_mapped(mapped: &MappedIdentifier) -> Self {
        Self {
            identifier: mapped.identifier.clone(),
            identifier_source: mapped.identifier_source.clone(),
            target: mapped.target.clone(),
            target_source: mapped.target_source.clone(),
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(column.into(), cell);
        self
    }
}

/// Output of one (source, option) fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<ColumnSpec>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Every cell must belong to a declared column of the matching kind.
    pub fn push(&mut self, row: ResultRow) -> Result<()> {
        for (name, cell) in &row.cells {
            match self.columns.iter().find(|c| &c.name == name) {
                Some(column) if column.kind == cell.kind() => {}
                Some(column) => {
                    return Err(BdfError::Merge(format!(
                        "column '{}' is declared {:?} but row for '{}' holds {:?}",
                        name,
                        column.kind,
                        row.identifier,
                        cell.kind()
                    )))
                }
                None => {
                    return Err(BdfError::Merge(format!(
                        "column '{}' is not declared by this result table",
                        name
                    )))
                }
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A (table, metadata) pair returned by an annotation provider
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationResult {
    pub table: ResultTable,
    pub metadata: Value,
}

/// An external identifier that contributed to a unified row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub source: String,
}

/// All annotations gathered for one input identifier
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRow {
    pub identifier: String,
    pub identifier_source: String,
    pub targets: Vec<Target>,
    pub cells: BTreeMap<String, Cell>,
}

impl UnifiedRow {
    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// First contributing target, if any
    pub fn primary_target(&self) -> Option<&Target> {
        self.targets.first()
    }
}

/// Every fetch result outer-joined on the input identifier.
///
/// Columns are kept in first-contribution order; rows in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    pub(crate) columns: Vec<ColumnSpec>,
    pub(crate) rows: Vec<UnifiedRow>,
    pub(crate) index: HashMap<(String, String), usize>,
}

impl UnifiedTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn rows(&self) -> &[UnifiedRow] {
        &self.rows
    }

    pub fn row(&self, identifier: &str) -> Option<&UnifiedRow> {
        self.rows.iter().find(|r| r.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metadata recorded for one (source, option) query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryMetadata {
    /// The fetch failed; the error message stands in for the provider's metadata
    Failed { error: String },
    Reported(Value),
}

impl QueryMetadata {
    pub fn is_failed(&self) -> bool {
        matches!(self, QueryMetadata::Failed { .. })
    }
}

/// Per-source metadata: a single entry, or one entry per sub-option
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceMetadata {
    Single(QueryMetadata),
    Options(BTreeMap<String, QueryMetadata>),
}

/// Metadata of every queried (source, option) pair, nested `source -> option -> metadata`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CombinedMetadata(BTreeMap<String, SourceMetadata>);

impl CombinedMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record metadata for `source` (and `option`, when the source has sub-options)
    pub fn record(&mut self, source: &str, option: Option<&str>, metadata: QueryMetadata) {
        match option {
            None => {
                self.0.insert(source.to_string(), SourceMetadata::Single(metadata));
            }
            Some(option) => {
                let entry = self
                    .0
                    .entry(source.to_string())
                    .or_insert_with(|| SourceMetadata::Options(BTreeMap::new()));
                if let SourceMetadata::Single(_) = *entry {
                    *entry = SourceMetadata::Options(BTreeMap::new());
                }
                if let SourceMetadata::Options(options) = entry {
                    options.insert(option.to_string(), metadata);
                }
            }
        }
    }

    pub fn get(&self, source: &str, option: Option<&str>) -> Option<&QueryMetadata> {
        match (self.0.get(source)?, option) {
            (SourceMetadata::Single(metadata), None) => Some(metadata),
            (SourceMetadata::Options(options), Some(option)) => options.get(option),
            _ => None,
        }
    }

    /// Number of (source, option) entries
    pub fn len(&self) -> usize {
        self.0
            .values()
            .map(|m| match m {
                SourceMetadata::Single(_) => 1,
                SourceMetadata::Options(options) => options.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The metadata document exported next to the unified table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataDocument {
    pub id_mapping: Value,
    pub queries: CombinedMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Value>,
}
