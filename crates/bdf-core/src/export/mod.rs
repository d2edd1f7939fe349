//! Export adapters
//!
//! Serialise a [`UnifiedTable`] to TSV and Parquet and the [`MetadataDocument`] to JSON.
//! List-valued cells survive both table formats: JSON arrays in TSV, `List<Utf8>` in
//! Parquet.

pub mod metadata;
pub mod parquet;
pub mod tsv;

use crate::model::{Cell, MetadataDocument, UnifiedRow, UnifiedTable};
use bdf_common::Result;
use serde_json::Value;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// Export File Names
// ============================================================================

pub const TSV_FILE_NAME: &str = "BioDataFuse_combined_table.tsv";
pub const PARQUET_FILE_NAME: &str = "BioDataFuse_combined_table.parquet";
pub const METADATA_FILE_NAME: &str = "BioDataFuse_metadata.json";

/// Fixed leading columns of every exported table
pub const KEY_COLUMNS: [&str; 4] = ["identifier", "identifier.source", "target", "target.source"];

/// Separator between several contributing targets in one key cell
pub const TARGET_SEPARATOR: &str = ";";

/// Which artefacts to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub tsv: bool,
    pub parquet: bool,
    pub metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            tsv: true,
            parquet: true,
            metadata: true,
        }
    }
}

/// Paths of the files actually written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedFiles {
    pub tsv: Option<PathBuf>,
    pub parquet: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
}

impl ExportedFiles {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [&self.tsv, &self.parquet, &self.metadata]
            .into_iter()
            .filter_map(|p| p.as_deref())
    }
}

/// Write the selected artefacts into `dir`, creating it if needed.
///
/// An empty table writes nothing.
pub fn export_all(
    table: &UnifiedTable,
    metadata: &MetadataDocument,
    dir: &Path,
    options: ExportOptions,
) -> Result<ExportedFiles> {
    let mut written = ExportedFiles::default();
    if table.is_empty() {
        warn!("The combined table is empty; nothing exported");
        return Ok(written);
    }
    std::fs::create_dir_all(dir)?;

    if options.tsv {
        let path = dir.join(TSV_FILE_NAME);
        tsv::write_tsv(table, BufWriter::new(File::create(&path)?))?;
        written.tsv = Some(path);
    }
    if options.parquet {
        let path = dir.join(PARQUET_FILE_NAME);
        parquet::write_parquet(table, File::create(&path)?)?;
        written.parquet = Some(path);
    }
    if options.metadata {
        let path = dir.join(METADATA_FILE_NAME);
        metadata::write_metadata(metadata, BufWriter::new(File::create(&path)?))?;
        written.metadata = Some(path);
    }

    for path in written.paths() {
        info!(path = %path.display(), "Exported");
    }
    Ok(written)
}

/// Values of the four key columns for a row
pub(crate) fn key_values(row: &UnifiedRow) -> [String; 4] {
    let ids: Vec<&str> = row.targets.iter().map(|t| t.id.as_str()).collect();
    let sources: Vec<&str> = row.targets.iter().map(|t| t.source.as_str()).collect();
    [
        row.identifier.clone(),
        row.identifier_source.clone(),
        ids.join(TARGET_SEPARATOR),
        sources.join(TARGET_SEPARATOR),
    ]
}

/// Text of one scalar value: strings verbatim, anything else as JSON
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text form of a cell for delimited output
pub(crate) fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Scalar(value) => scalar_text(value),
        other => other.to_json().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        CombinedMetadata, ColumnSpec, MappedIdentifier, QueryMetadata, ResultRow, ResultTable,
    };
    use serde_json::json;

    /// BRCA1 with pathways and a location from two targets; TP53 with pathways only
    pub(crate) fn sample_table() -> UnifiedTable {
        let brca1_ncbi = MappedIdentifier::new("BRCA1", "HGNC", "672", "NCBI Gene");
        let brca1_ens = MappedIdentifier::new("BRCA1", "HGNC", "ENSG00000012048", "Ensembl");
        let tp53 = MappedIdentifier::new("TP53", "HGNC", "7157", "NCBI Gene");
        let record = |v: Value| v.as_object().cloned().unwrap();

        let mut pathways = ResultTable::new(vec![ColumnSpec::records("WikiPathways")]);
        pathways
            .push(ResultRow::for_mapped(&brca1_ncbi).with_cell(
                "WikiPathways",
                Cell::Records(vec![
                    record(json!({"pathway_id": "WP2261", "pathway_label": "Glioblastoma"})),
                    record(json!({"pathway_id": "WP4255", "pathway_label": "DNA repair"})),
                ]),
            ))
            .unwrap();
        pathways
            .push(ResultRow::for_mapped(&tp53).with_cell(
                "WikiPathways",
                Cell::Records(vec![record(json!({"pathway_id": "WP707", "pathway_label": "DNA damage"}))]),
            ))
            .unwrap();

        let mut location = ResultTable::new(vec![
            ColumnSpec::records("OpenTargets_Location"),
            ColumnSpec::scalar("chromosome"),
        ]);
        location
            .push(
                ResultRow::for_mapped(&brca1_ens)
                    .with_cell(
                        "OpenTargets_Location",
                        Cell::Records(vec![record(json!({"location": "Nucleus"}))]),
                    )
                    .with_cell("chromosome", Cell::Scalar(json!("17"))),
            )
            .unwrap();

        let table = UnifiedTable::from_result(&pathways).unwrap();
        crate::merge::merge(table, &location).unwrap()
    }

    pub(crate) fn sample_metadata() -> MetadataDocument {
        let mut queries = CombinedMetadata::new();
        queries.record("WikiPathway", None, QueryMetadata::Reported(json!({"datasource": "WikiPathways"})));
        queries.record(
            "OpenTarget",
            Some("Gene location"),
            QueryMetadata::Failed { error: "HTTP 500".into() },
        );
        MetadataDocument {
            id_mapping: json!({"datasource": "BridgeDb"}),
            queries,
            visualization: None,
        }
    }

    #[test]
    fn test_key_values_join_targets() {
        let table = sample_table();
        let keys = key_values(table.row("BRCA1").unwrap());
        assert_eq!(keys[0], "BRCA1");
        assert_eq!(keys[1], "HGNC");
        assert_eq!(keys[2], "672;ENSG00000012048");
        assert_eq!(keys[3], "NCBI Gene;Ensembl");
    }

    #[test]
    fn test_export_all_writes_selected_files() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            parquet: false,
            ..ExportOptions::default()
        };
        let written = export_all(&sample_table(), &sample_metadata(), dir.path(), options).unwrap();

        assert_eq!(written.tsv, Some(dir.path().join(TSV_FILE_NAME)));
        assert!(written.parquet.is_none());
        assert!(dir.path().join(METADATA_FILE_NAME).exists());
        assert!(!dir.path().join(PARQUET_FILE_NAME).exists());
        assert_eq!(written.paths().count(), 2);
    }

    #[test]
    fn test_empty_table_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_all(
            &UnifiedTable::new(),
            &sample_metadata(),
            &dir.path().join("out"),
            ExportOptions::default(),
        )
        .unwrap();
        assert_eq!(written, ExportedFiles::default());
        assert!(!dir.path().join("out").exists());
    }
}
