//! Parquet export through Arrow
//!
//! Column types:
//! - key columns: `Utf8`
//! - list-of-record columns: `List<Utf8>`, one JSON-encoded record per element
//! - scalar columns: `Utf8`, or `List<Utf8>` when any row holds several values
//!
//! Absent cells are null.

use super::{key_values, scalar_text, KEY_COLUMNS};
use crate::model::{Cell, CellKind, ColumnSpec, UnifiedTable};
use ::parquet::arrow::ArrowWriter;
use arrow::array::{ArrayRef, ListBuilder, StringBuilder};
use arrow::record_batch::RecordBatch;
use bdf_common::{BdfError, Result};
use std::io::Write;
use std::sync::Arc;

/// Write `table` as a single-row-group Parquet file
pub fn write_parquet<W: Write + Send>(table: &UnifiedTable, writer: W) -> Result<()> {
    let batch = to_record_batch(table)?;

    let mut parquet = ArrowWriter::try_new(writer, batch.schema(), None)
        .map_err(|e| BdfError::export(format!("Parquet writer setup failed: {}", e)))?;
    parquet
        .write(&batch)
        .map_err(|e| BdfError::export(format!("Parquet write failed: {}", e)))?;
    parquet
        .close()
        .map_err(|e| BdfError::export(format!("Parquet finalisation failed: {}", e)))?;
    Ok(())
}

/// Build one Arrow batch holding the whole table
pub fn to_record_batch(table: &UnifiedTable) -> Result<RecordBatch> {
    let mut columns: Vec<(String, ArrayRef)> = Vec::with_capacity(KEY_COLUMNS.len() + table.columns().len());

    let keys: Vec<[String; 4]> = table.rows().iter().map(key_values).collect();
    for (i, name) in KEY_COLUMNS.iter().enumerate() {
        let mut builder = StringBuilder::new();
        for row_keys in &keys {
            builder.append_value(&row_keys[i]);
        }
        columns.push((name.to_string(), Arc::new(builder.finish())));
    }

    for spec in table.columns() {
        columns.push((spec.name.clone(), annotation_array(table, spec)));
    }

    RecordBatch::try_from_iter(columns)
        .map_err(|e| BdfError::export(format!("Failed to assemble record batch: {}", e)))
}

fn annotation_array(table: &UnifiedTable, spec: &ColumnSpec) -> ArrayRef {
    let cells = table.rows().iter().map(|row| row.cell(&spec.name));

    let as_list = match spec.kind {
        CellKind::Records => true,
        CellKind::Scalar => cells.clone().any(|cell| matches!(cell, Some(Cell::Many(_)))),
    };

    if !as_list {
        let mut builder = StringBuilder::new();
        for cell in cells {
            match cell {
                Some(Cell::Scalar(value)) => builder.append_value(scalar_text(value)),
                _ => builder.append_null(),
            }
        }
        return Arc::new(builder.finish());
    }

    let mut builder = ListBuilder::new(StringBuilder::new());
    for cell in cells {
        match cell {
            Some(Cell::Records(records)) => {
                for record in records {
                    builder.values().append_value(serde_json::Value::Object(record.clone()).to_string());
                }
                builder.append(true);
            }
            Some(Cell::Many(values)) => {
                for value in values {
                    builder.values().append_value(scalar_text(value));
                }
                builder.append(true);
            }
            Some(Cell::Scalar(value)) => {
                builder.values().append_value(scalar_text(value));
                builder.append(true);
            }
            None => builder.append(false),
        }
    }
    Arc::new(builder.finish())
}
