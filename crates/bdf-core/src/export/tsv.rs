//! Tab-separated export

use super::{cell_text, key_values, KEY_COLUMNS};
use crate::model::UnifiedTable;
use bdf_common::{BdfError, Result};
use std::io::Write;

/// Write `table` as TSV: key columns, then annotation columns in first-contribution order.
///
/// List-valued cells are JSON arrays; absent cells are empty.
pub fn write_tsv<W: Write>(table: &UnifiedTable, writer: W) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    let csv_error = |e: csv::Error| BdfError::export(format!("TSV write failed: {}", e));

    let header = KEY_COLUMNS
        .iter()
        .copied()
        .chain(table.column_names());
    tsv.write_record(header).map_err(csv_error)?;

    for row in table.rows() {
        let keys = key_values(row);
        let cells = table
            .columns()
            .iter()
            .map(|column| row.cell(&column.name).map(cell_text).unwrap_or_default());
        let record: Vec<String> = keys.into_iter().chain(cells).collect();
        tsv.write_record(&record).map_err(csv_error)?;
    }

    tsv.flush()?;
    Ok(())
}
