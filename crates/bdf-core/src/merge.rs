//! Merge engine
//!
//! Folds per-fetch [`ResultTable`]s into one [`UnifiedTable`], outer-joined on the input
//! identifier `(identifier, identifier.source)`.
//!
//! Cell policy when a column already holds a value for the same identifier:
//!
//! | existing        | incoming        | result                                   |
//! |-----------------|-----------------|------------------------------------------|
//! | `Records(a)`    | `Records(b)`    | `a` followed by the records of `b` not already in `a` |
//! | `Scalar(x)`     | `Scalar(x)`     | unchanged                                |
//! | `Scalar(x)`     | `Scalar(y)`     | `Many([x, y])`                           |
//! | `Many(v)`       | scalar values   | `v` plus values not already present      |
//!
//! Values are never overwritten, and re-applying an identical table leaves the content
//! unchanged because list cells are deduplicated by value.

use crate::model::{Cell, ColumnSpec, ResultRow, ResultTable, Target, UnifiedRow, UnifiedTable};
use bdf_common::{BdfError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Merge `incoming` into `accumulated` and return the widened table
pub fn merge(mut accumulated: UnifiedTable, incoming: &ResultTable) -> Result<UnifiedTable> {
    accumulated.absorb(incoming)?;
    Ok(accumulated)
}

impl UnifiedTable {
    /// In-place form of [`merge`].
    ///
    /// Column kinds are checked before any row is touched, so a rejected table leaves
    /// `self` unchanged.
    pub fn absorb(&mut self, incoming: &ResultTable) -> Result<()> {
        let mut new_columns = Vec::new();
        for column in incoming.columns() {
            match self.column(&column.name) {
                Some(existing) if existing.kind != column.kind => {
                    return Err(BdfError::Merge(format!(
                        "column '{}' is {:?} in the accumulated table but {:?} in the incoming one",
                        column.name, existing.kind, column.kind
                    )));
                }
                Some(_) => {}
                None => new_columns.push(column.clone()),
            }
        }
        self.columns.extend(new_columns);

        for row in incoming.rows() {
            self.absorb_row(row)?;
        }
        Ok(())
    }

    fn absorb_row(&mut self, row: &ResultRow) -> Result<()> {
        let key = (row.identifier.clone(), row.identifier_source.clone());
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                self.rows.push(UnifiedRow {
                    identifier: row.identifier.clone(),
                    identifier_source: row.identifier_source.clone(),
                    targets: Vec::new(),
                    cells: BTreeMap::new(),
                });
                let position = self.rows.len() - 1;
                self.index.insert(key, position);
                position
            }
        };

        let unified = &mut self.rows[position];
        let target = Target {
            id: row.target.clone(),
            source: row.target_source.clone(),
        };
        if !target.id.is_empty() && !unified.targets.contains(&target) {
            unified.targets.push(target);
        }

        for (column, cell) in &row.cells {
            match unified.cells.remove(column) {
                None => {
                    unified.cells.insert(column.clone(), cell.clone());
                }
                Some(existing) => {
                    let merged = merge_cells(column, existing, cell)?;
                    unified.cells.insert(column.clone(), merged);
                }
            }
        }
        Ok(())
    }

    /// Build a table from a single result, the identity case of [`merge`]
    pub fn from_result(table: &ResultTable) -> Result<Self> {
        merge(UnifiedTable::new(), table)
    }

    /// Columns as declared, for callers that only need the names
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c: &ColumnSpec| c.name.as_str())
    }
}

fn merge_cells(column: &str, existing: Cell, incoming: &Cell) -> Result<Cell> {
    let merged = match (existing, incoming) {
        (Cell::Records(mut records), Cell::Records(more)) => {
            for record in more {
                if !records.contains(record) {
                    records.push(record.clone());
                }
            }
            Cell::Records(records)
        }
        (Cell::Scalar(value), Cell::Scalar(other)) => {
            if &value == other {
                Cell::Scalar(value)
            } else {
                Cell::Many(vec![value, other.clone()])
            }
        }
        (Cell::Scalar(value), Cell::Many(others)) => Cell::Many(union(vec![value], others)),
        (Cell::Many(values), Cell::Scalar(other)) => {
            Cell::Many(union(values, std::slice::from_ref(other)))
        }
        (Cell::Many(values), Cell::Many(others)) => Cell::Many(union(values, others)),
        (existing, incoming) => {
            return Err(BdfError::Merge(format!(
                "cannot merge {:?} cell into {:?} cell of column '{}'",
                incoming.kind(),
                existing.kind(),
                column
            )))
        }
    };
    Ok(merged)
}

fn union(mut values: Vec<Value>, more: &[Value]) -> Vec<Value> {
    for value in more {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{MappedIdentifier, Record};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn wikipathways() -> ResultTable {
        let mut table = ResultTable::new(vec![ColumnSpec::records("WikiPathways")]);
        for (symbol, ncbi, pathway) in [("BRCA1", "672", "WP2261"), ("TP53", "7157", "WP707")] {
            let mapped = MappedIdentifier::new(symbol, "HGNC", ncbi, "NCBI Gene");
            table
                .push(ResultRow::for_mapped(&mapped).with_cell(
                    "WikiPathways",
                    Cell::Records(vec![record(json!({"pathway_id": pathway}))]),
                ))
                .unwrap();
        }
        table
    }

    fn opentargets_location() -> ResultTable {
        let mut table = ResultTable::new(vec![ColumnSpec::records("OpenTargets_Location")]);
        let mapped = MappedIdentifier::new("BRCA1", "HGNC", "ENSG00000012048", "Ensembl");
        table
            .push(ResultRow::for_mapped(&mapped).with_cell(
                "OpenTargets_Location",
                Cell::Records(vec![record(json!({"location": "Nucleus"}))]),
            ))
            .unwrap();
        table
    }

    /// Rows as comparable tuples, ignoring row, column, and target order
    fn normalized(table: &UnifiedTable) -> Vec<(String, Vec<String>, Vec<(String, String)>)> {
        let mut rows: Vec<_> = table
            .rows()
            .iter()
            .map(|row| {
                let mut targets: Vec<String> = row.targets.iter().map(|t| t.id.clone()).collect();
                targets.sort();
                let cells = row
                    .cells
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json().to_string()))
                    .collect();
                (row.identifier.clone(), targets, cells)
            })
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_merge_into_empty_is_identity() {
        let incoming = wikipathways();
        let unified = merge(UnifiedTable::new(), &incoming).unwrap();

        assert_eq!(unified.columns(), incoming.columns());
        assert_eq!(unified.len(), incoming.len());
        for (row, source) in unified.rows().iter().zip(incoming.rows()) {
            assert_eq!(row.identifier, source.identifier);
            assert_eq!(row.identifier_source, source.identifier_source);
            assert_eq!(row.targets.len(), 1);
            assert_eq!(row.targets[0].id, source.target);
            assert_eq!(row.targets[0].source, source.target_source);
            assert_eq!(row.cells, source.cells);
        }
    }

    #[test]
    fn test_outer_join_widens_matching_rows() {
        let unified = merge(UnifiedTable::new(), &wikipathways()).unwrap();
        let unified = merge(unified, &opentargets_location()).unwrap();

        assert_eq!(unified.len(), 2);
        let brca1 = unified.row("BRCA1").unwrap();
        assert!(brca1.cell("WikiPathways").is_some());
        assert!(brca1.cell("OpenTargets_Location").is_some());
        assert_eq!(brca1.targets.len(), 2);

        let tp53 = unified.row("TP53").unwrap();
        assert!(tp53.cell("WikiPathways").is_some());
        assert!(tp53.cell("OpenTargets_Location").is_none());
    }

    #[test]
    fn test_merge_order_does_not_change_row_set() {
        let ab = merge(merge(UnifiedTable::new(), &wikipathways()).unwrap(), &opentargets_location())
            .unwrap();
        let ba = merge(merge(UnifiedTable::new(), &opentargets_location()).unwrap(), &wikipathways())
            .unwrap();

        assert_eq!(normalized(&ab), normalized(&ba));
        let mut ab_columns: Vec<&str> = ab.column_names().collect();
        let mut ba_columns: Vec<&str> = ba.column_names().collect();
        ab_columns.sort();
        ba_columns.sort();
        assert_eq!(ab_columns, ba_columns);
    }

    #[test]
    fn test_remerging_identical_table_does_not_duplicate() {
        let once = merge(UnifiedTable::new(), &wikipathways()).unwrap();
        let twice = merge(once.clone(), &wikipathways()).unwrap();

        assert_eq!(once, twice);
        let brca1 = twice.row("BRCA1").unwrap();
        assert_eq!(brca1.cell("WikiPathways").unwrap().records().len(), 1);
    }

    #[test]
    fn test_new_records_for_existing_column_accumulate() {
        let mapped = MappedIdentifier::new("BRCA1", "HGNC", "672", "NCBI Gene");
        let mut extra = ResultTable::new(vec![ColumnSpec::records("WikiPathways")]);
        extra
            .push(ResultRow::for_mapped(&mapped).with_cell(
                "WikiPathways",
                Cell::Records(vec![
                    record(json!({"pathway_id": "WP2261"})),
                    record(json!({"pathway_id": "WP4255"})),
                ]),
            ))
            .unwrap();

        let unified = merge(merge(UnifiedTable::new(), &wikipathways()).unwrap(), &extra).unwrap();
        let ids: Vec<_> = unified
            .row("BRCA1")
            .unwrap()
            .cell("WikiPathways")
            .unwrap()
            .records()
            .iter()
            .map(|r| r["pathway_id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("WP2261"), json!("WP4255")]);
    }

    #[test]
    fn test_conflicting_scalars_become_list() {
        let mapped = MappedIdentifier::new("TP53", "HGNC", "7157", "NCBI Gene");
        let scalar = |value: &str| {
            let mut table = ResultTable::new(vec![ColumnSpec::scalar("chromosome")]);
            table
                .push(ResultRow::for_mapped(&mapped).with_cell("chromosome", Cell::Scalar(json!(value))))
                .unwrap();
            table
        };

        let unified = merge(UnifiedTable::new(), &scalar("17")).unwrap();
        let unified = merge(unified, &scalar("17")).unwrap();
        assert_eq!(unified.row("TP53").unwrap().cell("chromosome"), Some(&Cell::Scalar(json!("17"))));

        let unified = merge(unified, &scalar("17p13.1")).unwrap();
        let unified = merge(unified, &scalar("17")).unwrap();
        assert_eq!(
            unified.row("TP53").unwrap().cell("chromosome"),
            Some(&Cell::Many(vec![json!("17"), json!("17p13.1")]))
        );
    }

    #[test]
    fn test_kind_conflict_is_rejected_without_partial_merge() {
        let unified = merge(UnifiedTable::new(), &wikipathways()).unwrap();

        let mapped = MappedIdentifier::new("BRCA1", "HGNC", "672", "NCBI Gene");
        let mut clash = ResultTable::new(vec![
            ColumnSpec::records("DisGeNET"),
            ColumnSpec::scalar("WikiPathways"),
        ]);
        clash
            .push(ResultRow::for_mapped(&mapped).with_cell("WikiPathways", Cell::Scalar(json!("x"))))
            .unwrap();

        let mut target = unified.clone();
        assert!(target.absorb(&clash).is_err());
        assert_eq!(target, unified);
    }
}
