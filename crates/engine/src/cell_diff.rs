// Cell-level comparison for same-shape tables.
// Pure functions: two indexed tables in, changed cells out.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::DiffError;
use crate::identity::{IndexedTable, RowId};
use crate::table::Table;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellChange {
    pub column: String,
    pub left: Value,
    pub right: Value,
}

/// One row with at least one change. Unchanged columns are not listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedRow {
    pub id: RowId,
    pub changes: Vec<CellChange>,
}

impl ChangedRow {
    pub fn change(&self, column: &str) -> Option<&CellChange> {
        self.changes.iter().find(|c| c.column == column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellDiff {
    pub id_columns: Vec<String>,
    /// Value columns in left-table order; used to order flattened headers.
    pub columns: Vec<String>,
    pub rows: Vec<ChangedRow>,
}

impl CellDiff {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.rows.iter().map(|r| r.changes.len()).sum()
    }

    /// Columns changed in at least one row, in left-table order.
    pub fn changed_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.rows.iter().any(|r| r.change(c).is_some()))
            .map(String::as_str)
            .collect()
    }

    /// Flatten to a single-header table: identity columns, then
    /// `<column>_<left_label>` / `<column>_<right_label>` per changed column.
    pub fn to_table(&self, left_label: &str, right_label: &str) -> Result<Table, DiffError> {
        let changed = self.changed_columns();

        let mut headers = self.id_columns.clone();
        for &col in &changed {
            headers.push(flatten_header(&[col, left_label]));
            headers.push(flatten_header(&[col, right_label]));
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = row.id.values();
                for &col in &changed {
                    match row.change(col) {
                        Some(c) => {
                            out.push(c.left.clone());
                            out.push(c.right.clone());
                        }
                        None => {
                            out.push(Value::Empty);
                            out.push(Value::Empty);
                        }
                    }
                }
                out
            })
            .collect();

        // A label can make `<a>_<label>` equal another header.
        Table::new(uniquify(headers), rows)
    }
}

// ---------------------------------------------------------------------------
// Core comparison
// ---------------------------------------------------------------------------

/// Compare two same-shape tables cell by cell.
///
/// Rows are visited in left-table order and matched by identity; columns are
/// matched by name. Values compare exactly, so `Empty` equals `Empty`.
pub fn diff_cells(left: &IndexedTable, right: &IndexedTable) -> CellDiff {
    let right_rows: HashMap<&RowId, usize> =
        right.ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
    let right_cols: Vec<Option<usize>> =
        left.columns.iter().map(|c| right.column_index(c)).collect();

    let mut rows = Vec::new();
    for (li, id) in left.ids.iter().enumerate() {
        let Some(&ri) = right_rows.get(id) else {
            continue;
        };

        let changes: Vec<CellChange> = left
            .columns
            .iter()
            .enumerate()
            .filter_map(|(ci, col)| {
                let lv = &left.rows[li][ci];
                let rv = right_cols[ci].map(|rc| &right.rows[ri][rc])?;
                (lv != rv).then(|| CellChange {
                    column: col.clone(),
                    left: lv.clone(),
                    right: rv.clone(),
                })
            })
            .collect();

        if !changes.is_empty() {
            rows.push(ChangedRow {
                id: id.clone(),
                changes,
            });
        }
    }

    CellDiff {
        id_columns: left.id_columns.clone(),
        columns: left.columns.clone(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Join the non-empty parts of a multi-level header with `_`.
pub fn flatten_header(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Append `.1`, `.2`, ... to repeated names.
pub fn uniquify(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        while counts.contains_key(&candidate) {
            let n = counts.entry(name.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        counts.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}
