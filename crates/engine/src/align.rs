// Row alignment for tables whose shapes differ.
// Full outer join on the alignment keys; matched rows are dropped, the rest
// are tagged with the workbook they came from.

use std::collections::{BTreeSet, HashSet};

use crate::cell_diff::{flatten_header, uniquify};
use crate::error::DiffError;
use crate::identity::{position_column, reject_repeated};
use crate::keys::{check_key_columns, KeySpec};
use crate::labels::{Labels, Origin};
use crate::table::Table;
use crate::value::Value;

/// Header of the classification column in the flattened output.
pub const ORIGIN_COLUMN: &str = "Different";

#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedRow {
    pub origin: Origin,
    /// Aligned to `RowAlignment::columns`.
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowAlignment {
    /// Columns the join was performed on.
    pub keys: Vec<String>,
    pub columns: Vec<String>,
    /// Left-only rows in left order, then right-only rows in right order.
    pub rows: Vec<UnmatchedRow>,
}

impl RowAlignment {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, origin: Origin) -> usize {
        self.rows.iter().filter(|r| r.origin == origin).count()
    }

    /// Flatten with the classification column appended.
    pub fn to_table(&self, labels: &Labels) -> Result<Table, DiffError> {
        let mut headers = self.columns.clone();
        headers.push(ORIGIN_COLUMN.to_string());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values.clone();
                values.push(Value::Text(labels.only(row.origin)));
                values
            })
            .collect();

        Table::new(uniquify(headers), rows)
    }
}

/// Where an output column takes its value from.
#[derive(Debug, Clone, Copy)]
enum Source {
    Key(usize),
    Left(usize),
    Right(usize),
}

/// Align two tables and keep only the rows present on one side.
///
/// With a key, rows join on the key columns. Without one, they join on the
/// row position plus every column the two tables share, so a row matches
/// only if it sits at the same position with identical shared values.
pub fn align_rows(
    left: &Table,
    right: &Table,
    key: Option<&KeySpec>,
    labels: &Labels,
) -> Result<RowAlignment, DiffError> {
    let (positional, key_cols) = match key {
        Some(spec) => {
            check_key_columns(spec, left, right)?;
            let cols = spec.columns();
            reject_repeated(&cols)?;
            (false, cols.into_iter().map(str::to_string).collect::<Vec<_>>())
        }
        None => {
            // Position is always part of the join, so no shared columns means position alone.
            let shared: BTreeSet<&str> = left
                .column_set()
                .intersection(&right.column_set())
                .copied()
                .collect();
            (true, shared.into_iter().map(str::to_string).collect())
        }
    };

    let left_keys = join_keys(left, &key_cols, positional);
    let right_keys = join_keys(right, &key_cols, positional);
    let left_set: HashSet<&Vec<Value>> = left_keys.iter().collect();
    let right_set: HashSet<&Vec<Value>> = right_keys.iter().collect();

    // Output layout: keys, left non-key columns, right non-key columns.
    let mut headers: Vec<String> = Vec::new();
    let mut sources: Vec<Source> = Vec::new();
    if positional {
        let all: Vec<String> = left.columns().iter().chain(right.columns()).cloned().collect();
        headers.push(position_column(&all));
        sources.push(Source::Key(0));
    }
    let key_offset = usize::from(positional);
    for (i, col) in key_cols.iter().enumerate() {
        headers.push(col.clone());
        sources.push(Source::Key(i + key_offset));
    }
    let is_key = |c: &String| key_cols.contains(c);
    for (i, col) in left.columns().iter().enumerate() {
        if is_key(col) {
            continue;
        }
        headers.push(if right.has_column(col) {
            flatten_header(&[col.as_str(), labels.left.as_str()])
        } else {
            col.clone()
        });
        sources.push(Source::Left(i));
    }
    for (i, col) in right.columns().iter().enumerate() {
        if is_key(col) {
            continue;
        }
        headers.push(if left.has_column(col) {
            flatten_header(&[col.as_str(), labels.right.as_str()])
        } else {
            col.clone()
        });
        sources.push(Source::Right(i));
    }

    let mut rows = Vec::new();
    for (origin, table, keys, other) in [
        (Origin::Left, left, &left_keys, &right_set),
        (Origin::Right, right, &right_keys, &left_set),
    ] {
        for (row, key) in table.rows().iter().zip(keys.iter()) {
            if other.contains(key) {
                continue;
            }
            let values = sources
                .iter()
                .map(|src| match (*src, origin) {
                    (Source::Key(k), _) => key[k].clone(),
                    (Source::Left(i), Origin::Left) | (Source::Right(i), Origin::Right) => {
                        row[i].clone()
                    }
                    _ => Value::Empty,
                })
                .collect();
            rows.push(UnmatchedRow { origin, values });
        }
    }

    log::debug!(
        "aligned on [{}]{}: {} unmatched row(s)",
        key_cols.join(", "),
        if positional { " + position" } else { "" },
        rows.len()
    );

    Ok(RowAlignment {
        keys: key_cols,
        columns: uniquify(headers),
        rows,
    })
}

/// Join tuple per row: optional 1-based position, then the key column values.
fn join_keys(table: &Table, key_cols: &[String], positional: bool) -> Vec<Vec<Value>> {
    let idx: Vec<usize> = key_cols
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(pos, row)| {
            let mut key = Vec::with_capacity(idx.len() + 1);
            if positional {
                key.push(Value::number((pos + 1) as f64));
            }
            key.extend(idx.iter().map(|&i| row[i].clone()));
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        Labels::new("v1", "v2")
    }

    #[test]
    fn keyed_alignment_finds_added_and_removed_rows() {
        let a = Table::from_rows(["id", "qty"], [[1.0, 5.0], [2.0, 3.0]]).unwrap();
        let b = Table::from_rows(["id", "qty"], [[1.0, 5.0], [3.0, 7.0]]).unwrap();
        let result = align_rows(&a, &b, Some(&KeySpec::Single("id".into())), &labels()).unwrap();

        assert_eq!(result.columns, ["id", "qty_v1", "qty_v2"]);
        assert_eq!(result.count(Origin::Left), 1);
        assert_eq!(result.count(Origin::Right), 1);
        assert_eq!(
            result.rows[0].values,
            vec![Value::number(2.0), Value::number(3.0), Value::Empty]
        );
        assert_eq!(
            result.rows[1].values,
            vec![Value::number(3.0), Value::Empty, Value::number(7.0)]
        );
    }

    #[test]
    fn unkeyed_alignment_uses_shared_columns_and_position() {
        let a = Table::from_rows(["a", "b"], [[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Table::from_rows(["a", "b"], [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        let result = align_rows(&a, &b, None, &labels()).unwrap();

        assert_eq!(result.keys, ["a", "b"]);
        assert_eq!(result.columns, ["row", "a", "b"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].origin, Origin::Right);
        assert_eq!(
            result.rows[0].values,
            vec![Value::number(3.0), Value::number(5.0), Value::number(6.0)]
        );
    }

    #[test]
    fn unkeyed_alignment_keeps_side_specific_columns() {
        let a = Table::from_rows(["a", "old"], [[1.0, 9.0]]).unwrap();
        let b = Table::from_rows(["a", "new"], [[2.0, 8.0]]).unwrap();
        let result = align_rows(&a, &b, None, &labels()).unwrap();

        assert_eq!(result.columns, ["row", "a", "old", "new"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(
            result.rows[0].values,
            vec![Value::number(1.0), Value::number(1.0), Value::number(9.0), Value::Empty]
        );
        assert_eq!(
            result.rows[1].values,
            vec![Value::number(1.0), Value::number(2.0), Value::Empty, Value::number(8.0)]
        );
    }

    #[test]
    fn no_shared_columns_aligns_on_position_alone() {
        let a = Table::from_rows(["old_a"], [[1.0], [2.0]]).unwrap();
        let b = Table::from_rows(["new_b"], [[1.0], [2.0], [3.0]]).unwrap();
        let result = align_rows(&a, &b, None, &labels()).unwrap();

        assert!(result.keys.is_empty());
        assert_eq!(result.columns, ["row", "old_a", "new_b"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].origin, Origin::Right);
        assert_eq!(
            result.rows[0].values,
            vec![Value::number(3.0), Value::Empty, Value::number(3.0)]
        );

        let table = result.to_table(&labels()).unwrap();
        assert_eq!(table.get(0, "Different"), Some(&Value::text("v2 only")));
    }

    #[test]
    fn repeated_key_column_is_an_alignment_error() {
        let a = Table::from_rows(["id"], [[1.0]]).unwrap();
        let b = Table::from_rows(["id"], [[2.0]]).unwrap();
        let key = KeySpec::Composite(vec!["id".into(), "id".into()]);
        assert!(matches!(
            align_rows(&a, &b, Some(&key), &labels()),
            Err(DiffError::Alignment(_))
        ));
    }

    #[test]
    fn missing_key_column_is_reported() {
        let a = Table::from_rows(["id"], [[1.0]]).unwrap();
        let b = Table::from_rows(["sku"], [[1.0]]).unwrap();
        assert_eq!(
            align_rows(&a, &b, Some(&KeySpec::Single("id".into())), &labels()),
            Err(DiffError::MissingKeyColumns(vec!["id".into()]))
        );
    }

    #[test]
    fn duplicate_keys_match_any_counterpart() {
        let a = Table::from_rows(["id", "qty"], [[1.0, 5.0], [1.0, 6.0]]).unwrap();
        let b = Table::from_rows(["id", "qty"], [[1.0, 7.0]]).unwrap();
        let result = align_rows(&a, &b, Some(&KeySpec::Single("id".into())), &labels()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn flattened_table_carries_origin_tag() {
        let a = Table::from_rows(["id"], [[1.0]]).unwrap();
        let b = Table::from_rows(["id"], [[2.0]]).unwrap();
        let table = align_rows(&a, &b, Some(&KeySpec::Single("id".into())), &labels())
            .unwrap()
            .to_table(&labels())
            .unwrap();
        assert_eq!(table.columns(), ["id", "Different"]);
        assert_eq!(table.get(0, "Different"), Some(&Value::text("v1 only")));
        assert_eq!(table.get(1, "Different"), Some(&Value::text("v2 only")));
    }
}
