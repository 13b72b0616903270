// Row identity: key-column tuples, or ordinal position when no key is configured.

use std::collections::HashSet;

use crate::error::DiffError;
use crate::keys::{check_key_columns, KeySpec};
use crate::table::Table;
use crate::value::Value;

/// Header used for the ordinal identity column.
pub const POSITION_COLUMN: &str = "row";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    /// 0-based data row position.
    Position(usize),
    Key(Vec<Value>),
}

impl RowId {
    /// Values written under the identity columns. Positions are reported 1-based.
    pub fn values(&self) -> Vec<Value> {
        match self {
            RowId::Position(i) => vec![Value::number((*i + 1) as f64)],
            RowId::Key(vals) => vals.clone(),
        }
    }
}

/// A table split into identity and value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTable {
    pub id_columns: Vec<String>,
    pub ids: Vec<RowId>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl IndexedTable {
    /// Index by the key columns; they leave the value columns.
    pub fn by_key(table: &Table, spec: &KeySpec) -> Result<Self, DiffError> {
        let key_cols = spec.columns();
        check_key_columns(spec, table, table)?;
        reject_repeated(&key_cols)?;

        let key_idx: Vec<usize> = key_cols
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect();
        let value_idx: Vec<usize> = (0..table.columns().len())
            .filter(|i| !key_idx.contains(i))
            .collect();

        Ok(Self {
            id_columns: key_cols.iter().map(|c| c.to_string()).collect(),
            ids: table
                .rows()
                .iter()
                .map(|row| RowId::Key(key_idx.iter().map(|&i| row[i].clone()).collect()))
                .collect(),
            columns: value_idx.iter().map(|&i| table.columns()[i].clone()).collect(),
            rows: table
                .rows()
                .iter()
                .map(|row| value_idx.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    pub fn by_position(table: &Table) -> Self {
        Self {
            id_columns: vec![position_column(table.columns())],
            ids: (0..table.len()).map(RowId::Position).collect(),
            columns: table.columns().to_vec(),
            rows: table.rows().to_vec(),
        }
    }

    pub fn index(table: &Table, spec: Option<&KeySpec>) -> Result<Self, DiffError> {
        match spec {
            Some(spec) => Self::by_key(table, spec),
            None => Ok(Self::by_position(table)),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.ids.len());
        self.ids.iter().all(|id| seen.insert(id))
    }
}

/// `row`, or `_row`, `__row`, ... if the table already uses that name.
pub fn position_column(columns: &[String]) -> String {
    let mut name = POSITION_COLUMN.to_string();
    while columns.iter().any(|c| *c == name) {
        name.insert(0, '_');
    }
    name
}

pub(crate) fn reject_repeated(cols: &[&str]) -> Result<(), DiffError> {
    let mut seen = HashSet::new();
    for c in cols {
        if !seen.insert(*c) {
            return Err(DiffError::Alignment(format!("key column '{c}' listed more than once")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Table {
        Table::from_rows(
            ["id", "qty", "name"],
            vec![
                vec![Value::number(1.0), Value::number(5.0), Value::text("a")],
                vec![Value::number(2.0), Value::number(3.0), Value::text("b")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn key_columns_leave_value_columns() {
        let t = IndexedTable::by_key(&items(), &KeySpec::Single("id".into())).unwrap();
        assert_eq!(t.id_columns, ["id"]);
        assert_eq!(t.columns, ["qty", "name"]);
        assert_eq!(t.ids[1], RowId::Key(vec![Value::number(2.0)]));
        assert_eq!(t.rows[1], vec![Value::number(3.0), Value::text("b")]);
    }

    #[test]
    fn composite_key_keeps_configured_order() {
        let spec = KeySpec::Composite(vec!["name".into(), "id".into()]);
        let t = IndexedTable::by_key(&items(), &spec).unwrap();
        assert_eq!(t.id_columns, ["name", "id"]);
        assert_eq!(t.ids[0], RowId::Key(vec![Value::text("a"), Value::number(1.0)]));
        assert_eq!(t.columns, ["qty"]);
    }

    #[test]
    fn repeated_key_column_is_an_alignment_error() {
        let spec = KeySpec::Composite(vec!["id".into(), "id".into()]);
        assert!(matches!(
            IndexedTable::by_key(&items(), &spec),
            Err(DiffError::Alignment(_))
        ));
    }

    #[test]
    fn positional_ids_report_one_based() {
        let t = IndexedTable::by_position(&items());
        assert_eq!(t.id_columns, ["row"]);
        assert_eq!(t.ids[1].values(), vec![Value::number(2.0)]);
        assert_eq!(t.columns.len(), 3);
    }

    #[test]
    fn position_column_avoids_collisions() {
        let cols = vec!["row".to_string(), "_row".to_string()];
        assert_eq!(position_column(&cols), "__row");
    }

    #[test]
    fn duplicate_keys_are_detected() {
        let t = Table::from_rows(["id"], [[1.0], [1.0]]).unwrap();
        let idx = IndexedTable::by_key(&t, &KeySpec::Single("id".into())).unwrap();
        assert!(!idx.has_unique_ids());
    }
}
