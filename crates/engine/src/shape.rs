use std::collections::BTreeSet;

use serde::Serialize;

use crate::identity::IndexedTable;

/// Which diff strategy a pair of tables calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Same value columns, same row identities: compare cell by cell.
    Same,
    /// Anything else: list rows present on one side only.
    Mismatched,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Same => "same shape",
            Shape::Mismatched => "shape mismatch",
        }
    }
}

/// Column sets and row-identity sets must both be equal, order-independent.
/// Duplicate identities on either side force `Mismatched`.
pub fn classify(left: &IndexedTable, right: &IndexedTable) -> Shape {
    let left_cols: BTreeSet<&str> = left.columns.iter().map(String::as_str).collect();
    let right_cols: BTreeSet<&str> = right.columns.iter().map(String::as_str).collect();
    if left_cols != right_cols || left.id_columns != right.id_columns {
        return Shape::Mismatched;
    }

    if !left.has_unique_ids() || !right.has_unique_ids() {
        return Shape::Mismatched;
    }

    let left_ids: BTreeSet<_> = left.ids.iter().collect();
    let right_ids: BTreeSet<_> = right.ids.iter().collect();
    if left_ids == right_ids {
        Shape::Same
    } else {
        Shape::Mismatched
    }
}
