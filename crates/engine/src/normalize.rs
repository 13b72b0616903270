use crate::error::DiffError;
use crate::table::Table;

/// Prefix the reader gives to columns whose header cell was blank.
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Placeholder name for a blank header cell at `index` (0-based).
pub fn placeholder_name(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}: {index}")
}

pub fn is_placeholder_column(name: &str) -> bool {
    name.starts_with(PLACEHOLDER_PREFIX)
}

/// Drop placeholder columns and fold empty text into `Value::Empty`.
///
/// Applied once to each side before any comparison. Idempotent.
pub fn normalize(table: Table) -> Result<Table, DiffError> {
    let (columns, rows) = table.into_parts();
    let keep: Vec<bool> = columns.iter().map(|c| !is_placeholder_column(c)).collect();

    let columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect();
    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(v, k)| k.then(|| v.canonical()))
                .collect()
        })
        .collect();

    // Removing whole columns keeps rows rectangular and names unique.
    Table::new(columns, rows)
}
