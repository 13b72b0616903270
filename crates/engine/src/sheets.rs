use std::collections::BTreeSet;

use serde::Serialize;

/// Sheet names split by presence in the two workbooks. All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetSets {
    pub common: Vec<String>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

/// Reconcile two sheet-name lists, dropping names that start with `exclude_prefix`.
///
/// An empty or absent prefix filters nothing.
pub fn reconcile_sheets<L, R>(left: L, right: R, exclude_prefix: Option<&str>) -> SheetSets
where
    L: IntoIterator,
    L::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let keep = |name: &str| match exclude_prefix {
        Some(prefix) if !prefix.is_empty() => !name.starts_with(prefix),
        _ => true,
    };
    let filter = |names: Vec<String>| -> BTreeSet<String> {
        names.into_iter().filter(|n| keep(n)).collect()
    };

    let left = filter(left.into_iter().map(|n| n.as_ref().to_string()).collect());
    let right = filter(right.into_iter().map(|n| n.as_ref().to_string()).collect());

    SheetSets {
        common: left.intersection(&right).cloned().collect(),
        only_left: left.difference(&right).cloned().collect(),
        only_right: right.difference(&left).cloned().collect(),
    }
}
