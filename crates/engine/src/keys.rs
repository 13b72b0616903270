use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::table::Table;

// ---------------------------------------------------------------------------
// Key specification
// ---------------------------------------------------------------------------

/// Column(s) that identify a row within one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KeySpec {
    Single(String),
    Composite(Vec<String>),
}

impl KeySpec {
    pub fn columns(&self) -> Vec<&str> {
        match self {
            KeySpec::Single(c) => vec![c.as_str()],
            KeySpec::Composite(cols) => cols.iter().map(String::as_str).collect(),
        }
    }

    /// An empty name or empty list configures nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            KeySpec::Single(c) => c.is_empty(),
            KeySpec::Composite(cols) => cols.is_empty(),
        }
    }
}

/// Column names may be written as bare numbers in config files (`Sales: 2024`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Name(String),
    Int(i64),
    Float(f64),
}

impl RawColumn {
    fn into_name(self) -> String {
        match self {
            RawColumn::Name(s) => s,
            RawColumn::Int(n) => n.to_string(),
            RawColumn::Float(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeySpec {
    One(RawColumn),
    Many(Vec<RawColumn>),
}

impl<'de> Deserialize<'de> for KeySpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawKeySpec::deserialize(deserializer)? {
            RawKeySpec::One(c) => KeySpec::Single(c.into_name()),
            RawKeySpec::Many(cols) => {
                KeySpec::Composite(cols.into_iter().map(RawColumn::into_name).collect())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Key map
// ---------------------------------------------------------------------------

/// Sheet name -> key specification, with a case-insensitive fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMap {
    exact: BTreeMap<String, KeySpec>,
    folded: BTreeMap<String, KeySpec>,
}

impl KeyMap {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<KeySpec>)>,
    {
        let exact: BTreeMap<String, KeySpec> = entries
            .into_iter()
            .filter_map(|(sheet, spec)| spec.filter(|s| !s.is_empty()).map(|s| (sheet, s)))
            .collect();

        // Iterate in reverse sorted order so the smallest original name wins a fold collision.
        let mut folded = BTreeMap::new();
        for (sheet, spec) in exact.iter().rev() {
            folded.insert(sheet.to_lowercase(), spec.clone());
        }

        Self { exact, folded }
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Exact sheet name first, then case-insensitive.
    pub fn resolve(&self, sheet: &str) -> Option<&KeySpec> {
        self.exact
            .get(sheet)
            .or_else(|| self.folded.get(&sheet.to_lowercase()))
    }
}

impl<'de> Deserialize<'de> for KeyMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<BTreeMap<String, Option<KeySpec>>> = Option::deserialize(deserializer)?;
        Ok(KeyMap::new(raw.unwrap_or_default()))
    }
}

/// Every key column missing from either table, in configured order.
pub fn check_key_columns(spec: &KeySpec, left: &Table, right: &Table) -> Result<(), DiffError> {
    let missing: Vec<String> = spec
        .columns()
        .into_iter()
        .filter(|c| !left.has_column(c) || !right.has_column(c))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DiffError::MissingKeyColumns(missing))
    }
}
