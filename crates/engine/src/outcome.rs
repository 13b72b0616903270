use std::fmt;

use serde::Serialize;

use crate::error::DiffError;
use crate::keys::KeySpec;
use crate::labels::Labels;
use crate::shape::Shape;

// ---------------------------------------------------------------------------
// Per-sheet outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ReadError,
    MissingKeyColumns,
    AlignmentError,
}

impl SkipReason {
    /// Per-sheet errors map to a skip; write errors are fatal and map to nothing.
    pub fn from_error(err: &DiffError) -> Option<Self> {
        match err {
            DiffError::SheetRead { .. } | DiffError::RaggedRow { .. } | DiffError::DuplicateColumn(_) => {
                Some(SkipReason::ReadError)
            }
            DiffError::MissingKeyColumns(_) => Some(SkipReason::MissingKeyColumns),
            DiffError::Alignment(_) => Some(SkipReason::AlignmentError),
            DiffError::Write(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ReadError => "read error",
            SkipReason::MissingKeyColumns => "missing index cols",
            SkipReason::AlignmentError => "merge error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetOutcome {
    /// Differences found and written as `section`.
    Written { section: String, shape: Shape, rows: usize },
    NoDifferences { shape: Shape },
    Skipped { reason: SkipReason, detail: String },
}

impl fmt::Display for SheetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetOutcome::Written { section, .. } => write!(f, "-> wrote sheet: {section}"),
            SheetOutcome::NoDifferences { shape } => {
                write!(f, "= no differences ({})", shape.as_str())
            }
            SheetOutcome::Skipped { reason, detail } => {
                write!(f, "! skip ({}): {detail}", reason.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeySpec>,
    #[serde(flatten)]
    pub outcome: SheetOutcome,
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// Everything a run did, in processing order. Rendering is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLog {
    pub labels: Labels,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
    pub sheets: Vec<SheetReport>,
}

impl RunLog {
    pub fn sections(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter_map(|s| match &s.outcome {
                SheetOutcome::Written { section, .. } => Some(section.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| matches!(s.outcome, SheetOutcome::Skipped { .. }))
            .count()
    }

    pub fn outcome(&self, sheet: &str) -> Option<&SheetOutcome> {
        self.sheets.iter().find(|s| s.sheet == sheet).map(|s| &s.outcome)
    }
}
