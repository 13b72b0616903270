use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DiffError;
use crate::labels::Labels;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Cell-level changes between same-shape tables.
    Same,
    /// Rows present in one workbook only.
    Diff,
}

impl SectionKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            SectionKind::Same => "_same",
            SectionKind::Diff => "_diff",
        }
    }
}

/// One named block of the comparison report, already flattened to single headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
    pub table: Table,
}

impl Section {
    pub fn new(sheet: &str, kind: SectionKind, table: Table) -> Self {
        Self {
            name: section_name(sheet, kind),
            kind,
            table,
        }
    }
}

pub fn section_name(sheet: &str, kind: SectionKind) -> String {
    format!("{sheet}{}", kind.suffix())
}

/// `<YYMMDD>_<left>_<right>_db_differences.xlsx`
pub fn output_file_name(date: NaiveDate, labels: &Labels) -> String {
    format!(
        "{}_{}_{}_db_differences.xlsx",
        date.format("%y%m%d"),
        labels.left,
        labels.right
    )
}

/// Destination for report sections. Sections arrive in sheet order, once each.
pub trait ReportSink {
    fn write_section(&mut self, section: &Section) -> Result<(), DiffError>;
}

/// In-memory sink.
impl ReportSink for Vec<Section> {
    fn write_section(&mut self, section: &Section) -> Result<(), DiffError> {
        self.push(section.clone());
        Ok(())
    }
}
