//! `dbdiff-engine`: sheet-by-sheet workbook comparison.
//!
//! Pure engine crate: receives tables through [`WorkbookSource`], hands report
//! sections to a [`ReportSink`], returns a [`RunLog`]. No file IO.

pub mod align;
pub mod cell_diff;
pub mod error;
pub mod identity;
pub mod keys;
pub mod labels;
pub mod normalize;
pub mod outcome;
pub mod report;
pub mod run;
pub mod shape;
pub mod sheets;
pub mod table;
pub mod value;

pub use error::DiffError;
pub use keys::{KeyMap, KeySpec};
pub use labels::{Labels, Origin};
pub use outcome::{RunLog, SheetOutcome, SheetReport, SkipReason};
pub use report::{output_file_name, ReportSink, Section, SectionKind};
pub use run::{compare_tables, run, CompareOptions, SheetDiff, WorkbookSource};
pub use table::Table;
pub use value::Value;
