use crate::align::{align_rows, RowAlignment};
use crate::cell_diff::{diff_cells, CellDiff};
use crate::error::DiffError;
use crate::identity::IndexedTable;
use crate::keys::{check_key_columns, KeyMap, KeySpec};
use crate::labels::Labels;
use crate::normalize::normalize;
use crate::outcome::{RunLog, SheetOutcome, SheetReport, SkipReason};
use crate::report::{ReportSink, Section, SectionKind};
use crate::shape::{classify, Shape};
use crate::sheets::reconcile_sheets;
use crate::table::Table;

/// Leading rows discarded before the header row.
pub const DEFAULT_SKIP_ROWS: usize = 3;

/// Sheets whose names start with this are documentation, not data.
pub const DEFAULT_DOC_PREFIX: &str = "(DOC)";

/// Read access to one workbook.
pub trait WorkbookSource {
    fn sheet_names(&self) -> Vec<String>;

    /// Table for `sheet`, header taken from the first row after `skip_rows`.
    fn read_sheet(&mut self, sheet: &str, skip_rows: usize) -> Result<Table, DiffError>;
}

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub labels: Labels,
    pub skip_rows: usize,
    /// Sheets starting with this prefix are ignored on both sides. `None` or empty disables.
    pub exclude_prefix: Option<String>,
    pub keys: KeyMap,
}

impl CompareOptions {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            skip_rows: DEFAULT_SKIP_ROWS,
            exclude_prefix: Some(DEFAULT_DOC_PREFIX.to_string()),
            keys: KeyMap::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Single sheet
// ---------------------------------------------------------------------------

/// Result of comparing one pair of tables.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetDiff {
    Cells(CellDiff),
    Rows(RowAlignment),
}

impl SheetDiff {
    pub fn shape(&self) -> Shape {
        match self {
            SheetDiff::Cells(_) => Shape::Same,
            SheetDiff::Rows(_) => Shape::Mismatched,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SheetDiff::Cells(d) => d.is_empty(),
            SheetDiff::Rows(r) => r.is_empty(),
        }
    }

    /// Flattened report section, or `None` when there is nothing to report.
    pub fn to_section(&self, sheet: &str, labels: &Labels) -> Result<Option<Section>, DiffError> {
        if self.is_empty() {
            return Ok(None);
        }
        let section = match self {
            SheetDiff::Cells(d) => Section::new(
                sheet,
                SectionKind::Same,
                d.to_table(&labels.left, &labels.right)?,
            ),
            SheetDiff::Rows(r) => Section::new(sheet, SectionKind::Diff, r.to_table(labels)?),
        };
        Ok(Some(section))
    }
}

/// Normalize both tables, pick a strategy by shape, and diff.
pub fn compare_tables(
    left: Table,
    right: Table,
    key: Option<&KeySpec>,
    labels: &Labels,
) -> Result<SheetDiff, DiffError> {
    let left = normalize(left)?;
    let right = normalize(right)?;

    if let Some(spec) = key {
        check_key_columns(spec, &left, &right)?;
    }

    let left_idx = IndexedTable::index(&left, key)?;
    let right_idx = IndexedTable::index(&right, key)?;

    match classify(&left_idx, &right_idx) {
        Shape::Same => Ok(SheetDiff::Cells(diff_cells(&left_idx, &right_idx))),
        Shape::Mismatched => align_rows(&left, &right, key, labels).map(SheetDiff::Rows),
    }
}

// ---------------------------------------------------------------------------
// Whole run
// ---------------------------------------------------------------------------

/// Compare every common sheet of two workbooks, in sorted order.
///
/// Per-sheet failures are recorded in the returned log and the run moves on.
/// Only a failing `sink` aborts the run.
pub fn run<L, R, S>(
    left: &mut L,
    right: &mut R,
    options: &CompareOptions,
    sink: &mut S,
) -> Result<RunLog, DiffError>
where
    L: WorkbookSource + ?Sized,
    R: WorkbookSource + ?Sized,
    S: ReportSink + ?Sized,
{
    let labels = &options.labels;
    let sets = reconcile_sheets(
        left.sheet_names(),
        right.sheet_names(),
        options.exclude_prefix.as_deref(),
    );

    if !sets.only_left.is_empty() {
        log::info!("sheets only in {}: {:?}", labels.left, sets.only_left);
    }
    if !sets.only_right.is_empty() {
        log::info!("sheets only in {}: {:?}", labels.right, sets.only_right);
    }
    if options.keys.is_empty() {
        log::warn!("no sheet has a configured key; every sheet compares by position");
    }

    let mut reports = Vec::with_capacity(sets.common.len());
    for sheet in &sets.common {
        let key = options.keys.resolve(sheet);
        let compared = compare_sheet(left, right, sheet, key, options)
            .and_then(|diff| Ok((diff.shape(), diff.to_section(sheet, labels)?)));
        let outcome = match compared {
            Ok((shape, Some(section))) => {
                sink.write_section(&section)?;
                log::info!("{sheet}: wrote {} ({} rows)", section.name, section.table.len());
                SheetOutcome::Written {
                    section: section.name,
                    shape,
                    rows: section.table.len(),
                }
            }
            Ok((shape, None)) => {
                log::info!("{sheet}: no differences ({})", shape.as_str());
                SheetOutcome::NoDifferences { shape }
            }
            Err(err) => {
                let reason = SkipReason::from_error(&err).ok_or_else(|| err.clone())?;
                log::warn!("{sheet}: skipped: {err}");
                SheetOutcome::Skipped {
                    reason,
                    detail: skip_detail(&err),
                }
            }
        };

        reports.push(SheetReport {
            sheet: sheet.clone(),
            key: key.cloned(),
            outcome,
        });
    }

    Ok(RunLog {
        labels: labels.clone(),
        only_left: sets.only_left,
        only_right: sets.only_right,
        sheets: reports,
    })
}

fn compare_sheet<L, R>(
    left: &mut L,
    right: &mut R,
    sheet: &str,
    key: Option<&KeySpec>,
    options: &CompareOptions,
) -> Result<SheetDiff, DiffError>
where
    L: WorkbookSource + ?Sized,
    R: WorkbookSource + ?Sized,
{
    let left_table = left.read_sheet(sheet, options.skip_rows)?;
    let right_table = right.read_sheet(sheet, options.skip_rows)?;
    compare_tables(left_table, right_table, key, &options.labels)
}

fn skip_detail(err: &DiffError) -> String {
    match err {
        DiffError::MissingKeyColumns(cols) => format!("[{}]", cols.join(", ")),
        other => other.to_string(),
    }
}
