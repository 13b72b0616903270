// Excel workbook reading (xlsx, xlsm, xlsb, xls, ods)
//
// A sheet becomes a `Table`: `skip_rows` leading rows are dropped, the first
// non-blank row after them is the header, and every later non-blank row is data.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::Timelike;
use dbdiff_engine::normalize::placeholder_name;
use dbdiff_engine::{DiffError, Table, Value, WorkbookSource};

use crate::error::IoError;

/// An open workbook on disk.
pub struct ExcelSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl ExcelSource {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        if !path.is_file() {
            return Err(IoError::NotFound(path.to_path_buf()));
        }
        let workbook = open_workbook_auto(path).map_err(|e| IoError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("opened {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkbookSource for ExcelSource {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, sheet: &str, skip_rows: usize) -> Result<Table, DiffError> {
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| DiffError::SheetRead {
                sheet: sheet.to_string(),
                message: e.to_string(),
            })?;
        range_to_table(&range, skip_rows)
    }
}

// ---------------------------------------------------------------------------
// Range -> Table
// ---------------------------------------------------------------------------

/// Build a table from a sheet range, addressing rows and columns from A1.
pub fn range_to_table(range: &Range<Data>, skip_rows: usize) -> Result<Table, DiffError> {
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Table::default());
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let total_cols = start_col + width;

    let mut rows = range
        .rows()
        .enumerate()
        .filter(|(i, _)| start_row + i >= skip_rows)
        .map(|(_, cells)| {
            let mut row = vec![Value::Empty; start_col];
            row.extend(cells.iter().map(cell_value));
            row.resize(total_cols, Value::Empty);
            row
        })
        .filter(|row| row.iter().any(|v| !v.is_empty()));

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns = header_names(&header);
    let data: Vec<Vec<Value>> = rows.collect();

    Table::new(columns, data)
}

/// Header cells to unique column names. Blank cells get `Unnamed: <n>`,
/// repeats get `.1`, `.2`, ...
fn header_names(header: &[Value]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(header.len());

    for (i, cell) in header.iter().enumerate() {
        let base = match cell {
            Value::Empty => placeholder_name(i),
            other => other.to_string(),
        };
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) => Value::text(s.as_str()).canonical(),
        Data::Float(n) => Value::number(*n),
        Data::Int(n) => Value::from(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => Value::text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return Value::number(dt.as_f64());
            }
            match dt.as_datetime() {
                Some(ts) if ts.num_seconds_from_midnight() == 0 => {
                    Value::text(ts.date().format("%Y-%m-%d").to_string())
                }
                Some(ts) => Value::text(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
                None => Value::number(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::text(s.as_str()),
    }
}
