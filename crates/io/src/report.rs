// Comparison report writer (.xlsx)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dbdiff_engine::{DiffError, ReportSink, Section, Value};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::IoError;

/// Excel's sheet-name length limit, in characters.
pub const MAX_SHEET_NAME: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Report workbook built in memory, one worksheet per section, saved once by [`XlsxReport::finalize`].
pub struct XlsxReport {
    path: PathBuf,
    workbook: Workbook,
    header_format: Format,
    /// Lower-cased names already used; Excel compares sheet names case-insensitively.
    used: HashSet<String>,
    sheets: Vec<String>,
}

impl XlsxReport {
    pub fn create(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            workbook: Workbook::new(),
            header_format: Format::new().set_bold(),
            used: HashSet::new(),
            sheets: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Worksheet names written so far, after sanitizing.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheets
    }

    /// Save the workbook. A report with no sections still produces a valid file.
    pub fn finalize(mut self) -> Result<PathBuf, IoError> {
        self.workbook.save(&self.path).map_err(|e| IoError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        log::info!("saved {} ({} sheet(s))", self.path.display(), self.sheets.len());
        Ok(self.path)
    }

    fn add_section(&mut self, section: &Section) -> Result<String, XlsxError> {
        let name = unique_sheet_name(&section.name, &self.used);
        if name != section.name {
            log::debug!("section '{}' written as '{}'", section.name, name);
        }

        let worksheet = self.workbook.add_worksheet().set_name(&name)?;
        write_table(worksheet, section, &self.header_format)?;

        self.used.insert(name.to_lowercase());
        self.sheets.push(name.clone());
        Ok(name)
    }
}

impl ReportSink for XlsxReport {
    fn write_section(&mut self, section: &Section) -> Result<(), DiffError> {
        self.add_section(section)
            .map(|_| ())
            .map_err(|e| DiffError::Write(format!("sheet '{}': {}", section.name, e)))
    }
}

fn write_table(worksheet: &mut Worksheet, section: &Section, header: &Format) -> Result<(), XlsxError> {
    let table = &section.table;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, header)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let row_num = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            match value {
                Value::Empty => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                Value::Number(n) => {
                    worksheet.write_number(row_num, col, n.into_inner())?;
                }
                Value::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(())
}

// ---------------------------------------------------------------------------
// Sheet names
// ---------------------------------------------------------------------------

/// Replace characters Excel rejects in sheet names and cut to 31 characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let mut clean: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();

    // No leading or trailing apostrophe
    if clean.starts_with('\'') {
        clean.replace_range(..1, "_");
    }
    if clean.ends_with('\'') {
        clean.pop();
        clean.push('_');
    }
    if clean.is_empty() {
        clean.push_str("Sheet");
    }
    clean
}

/// Sanitized name not yet in `used` (lower-cased), adding `~2`, `~3`, ... as needed.
pub fn unique_sheet_name(name: &str, used: &HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    if !used.contains(&base.to_lowercase()) {
        return base;
    }

    let mut n = 2;
    loop {
        let suffix = format!("~{}", n);
        let stem: String = base.chars().take(MAX_SHEET_NAME - suffix.len()).collect();
        let candidate = format!("{}{}", stem, suffix);
        if !used.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
