//! CLI Exit Code Registry
//!
//! Single source of truth for `dbdiff` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success, including runs that skipped sheets              |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad or missing arguments)                   |
//! | 3    | `--strict` and at least one sheet was skipped            |
//! | 4    | An input workbook is missing or cannot be opened         |
//! | 5    | The report could not be written or saved                 |
//!
//! Skipped sheets are not an error by default: the report for the
//! remaining sheets is still complete. `--strict` turns them into exit 3.

/// Success - comparison finished and the report was saved.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap uses the same code for parse failures.
pub const EXIT_USAGE: u8 = 2;

/// One or more sheets were skipped and `--strict` was given.
pub const EXIT_SKIPPED: u8 = 3;

/// Input workbook not found or not a readable workbook.
pub const EXIT_OPEN: u8 = 4;

/// Output directory or report workbook could not be written.
pub const EXIT_WRITE: u8 = 5;
