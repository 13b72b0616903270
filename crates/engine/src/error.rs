use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DiffError {
    /// Sheet region could not be read or parsed.
    SheetRead { sheet: String, message: String },
    /// Table rows do not line up with the header.
    RaggedRow { row: usize, expected: usize, found: usize },
    /// Two columns share a name.
    DuplicateColumn(String),
    /// Configured key columns absent from one or both tables.
    MissingKeyColumns(Vec<String>),
    /// Full outer alignment could not be set up.
    Alignment(String),
    /// Report section could not be written or the report could not be saved.
    Write(String),
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SheetRead { sheet, message } => {
                write!(f, "cannot read sheet '{sheet}': {message}")
            }
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row} has {found} value(s), header has {expected}")
            }
            Self::DuplicateColumn(name) => write!(f, "duplicate column '{name}'"),
            Self::MissingKeyColumns(cols) => {
                write!(f, "missing index cols: [{}]", cols.join(", "))
            }
            Self::Alignment(msg) => write!(f, "alignment error: {msg}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

impl std::error::Error for DiffError {}
