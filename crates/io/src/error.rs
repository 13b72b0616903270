use std::fmt;
use std::path::PathBuf;

/// Workbook-level failures. Sheet-level read problems are `DiffError::SheetRead`.
#[derive(Debug, Clone, PartialEq)]
pub enum IoError {
    NotFound(PathBuf),
    Open { path: PathBuf, message: String },
    Write { path: PathBuf, message: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::NotFound(path) => write!(f, "file not found: {}", path.display()),
            IoError::Open { path, message } => {
                write!(f, "cannot open {}: {}", path.display(), message)
            }
            IoError::Write { path, message } => {
                write!(f, "cannot write {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for IoError {}

