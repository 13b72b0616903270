// File I/O operations

pub mod error;
pub mod report;
pub mod xlsx;

pub use error::IoError;
pub use report::XlsxReport;
pub use xlsx::ExcelSource;
