use std::path::PathBuf;

use thiserror::Error;

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Workbook not found: {0}")]
    SourceMissing(PathBuf),
    #[error("Workbook could not be decoded: {0}")]
    Workbook(String),
    #[error("Workbook has no sheets")]
    NoSheets,
    #[error("Row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },
}

pub type IngestResult<T> = Result<T, IngestError>;
