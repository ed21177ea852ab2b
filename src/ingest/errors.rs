use thiserror::Error;

use crate::types::{ParseError, RowNumber};

/// Failure to turn one CSV row into a deal. Never fatal to the upload.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RowError {
    #[error("Row must contain at least {expected} columns. Found: {found}")]
    Shape {
        expected: usize,
        found: usize
    },
    #[error("{source} at row {row_number}")]
    Field {
        row_number: RowNumber,
        source: ParseError
    }
}

impl RowError {
    pub fn field(row_number: RowNumber, source: ParseError) -> Self {
        Self::Field { row_number, source }
    }
}

/// Failure that aborts a whole upload before any record is processed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid file: {0}")]
    InvalidFile(String),
    #[error("Failed to parse CSV file: {0}")]
    StructuralRead(#[from] csv::Error),
    #[error("Failed to parse CSV file: unclosed quoted field opened on line {line}")]
    UnclosedQuote {
        line: u64
    }
}

impl IngestError {
    pub fn empty_upload() -> Self {
        Self::InvalidFile("file is empty".to_string())
    }

    pub fn unsupported_content_type(content_type: Option<&str>) -> Self {
        Self::InvalidFile(format!("Invalid file type '{}'. Expected CSV", content_type.unwrap_or("none")))
    }
}
