use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use csv::{Writer, WriterBuilder};
use tracing::error;

use crate::models::{ErrorClassification, ImportError};
use crate::storage::errors::StorageError;
use crate::storage::ErrorSink;
use crate::types::RowNumber;

const CSV_HEADER: [&str; 5] = ["row_number", "deal_id", "error_type", "error_message", "created_at"];

/// In-memory append-only audit log. Entries keep the order they were recorded in.
pub struct ErrorLog {
    entries: Mutex<Vec<ImportError>>
}

impl ErrorLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new())
        }
    }

    pub fn entries(&self) -> Vec<ImportError> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink for ErrorLog {
    fn record(&self, row_number: Option<RowNumber>, deal_id: Option<&str>, message: &str, classification: ErrorClassification) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = entries.len() as u64 + 1;

        entries.push(ImportError {
            id,
            row_number,
            deal_id: deal_id.map(str::to_string),
            error_message: message.to_string(),
            error_type: classification,
            created_at: Local::now().naive_local()
        });
    }
}

/// File-backed audit log, one CSV line per rejected row, flushed as it is written.
pub struct CsvErrorLog {
    writer: Mutex<Writer<File>>
}

impl CsvErrorLog {
    /// Opens `path` for appending, writing the header if the file is new or empty.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }

        Ok(Self {
            writer: Mutex::new(writer)
        })
    }

    fn append(&self, row_number: Option<RowNumber>, deal_id: Option<&str>, message: &str, classification: ErrorClassification) -> Result<(), StorageError> {
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let row_number = row_number.map(|row| row.to_string()).unwrap_or_default();
        let created_at = Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string();

        writer.write_record([
            row_number.as_str(),
            deal_id.unwrap_or_default(),
            classification.as_str(),
            message,
            created_at.as_str()
        ])?;
        writer.flush()?;

        Ok(())
    }
}

impl ErrorSink for CsvErrorLog {
    fn record(&self, row_number: Option<RowNumber>, deal_id: Option<&str>, message: &str, classification: ErrorClassification) {
        if let Err(error) = self.append(row_number, deal_id, message, classification) {
            error!("Failed to record import error for row {row_number:?}: {error}");
        }
    }
}
