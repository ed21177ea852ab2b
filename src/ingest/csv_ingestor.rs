use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, error, info, warn};

use crate::ingest::errors::IngestError;
use crate::ingest::row_parser::parse_row;
use crate::ingest::upload::Upload;
use crate::models::Candidate;
use crate::types::RowNumber;

/// Declared content types accepted for CSV uploads (case-insensitive, exact match).
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["text/csv", "application/vnd.ms-excel", "text/plain"];

/// Turns a CSV upload into an ordered sequence of candidates.
///
/// The first record is always treated as a header. Blank rows are skipped without a
/// trace; rows that fail to parse become placeholder candidates carrying the parse
/// failure, so they are rejected and reported downstream instead of being dropped.
#[derive(Debug, Clone)]
pub struct CsvIngestor {
    accepted_content_types: Vec<String>
}

impl CsvIngestor {
    pub fn new() -> Self {
        Self {
            accepted_content_types: ACCEPTED_CONTENT_TYPES.iter().map(|content_type| content_type.to_string()).collect()
        }
    }

    pub fn with_accepted_content_types(mut self, content_types: Vec<String>) -> Self {
        self.accepted_content_types = content_types;
        self
    }

    pub fn ingest(&self, upload: &Upload) -> Result<Vec<Candidate>, IngestError> {
        if upload.is_empty() {
            return Err(IngestError::empty_upload());
        }

        if !self.accepts(upload.content_type()) {
            return Err(IngestError::unsupported_content_type(upload.content_type()));
        }

        // The csv reader runs an open quote to EOF, which would swallow every later row.
        if let Some(line) = unclosed_quote_line(upload.bytes()) {
            error!("CSV file has an unclosed quote opened on line {line}");
            return Err(IngestError::UnclosedQuote { line });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(upload.bytes());

        let mut candidates = Vec::new();
        let mut header_seen = false;
        let mut record = StringRecord::new();
        let mut index: RowNumber = 0;

        loop {
            let has_record = reader.read_record(&mut record).map_err(|error| {
                error!("Error reading CSV file: {error}");
                IngestError::StructuralRead(error)
            })?;

            if !has_record {
                break;
            }

            if !header_seen {
                debug!("Skipping header row: {record:?}");
                header_seen = true;
                continue;
            }

            // Blank records still take a row number; a quoted cell spanning lines does not add any.
            index += 1;
            let row_number = index;

            if is_blank(&record) {
                debug!("Skipping empty row {row_number}");
                continue;
            }

            match parse_row(&record, row_number) {
                Ok(deal) => candidates.push(Candidate::parsed(row_number, deal)),
                Err(row_error) => {
                    warn!("Error parsing row {row_number}: {row_error}");
                    let deal_id = record.get(0)
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("UNKNOWN_ROW_{row_number}"));

                    candidates.push(Candidate::unparseable(row_number, deal_id, row_error));
                }
            }
        }

        if !header_seen {
            warn!("CSV file has no rows");
        }

        info!("Parsed {} candidate deals from CSV", candidates.len());

        Ok(candidates)
    }

    fn accepts(&self, content_type: Option<&str>) -> bool {
        content_type.is_some_and(|content_type| {
            self.accepted_content_types.iter().any(|accepted| accepted.eq_ignore_ascii_case(content_type))
        })
    }
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Line on which a quoted field opens and never closes. Escaped `""` pairs cancel out.
fn unclosed_quote_line(bytes: &[u8]) -> Option<u64> {
    let mut line = 1;
    let mut opened_on = None;

    for byte in bytes {
        match byte {
            b'"' => opened_on = if opened_on.is_some() { None } else { Some(line) },
            b'\n' => line += 1,
            _ => {}
        }
    }

    opened_on
}
