mod csv_ingestor;
mod errors;
mod row_parser;
mod upload;

pub use csv_ingestor::{CsvIngestor, ACCEPTED_CONTENT_TYPES};
pub use errors::{IngestError, RowError};
pub use upload::Upload;
