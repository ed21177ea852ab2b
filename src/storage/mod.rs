mod deal_storage;
mod error_log;
mod errors;
mod persister;

use crate::models::{ErrorClassification, StoredDeal, ValidDeal};
use crate::types::RowNumber;

pub use deal_storage::DealStorage;
pub use error_log::{CsvErrorLog, ErrorLog};
pub use errors::StorageError;
pub use persister::persist_unique;

/// Persistent home of accepted deals. `insert` is the uniqueness authority: it must
/// reject an existing `deal_id` with [`StorageError::Duplicate`] atomically.
pub trait DealStore: Send + Sync + 'static {
    fn exists(&self, deal_id: &str) -> Result<bool, StorageError>;
    fn insert(&self, deal: ValidDeal) -> Result<StoredDeal, StorageError>;
    fn get(&self, deal_id: &str) -> Result<StoredDeal, StorageError>;
    fn list_all(&self) -> Result<Vec<StoredDeal>, StorageError>;
}

/// Audit trail for rejected rows. Recording never fails from the caller's point of view.
pub trait ErrorSink: Send + Sync + 'static {
    fn record(&self, row_number: Option<RowNumber>, deal_id: Option<&str>, message: &str, classification: ErrorClassification);
}
