use tracing::{debug, warn};

use crate::models::{StoredDeal, ValidDeal};
use crate::storage::errors::StorageError;
use crate::storage::DealStore;

/// Test-and-insert for one validated deal, as its own unit of work.
///
/// The existence check short-circuits the common case; the store's own uniqueness
/// enforcement on `insert` settles races with concurrent imports of the same key.
pub fn persist_unique<S: DealStore + ?Sized>(store: &S, deal: ValidDeal) -> Result<StoredDeal, StorageError> {
    if store.exists(&deal.deal_id)? {
        warn!("Duplicate deal detected: {}", deal.deal_id);
        return Err(StorageError::duplicate(&deal.deal_id));
    }

    let deal_id = deal.deal_id.clone();

    match store.insert(deal) {
        Ok(stored) => {
            debug!("Stored deal [{}] with id [{}]", stored.deal_id(), stored.id);
            Ok(stored)
        }
        Err(error) if error.is_duplicate() => {
            warn!("Duplicate deal detected on insert: {deal_id}");
            Err(error)
        }
        Err(error) => Err(error)
    }
}
