use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::{StoredDeal, ValidDeal};
use crate::storage::errors::StorageError;
use crate::storage::DealStore;

/// In-memory deal store keyed by `deal_id`.
///
/// `insert` goes through the map's entry API, so the occupancy check and the write
/// happen under the same shard lock and concurrent inserts of one key cannot both win.
pub struct DealStorage {
    deals: Arc<DashMap<String, StoredDeal>>,
    next_id: AtomicU64
}

impl DealStorage {
    pub fn new() -> Self {
        Self {
            deals: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1)
        }
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }
}

impl Default for DealStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl DealStore for DealStorage {
    fn exists(&self, deal_id: &str) -> Result<bool, StorageError> {
        Ok(self.deals.contains_key(deal_id))
    }

    fn insert(&self, deal: ValidDeal) -> Result<StoredDeal, StorageError> {
        match self.deals.entry(deal.deal_id.clone()) {
            Entry::Occupied(_) => Err(StorageError::duplicate(&deal.deal_id)),
            Entry::Vacant(vacant) => {
                let stored = StoredDeal {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    deal,
                    created_at: Local::now().naive_local()
                };

                vacant.insert(stored.clone());

                Ok(stored)
            }
        }
    }

    fn get(&self, deal_id: &str) -> Result<StoredDeal, StorageError> {
        self.deals.get(deal_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found(deal_id))
    }

    fn list_all(&self) -> Result<Vec<StoredDeal>, StorageError> {
        let mut deals: Vec<StoredDeal> = self.deals.iter().map(|entry| entry.value().clone()).collect();
        deals.sort_by_key(|deal| deal.id);

        Ok(deals)
    }
}
