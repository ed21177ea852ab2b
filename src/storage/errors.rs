use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Deal with ID '{deal_id}' already exists")]
    Duplicate {
        deal_id: String
    },
    #[error("Deal with ID '{deal_id}' was not found")]
    NotFound {
        deal_id: String
    },
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage CSV error: {0}")]
    Csv(#[from] csv::Error)
}

impl StorageError {
    pub fn duplicate(deal_id: &str) -> Self {
        Self::Duplicate { deal_id: deal_id.to_string() }
    }

    pub fn not_found(deal_id: &str) -> Self {
        Self::NotFound { deal_id: deal_id.to_string() }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}
