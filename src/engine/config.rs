use chrono::Duration;

use crate::ingest::ACCEPTED_CONTENT_TYPES;
use crate::validation::DealValidator;

/// Tunables of the import pipeline. `Default` carries the production values.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub accepted_content_types: Vec<String>,
    pub max_future_skew: Duration,
    pub max_deal_id_length: usize,
    /// Shown to callers in place of the underlying message of an unknown failure.
    pub internal_error_message: String
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            accepted_content_types: ACCEPTED_CONTENT_TYPES.iter().map(|content_type| content_type.to_string()).collect(),
            max_future_skew: Duration::days(1),
            max_deal_id_length: crate::validation::MAX_DEAL_ID_LENGTH,
            internal_error_message: "internal error".to_string()
        }
    }
}

impl ImporterConfig {
    pub(crate) fn apply(&self, validator: DealValidator) -> DealValidator {
        validator
            .with_max_deal_id_length(self.max_deal_id_length)
            .with_max_future_skew(self.max_future_skew)
    }
}
