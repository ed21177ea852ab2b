use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::engine::config::ImporterConfig;
use crate::ingest::{CsvIngestor, IngestError, Upload};
use crate::models::{Candidate, DealRecord, ImportOutcome, ImportSummary, OutcomeStatus, StoredDeal, ValidDeal};
use crate::storage::{persist_unique, DealStore, ErrorSink, StorageError};
use crate::types::CurrencyTable;
use crate::validation::{DealValidator, ValidationError};

/// Drives every candidate of a batch through validation and persistence.
///
/// Records are processed one at a time in input order. Each one ends in exactly one
/// [`OutcomeStatus`]; a failing record is counted and recorded, never propagated, so
/// the caller always gets a complete [`ImportSummary`].
pub struct DealImporter<S: DealStore, E: ErrorSink> {
    store: Arc<S>,
    errors: Arc<E>,
    currencies: Arc<CurrencyTable>,
    validator: DealValidator,
    ingestor: CsvIngestor,
    config: ImporterConfig
}

impl<S: DealStore, E: ErrorSink> DealImporter<S, E> {
    pub fn new(store: Arc<S>, errors: Arc<E>) -> Self {
        let currencies = Arc::new(CurrencyTable::iso4217());
        let config = ImporterConfig::default();

        Self {
            store,
            errors,
            validator: config.apply(DealValidator::new(currencies.clone())),
            ingestor: CsvIngestor::new().with_accepted_content_types(config.accepted_content_types.clone()),
            currencies,
            config
        }
    }

    pub fn with_config(mut self, config: ImporterConfig) -> Self {
        self.validator = config.apply(DealValidator::new(self.currencies.clone()));
        self.ingestor = CsvIngestor::new().with_accepted_content_types(config.accepted_content_types.clone());
        self.config = config;
        self
    }

    pub fn with_currency_table(mut self, currencies: Arc<CurrencyTable>) -> Self {
        self.validator = self.config.apply(DealValidator::new(currencies.clone()));
        self.currencies = currencies;
        self
    }

    /// Single-record JSON import: a batch of one, which must carry an exchange rate.
    pub fn import_deal(&self, deal: DealRecord) -> ImportSummary {
        self.import_candidates(vec![Candidate::submitted(1, deal)])
    }

    /// JSON batch import, rows numbered by position.
    pub fn import_deals(&self, deals: Vec<DealRecord>) -> ImportSummary {
        let candidates = deals.into_iter()
            .enumerate()
            .map(|(index, deal)| Candidate::submitted(index as u64 + 1, deal))
            .collect();

        self.import_candidates(candidates)
    }

    /// Ingests a CSV upload and imports every candidate it yields. Only file-level
    /// problems surface as errors.
    pub fn upload_csv(&self, upload: &Upload) -> Result<ImportSummary, IngestError> {
        let candidates = self.ingestor.ingest(upload)?;

        Ok(self.import_candidates(candidates))
    }

    pub fn import_candidates(&self, candidates: Vec<Candidate>) -> ImportSummary {
        info!("Importing batch of {} deals", candidates.len());

        let mut summary = ImportSummary::new();

        for candidate in candidates {
            let outcome = self.process(candidate);
            summary.tally(&outcome, &self.config.internal_error_message);
        }

        debug_assert!(summary.is_consistent(), "summary counters out of balance: {summary:?}");

        info!(
            "Batch finished: total [{}] success [{}] failed [{}] duplicate [{}]",
            summary.total_records, summary.successful_imports, summary.failed_imports, summary.duplicate_imports
        );

        summary
    }

    pub fn get_deal(&self, deal_id: &str) -> Result<StoredDeal, StorageError> {
        self.store.get(deal_id)
    }

    pub fn list_deals(&self) -> Result<Vec<StoredDeal>, StorageError> {
        self.store.list_all()
    }

    fn process(&self, candidate: Candidate) -> ImportOutcome {
        let row_number = candidate.row_number;
        debug!("Starting import of row [{}]: {:?}", row_number, candidate.deal_id());

        let status = match self.validate(&candidate) {
            Err(error) => {
                warn!("Row [{}] failed validation: {error}", row_number);
                OutcomeStatus::ValidationFailure(error.to_string())
            }
            Ok(deal) => match persist_unique(self.store.as_ref(), deal) {
                Ok(stored) => {
                    debug!("Successfully imported FX deal [{}]", stored.deal_id());
                    OutcomeStatus::Success
                }
                Err(error) if error.is_duplicate() => OutcomeStatus::DuplicateFailure(error.to_string()),
                Err(error) => {
                    error!("Row [{}] failed to persist: {error}", row_number);
                    OutcomeStatus::UnknownFailure(error.to_string())
                }
            }
        };

        let deal_id = candidate.deal.deal_id;

        if let (Some(classification), Some(reason)) = (status.classification(), status.reason()) {
            self.errors.record(Some(row_number), deal_id.as_deref(), reason, classification);
        }

        ImportOutcome {
            row_number,
            deal_id,
            status
        }
    }

    fn validate(&self, candidate: &Candidate) -> Result<ValidDeal, ValidationError> {
        // A row that never parsed reports its own failure rather than the first rule its placeholder breaks.
        if let Some(parse_error) = &candidate.parse_error {
            return Err(ValidationError::Unparseable(parse_error.clone()));
        }

        self.validator.validate(&candidate.deal, candidate.requires_exchange_rate)
    }
}
