use serde::Serialize;

use crate::models::{ErrorClassification, ImportOutcome, OutcomeStatus};
use crate::types::RowNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorEntry {
    pub row_number: Option<RowNumber>,
    pub deal_id: Option<String>,
    pub error_message: String,
    pub error_type: ErrorClassification
}

/// Aggregated result of one import invocation.
///
/// Counters only move through [`ImportSummary::tally`], which keeps
/// `total_records == successful_imports + failed_imports + duplicate_imports`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_records: usize,
    pub successful_imports: usize,
    pub failed_imports: usize,
    pub duplicate_imports: usize,
    pub errors: Vec<ImportErrorEntry>
}

impl ImportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one outcome. `public_unknown_message` replaces the reason of unknown
    /// failures so internal details never reach the caller.
    pub fn tally(&mut self, outcome: &ImportOutcome, public_unknown_message: &str) {
        self.total_records += 1;

        let (message, error_type) = match &outcome.status {
            OutcomeStatus::Success => {
                self.successful_imports += 1;
                return;
            }
            OutcomeStatus::ValidationFailure(reason) => {
                self.failed_imports += 1;
                (reason.clone(), ErrorClassification::Validation)
            }
            OutcomeStatus::DuplicateFailure(reason) => {
                self.duplicate_imports += 1;
                (reason.clone(), ErrorClassification::Duplicate)
            }
            OutcomeStatus::UnknownFailure(_) => {
                self.failed_imports += 1;
                (public_unknown_message.to_string(), ErrorClassification::Unknown)
            }
        };

        self.errors.push(ImportErrorEntry {
            row_number: Some(outcome.row_number),
            deal_id: outcome.deal_id.clone(),
            error_message: message,
            error_type
        });
    }

    pub fn is_consistent(&self) -> bool {
        self.total_records == self.successful_imports + self.failed_imports + self.duplicate_imports
            && self.errors.len() == self.failed_imports + self.duplicate_imports
    }
}
