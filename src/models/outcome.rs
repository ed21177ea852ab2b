use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::ErrorClassification;
use crate::types::RowNumber;

/// Terminal state of one record's trip through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    ValidationFailure(String),
    DuplicateFailure(String),
    UnknownFailure(String)
}

impl OutcomeStatus {
    pub fn classification(&self) -> Option<ErrorClassification> {
        match self {
            OutcomeStatus::Success => None,
            OutcomeStatus::ValidationFailure(_) => Some(ErrorClassification::Validation),
            OutcomeStatus::DuplicateFailure(_) => Some(ErrorClassification::Duplicate),
            OutcomeStatus::UnknownFailure(_) => Some(ErrorClassification::Unknown)
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            OutcomeStatus::Success => None,
            OutcomeStatus::ValidationFailure(reason)
            | OutcomeStatus::DuplicateFailure(reason)
            | OutcomeStatus::UnknownFailure(reason) => Some(reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub row_number: RowNumber,
    pub deal_id: Option<String>,
    pub status: OutcomeStatus
}

/// Durable audit record for a rejected row. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    pub id: u64,
    pub row_number: Option<RowNumber>,
    pub deal_id: Option<String>,
    pub error_message: String,
    pub error_type: ErrorClassification,
    pub created_at: NaiveDateTime
}
