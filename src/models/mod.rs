mod deal;
mod outcome;
mod summary;

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

pub use deal::{Candidate, DealRecord, StoredDeal, ValidDeal};
pub use outcome::{ImportError, ImportOutcome, OutcomeStatus};
pub use summary::ImportSummary;

/// Classification attached to every non-success import outcome.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorClassification {
    Validation,
    Duplicate,
    Unknown
}

impl ErrorClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClassification::Validation => "VALIDATION",
            ErrorClassification::Duplicate => "DUPLICATE",
            ErrorClassification::Unknown => "UNKNOWN"
        }
    }
}

impl Display for ErrorClassification {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
