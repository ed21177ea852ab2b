use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ingest::RowError;
use crate::types::{deserialize_optional_amount, deserialize_optional_timestamp, RowNumber};

/// A deal as submitted, before validation.
///
/// Every field is optional: CSV rows never carry an exchange rate, and a row that
/// failed to parse is represented by a placeholder holding at most its `deal_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    pub deal_id: Option<String>,
    pub currency_from: Option<String>,
    pub currency_to: Option<String>,
    #[serde(default, alias = "dealTimestamp", deserialize_with = "deserialize_optional_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, alias = "dealAmount", deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<Decimal>,
    pub exchange_rate: Option<f64>
}

impl DealRecord {
    /// Degenerate record standing in for a row that could not be parsed.
    pub fn placeholder(deal_id: String) -> Self {
        Self {
            deal_id: Some(deal_id),
            ..Self::default()
        }
    }
}

/// A deal that passed every field rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidDeal {
    pub deal_id: String,
    pub currency_from: String,
    pub currency_to: String,
    pub timestamp: NaiveDateTime,
    pub amount: Decimal,
    pub exchange_rate: Option<f64>
}

/// A persisted deal. Created once per unique `deal_id` and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDeal {
    pub id: u64,
    #[serde(flatten)]
    pub deal: ValidDeal,
    pub created_at: NaiveDateTime
}

impl StoredDeal {
    pub fn deal_id(&self) -> &str {
        &self.deal.deal_id
    }
}

/// One entry of a batch: the record plus its provenance in the upload.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub row_number: RowNumber,
    pub deal: DealRecord,
    /// Set when the CSV row could not be parsed and `deal` is a placeholder.
    pub parse_error: Option<RowError>,
    /// The single-record JSON path requires an exchange rate; CSV rows do not carry one.
    pub requires_exchange_rate: bool
}

impl Candidate {
    pub fn parsed(row_number: RowNumber, deal: DealRecord) -> Self {
        Self {
            row_number,
            deal,
            parse_error: None,
            requires_exchange_rate: false
        }
    }

    pub fn unparseable(row_number: RowNumber, deal_id: String, error: RowError) -> Self {
        Self {
            row_number,
            deal: DealRecord::placeholder(deal_id),
            parse_error: Some(error),
            requires_exchange_rate: false
        }
    }

    pub fn submitted(row_number: RowNumber, deal: DealRecord) -> Self {
        Self {
            row_number,
            deal,
            parse_error: None,
            requires_exchange_rate: true
        }
    }

    pub fn deal_id(&self) -> Option<&str> {
        self.deal.deal_id.as_deref()
    }
}
