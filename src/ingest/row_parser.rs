use csv::StringRecord;

use crate::ingest::errors::RowError;
use crate::models::DealRecord;
use crate::types::{parse_amount, parse_timestamp, RowNumber};

/// `dealId, currencyFrom, currencyTo, timestamp, amount`. Extra cells are ignored.
pub const MIN_ROW_WIDTH: usize = 5;

/// Converts one raw CSV row into a candidate deal. The exchange rate is not part of
/// the CSV schema and is left unset.
pub fn parse_row(row: &StringRecord, row_number: RowNumber) -> Result<DealRecord, RowError> {
    if row.len() < MIN_ROW_WIDTH {
        return Err(RowError::Shape { expected: MIN_ROW_WIDTH, found: row.len() });
    }

    let cell = |index: usize| row.get(index).unwrap_or_default().trim();

    let timestamp = parse_timestamp(cell(3)).map_err(|error| RowError::field(row_number, error))?;
    let amount = parse_amount(cell(4)).map_err(|error| RowError::field(row_number, error))?;

    Ok(DealRecord {
        deal_id: Some(cell(0).to_string()),
        currency_from: Some(cell(1).to_uppercase()),
        currency_to: Some(cell(2).to_uppercase()),
        timestamp: Some(timestamp),
        amount: Some(amount),
        exchange_rate: None
    })
}
