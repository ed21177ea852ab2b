use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{DealRecord, ValidDeal};
use crate::types::CurrencyTable;
use crate::validation::errors::{CurrencyField, ValidationError};

pub const MAX_DEAL_ID_LENGTH: usize = 255;
pub const MAX_DECIMAL_PLACES: u32 = 4;
pub const MAX_INTEGER_DIGITS: usize = 15;

/// Stateless rule engine for a single candidate deal.
///
/// Rules run in a fixed order and the first violation is returned:
/// deal id, source currency, target currency, currency pair, timestamp, amount,
/// exchange rate.
#[derive(Debug, Clone)]
pub struct DealValidator {
    currencies: Arc<CurrencyTable>,
    max_deal_id_length: usize,
    max_future_skew: Duration
}

impl DealValidator {
    pub fn new(currencies: Arc<CurrencyTable>) -> Self {
        Self {
            currencies,
            max_deal_id_length: MAX_DEAL_ID_LENGTH,
            max_future_skew: Duration::days(1)
        }
    }

    pub fn with_max_deal_id_length(mut self, max_deal_id_length: usize) -> Self {
        self.max_deal_id_length = max_deal_id_length;
        self
    }

    pub fn with_max_future_skew(mut self, max_future_skew: Duration) -> Self {
        self.max_future_skew = max_future_skew;
        self
    }

    /// Validates against the current local time.
    pub fn validate(&self, deal: &DealRecord, requires_exchange_rate: bool) -> Result<ValidDeal, ValidationError> {
        self.validate_at(deal, requires_exchange_rate, Local::now().naive_local())
    }

    pub fn validate_at(&self, deal: &DealRecord, requires_exchange_rate: bool, now: NaiveDateTime) -> Result<ValidDeal, ValidationError> {
        debug!("Validating FX deal: {:?}", deal.deal_id);

        let deal_id = self.check_deal_id(deal.deal_id.as_deref())?;
        let currency_from = self.check_currency(deal.currency_from.as_deref(), CurrencyField::From)?;
        let currency_to = self.check_currency(deal.currency_to.as_deref(), CurrencyField::To)?;

        if currency_from == currency_to {
            return Err(ValidationError::SameCurrency);
        }

        let timestamp = self.check_timestamp(deal.timestamp, now)?;
        let amount = check_amount(deal.amount)?;
        let exchange_rate = check_exchange_rate(deal.exchange_rate, requires_exchange_rate)?;

        Ok(ValidDeal {
            deal_id: deal_id.to_string(),
            currency_from: currency_from.to_string(),
            currency_to: currency_to.to_string(),
            timestamp,
            amount,
            exchange_rate
        })
    }

    fn check_deal_id<'a>(&self, deal_id: Option<&'a str>) -> Result<&'a str, ValidationError> {
        let Some(deal_id) = deal_id.filter(|id| !id.trim().is_empty()) else {
            return Err(ValidationError::EmptyDealId);
        };

        if deal_id.chars().count() > self.max_deal_id_length {
            return Err(ValidationError::DealIdTooLong { max: self.max_deal_id_length });
        }

        Ok(deal_id)
    }

    fn check_currency<'a>(&self, code: Option<&'a str>, field: CurrencyField) -> Result<&'a str, ValidationError> {
        let Some(code) = code.filter(|code| !code.trim().is_empty()) else {
            return Err(ValidationError::EmptyCurrency { field });
        };

        if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_uppercase()) {
            return Err(ValidationError::MalformedCurrency { field });
        }

        if !self.currencies.contains(code) {
            return Err(ValidationError::UnknownCurrency { field, code: code.to_string() });
        }

        Ok(code)
    }

    fn check_timestamp(&self, timestamp: Option<NaiveDateTime>, now: NaiveDateTime) -> Result<NaiveDateTime, ValidationError> {
        let timestamp = timestamp.ok_or(ValidationError::MissingTimestamp)?;

        if timestamp > now + self.max_future_skew {
            return Err(ValidationError::FutureTimestamp { days: self.max_future_skew.num_days() });
        }

        Ok(timestamp)
    }
}

fn check_amount(amount: Option<Decimal>) -> Result<Decimal, ValidationError> {
    let amount = amount.ok_or(ValidationError::MissingAmount)?;

    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }

    if amount.scale() > MAX_DECIMAL_PLACES {
        return Err(ValidationError::TooManyDecimalPlaces { max: MAX_DECIMAL_PLACES });
    }

    if amount.trunc().to_string().len() > MAX_INTEGER_DIGITS {
        return Err(ValidationError::TooManyIntegerDigits { max: MAX_INTEGER_DIGITS });
    }

    Ok(amount)
}

fn check_exchange_rate(rate: Option<f64>, required: bool) -> Result<Option<f64>, ValidationError> {
    match rate {
        Some(rate) if !rate.is_finite() || rate <= 0.0 => Err(ValidationError::NonPositiveExchangeRate),
        Some(rate) => Ok(Some(rate)),
        None if required => Err(ValidationError::MissingExchangeRate),
        None => Ok(None)
    }
}
