use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::ingest::RowError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CurrencyField {
    From,
    To
}

impl Display for CurrencyField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyField::From => formatter.write_str("From currency"),
            CurrencyField::To => formatter.write_str("To currency")
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Deal unique ID cannot be empty")]
    EmptyDealId,
    #[error("Deal unique ID exceeds maximum length of {max} characters")]
    DealIdTooLong {
        max: usize
    },
    #[error("{field} ISO code cannot be empty")]
    EmptyCurrency {
        field: CurrencyField
    },
    #[error("{field} must be a 3-letter uppercase ISO code")]
    MalformedCurrency {
        field: CurrencyField
    },
    #[error("{field} '{code}' is not a valid ISO 4217 currency code")]
    UnknownCurrency {
        field: CurrencyField,
        code: String
    },
    #[error("From currency and To currency must be different")]
    SameCurrency,
    #[error("Deal timestamp cannot be null")]
    MissingTimestamp,
    #[error("Deal timestamp cannot be more than {days} day(s) in the future")]
    FutureTimestamp {
        days: i64
    },
    #[error("Deal amount cannot be null")]
    MissingAmount,
    #[error("Deal amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Deal amount cannot have more than {max} decimal places")]
    TooManyDecimalPlaces {
        max: u32
    },
    #[error("Deal amount cannot have more than {max} integer digits")]
    TooManyIntegerDigits {
        max: usize
    },
    #[error("Exchange rate is required")]
    MissingExchangeRate,
    #[error("Exchange rate must be a positive number")]
    NonPositiveExchangeRate,
    #[error("{0}")]
    Unparseable(RowError)
}
