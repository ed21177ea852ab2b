use crate::types::errors::ParseError;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Parses a deal amount as an exact decimal. Scale is preserved as written, so
/// `"1.50000"` keeps all five fractional digits for the validator to reject.
/// Exponent notation (`1E+3`, `1.5e-5`) is accepted as well.
pub fn parse_amount(value: &str) -> Result<Decimal, ParseError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ParseError::EmptyAmount);
    }

    Decimal::from_str_exact(value)
        .or_else(|error| if value.contains(['e', 'E']) { Decimal::from_scientific(value) } else { Err(error) })
        .map_err(|_| ParseError::InvalidAmount(value.to_string()))
}

/// Serde adapter reading a JSON amount from its exact text, whether it was sent as a
/// string or a number. Relies on serde_json's `arbitrary_precision` so numbers never
/// pass through `f64`.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => return Err(de::Error::custom(ParseError::InvalidAmount(other.to_string())))
    };

    parse_amount(&text).map(Some).map_err(de::Error::custom)
}
