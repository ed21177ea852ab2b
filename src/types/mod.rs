mod amount;
mod currency;
mod errors;
mod timestamp;

pub use amount::{deserialize_optional_amount, parse_amount};
pub use currency::CurrencyTable;
pub use errors::ParseError;
pub use timestamp::{deserialize_optional_timestamp, parse_timestamp};

/// 1-based position of a data row in an upload, header excluded.
pub type RowNumber = u64;
