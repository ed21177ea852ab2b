use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Timestamp is empty")]
    EmptyTimestamp,
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
    #[error("Amount is empty")]
    EmptyAmount,
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String)
}
