mod errors;
mod validator;

pub use errors::ValidationError;
pub use validator::{DealValidator, MAX_DEAL_ID_LENGTH};
