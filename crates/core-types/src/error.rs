use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Starting capital must be positive, got {0}")]
    NonPositiveCapital(Decimal),
}
