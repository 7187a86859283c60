use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Starting capital must be positive, got {0}")]
    InvalidCapital(Decimal),

    #[error("No portfolios selected: select at least one backtest run")]
    EmptySelection,

    #[error("Unknown portfolio '{0}'")]
    UnknownPortfolio(String),

    #[error("Amounts are too large to analyze: {0} overflowed")]
    Overflow(&'static str),
}
