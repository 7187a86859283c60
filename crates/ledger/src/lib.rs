//! # Trade Log Parser
//!
//! Turns exported trade-list tables into typed [`core_types::Trade`] records.
//!
//! - **Explicit schema:** a [`ColumnMap`] names the columns holding each logical field and is
//!   validated once per file against the header row.
//! - **Tolerant rows:** currency cells use `$`, `,` and parentheses-for-negative formatting and
//!   degrade to zero with a warning when unreadable. Timestamps come in several layouts; a row
//!   whose timestamps cannot be read is dropped with a warning.
//! - **Explicit date order:** ambiguous numeric dates are read with a caller-supplied
//!   [`core_types::DateOrder`].

pub mod currency;
pub mod error;
pub mod loader;
pub mod schema;
pub mod timestamp;

pub use currency::parse_currency;
pub use error::LedgerError;
pub use loader::{load_trade_log, parse_trades, ParsedLedger, PortfolioLog, RowWarning};
pub use schema::{ColumnMap, ResolvedSchema};
pub use timestamp::parse_timestamp;
