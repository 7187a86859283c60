use crate::currency::parse_currency;
use crate::error::LedgerError;
use crate::schema::ColumnMap;
use crate::timestamp::parse_timestamp;
use core_types::{DateOrder, PortfolioInput, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A non-fatal problem found in a single row of a trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarning {
    /// The profit cell could not be read; the trade was kept with a profit of zero.
    UnparseableProfit { row: usize, value: String },
    /// An entry or exit time could not be read; the row was dropped.
    UnparseableTimestamp {
        row: usize,
        column: String,
        value: String,
    },
}

impl RowWarning {
    pub fn row(&self) -> usize {
        match self {
            RowWarning::UnparseableProfit { row, .. } => *row,
            RowWarning::UnparseableTimestamp { row, .. } => *row,
        }
    }

    /// Whether the row was excluded from the working set.
    pub fn is_row_dropped(&self) -> bool {
        matches!(self, RowWarning::UnparseableTimestamp { .. })
    }
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::UnparseableProfit { row, value } => {
                write!(f, "row {}: profit '{}' is not a number, using 0", row, value)
            }
            RowWarning::UnparseableTimestamp { row, column, value } => {
                write!(
                    f,
                    "row {}: '{}' value '{}' is not a timestamp, row skipped",
                    row, column, value
                )
            }
        }
    }
}

/// The outcome of parsing one trade table.
#[derive(Debug, Clone, Default)]
pub struct ParsedLedger {
    /// Trades sorted by exit time ascending.
    pub trades: Vec<Trade>,
    pub warnings: Vec<RowWarning>,
    /// First non-blank value of the strategy column, in file order.
    pub strategy: Option<String>,
}

/// Parses a CSV trade table into typed trades.
///
/// Malformed rows never abort the load: bad profit values become zero and rows with
/// unreadable timestamps are dropped, each with a [`RowWarning`]. Only a missing
/// required column or unreadable CSV fails the whole table.
pub fn parse_trades<R: Read>(
    reader: R,
    columns: &ColumnMap,
    order: DateOrder,
    source_name: &str,
) -> Result<ParsedLedger, LedgerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LedgerError::EmptyInput);
    }
    let schema = columns.resolve(&headers)?;
    debug!(?schema, source = source_name, "Resolved trade log columns");

    let mut parsed = ParsedLedger::default();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let exit_raw = cell(schema.exit_time);
        let entry_raw = cell(schema.entry_time);
        let exit_time = parse_timestamp(exit_raw, order);
        let entry_time = parse_timestamp(entry_raw, order);
        if exit_time.is_none() {
            parsed.warnings.push(RowWarning::UnparseableTimestamp {
                row,
                column: columns.exit_time.clone(),
                value: exit_raw.to_string(),
            });
        }
        if entry_time.is_none() {
            parsed.warnings.push(RowWarning::UnparseableTimestamp {
                row,
                column: columns.entry_time.clone(),
                value: entry_raw.to_string(),
            });
        }
        let (Some(exit_time), Some(entry_time)) = (exit_time, entry_time) else {
            continue;
        };

        let profit_raw = cell(schema.profit);
        let profit = if profit_raw.is_empty() {
            Decimal::ZERO
        } else {
            parse_currency(profit_raw).unwrap_or_else(|| {
                parsed.warnings.push(RowWarning::UnparseableProfit {
                    row,
                    value: profit_raw.to_string(),
                });
                Decimal::ZERO
            })
        };

        let strategy = schema
            .strategy
            .map(cell)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if parsed.strategy.is_none() {
            parsed.strategy = strategy.clone();
        }

        parsed.trades.push(Trade {
            entry_time,
            exit_time,
            profit,
            strategy: strategy.unwrap_or_else(|| source_name.to_string()),
            source_row: row,
        });
    }

    parsed.trades.sort_by_key(|t| t.exit_time);
    Ok(parsed)
}

/// A loaded trade-log file, before a starting capital is assigned.
#[derive(Debug, Clone)]
pub struct PortfolioLog {
    /// `"{strategy} ({file name})"`.
    pub label: String,
    pub source: PathBuf,
    pub trades: Vec<Trade>,
    pub warnings: Vec<RowWarning>,
}

impl fmt::Display for PortfolioLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.trades.first(), self.trades.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "{}: {} trades, {} to {}, read from {}",
                self.label,
                self.trades.len(),
                first.exit_time.date(),
                last.exit_time.date(),
                self.source.display()
            ),
            _ => write!(f, "{}: no trades, read from {}", self.label, self.source.display()),
        }
    }
}

impl PortfolioLog {
    /// Pairs the log with its starting capital.
    pub fn into_input(self, capital: Decimal) -> Result<PortfolioInput, LedgerError> {
        Ok(PortfolioInput::new(self.label, self.trades, capital)?)
    }
}

/// Reads a trade-log file from disk.
///
/// The run is named after its strategy column, or after the file stem when that column
/// is absent or blank.
pub fn load_trade_log(
    path: &Path,
    columns: &ColumnMap,
    order: DateOrder,
) -> Result<PortfolioLog, LedgerError> {
    let file = File::open(path).map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    let parsed = parse_trades(file, columns, order, &stem)?;
    let strategy = parsed.strategy.unwrap_or(stem);
    let label = format!("{} ({})", strategy, file_name);

    for warning in &parsed.warnings {
        debug!(file = %file_name, %warning, "Row warning");
    }
    let dropped = parsed.warnings.iter().filter(|w| w.is_row_dropped()).count();
    if !parsed.warnings.is_empty() {
        warn!(
            file = %file_name,
            warnings = parsed.warnings.len(),
            dropped_rows = dropped,
            "Trade log loaded with warnings"
        );
    }
    info!(file = %file_name, %label, trades = parsed.trades.len(), "Loaded trade log");

    Ok(PortfolioLog {
        label,
        source: path.to_path_buf(),
        trades: parsed.trades,
        warnings: parsed.warnings,
    })
}
