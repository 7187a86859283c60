use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{DateOrder, TradeFilter};
use ledger::ColumnMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// Capital assigned to a run when the configuration does not name one.
pub const DEFAULT_CAPITAL: Decimal = dec!(100000);

/// The root configuration structure for an analysis run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Column names of the exported trade logs.
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub portfolios: Vec<PortfolioSettings>,
}

/// Parameters shared by every recomputation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisSettings {
    /// How ambiguous numeric dates such as `03/04/2024` are read.
    #[serde(default)]
    pub date_order: DateOrder,
    /// Only trades that exit on or after this date are analyzed.
    pub start_date: Option<NaiveDate>,
    /// Only trades that exit on or before this date are analyzed.
    pub end_date: Option<NaiveDate>,
    /// Also compute each run's own equity curve.
    #[serde(default)]
    pub individual_curves: bool,
}

impl AnalysisSettings {
    pub fn filter(&self) -> Result<TradeFilter, ConfigError> {
        TradeFilter::new(self.start_date, self.end_date)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// One exported backtest run and the capital assigned to it.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSettings {
    pub path: PathBuf,
    #[serde(default = "default_capital")]
    pub capital: Decimal,
    /// Disabled runs are neither loaded nor blended.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_capital() -> Decimal {
    DEFAULT_CAPITAL
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for portfolio in self.portfolios.iter().filter(|p| p.enabled) {
            if portfolio.capital <= Decimal::ZERO {
                return Err(ConfigError::ValidationError(format!(
                    "capital for {} must be positive, got {}",
                    portfolio.path.display(),
                    portfolio.capital
                )));
            }
        }
        self.analysis.filter()?;
        Ok(())
    }

    pub fn enabled_portfolios(&self) -> impl Iterator<Item = &PortfolioSettings> {
        self.portfolios.iter().filter(|p| p.enabled)
    }
}
