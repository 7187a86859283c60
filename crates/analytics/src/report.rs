use crate::checked;
use crate::error::AnalyticsError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Gross profit over gross loss, or `Undefined` when there were no losing trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProfitFactor {
    Finite(Decimal),
    Undefined,
}

impl ProfitFactor {
    pub fn from_gross(gross_profit: Decimal, gross_loss: Decimal) -> Result<Self, AnalyticsError> {
        if gross_loss.is_zero() {
            Ok(ProfitFactor::Undefined)
        } else {
            checked::div(gross_profit, gross_loss, "profit factor").map(ProfitFactor::Finite)
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            ProfitFactor::Finite(v) => Some(*v),
            ProfitFactor::Undefined => None,
        }
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{:.2}", v),
            ProfitFactor::Undefined => write!(f, "∞"),
        }
    }
}

/// Per-trade time series, aligned index by index with `exit_times`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    pub exit_times: Vec<NaiveDateTime>,
    /// Running sum of trade profit.
    pub cumulative_pnl: Vec<Decimal>,
    /// Cumulative P&L minus its running peak, never positive.
    pub drawdown: Vec<Decimal>,
    /// Equity decline from its running peak, in percent of that peak.
    pub drawdown_pct: Vec<Decimal>,
}

impl PerformanceSeries {
    pub fn is_empty(&self) -> bool {
        self.exit_times.is_empty()
    }
}

/// A comprehensive, standardized report of a trade set's performance.
///
/// This struct is the final output of the `AnalyticsEngine`. Every field has a defined
/// value for an empty trade set, so a filter that removes all trades still yields a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub starting_capital: Decimal,

    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: ProfitFactor,
    pub total_return_pct: Decimal,
    /// Compound annual growth rate as a fraction (0.12 is 12% a year).
    pub cagr: f64,

    // II. Risk and Drawdown
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
    /// Starting capital plus twice the worst dollar drawdown.
    pub suggested_min_capital: Decimal,

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winning trades over all trades, as a fraction.
    pub win_rate: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub payoff_ratio: Option<Decimal>, // None when there is no average loss to divide by

    // IV. Calendar Metrics
    pub months_profitable: usize,
    pub total_months: usize,
    pub win_months_ratio: Decimal,

    // V. Time-Based Metrics
    #[serde(with = "humantime_serde")]
    pub average_holding_period: Duration,

    pub series: PerformanceSeries,
}

impl PerformanceReport {
    /// Creates the report of an empty trade set.
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            starting_capital,
            total_net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: ProfitFactor::Undefined,
            total_return_pct: Decimal::ZERO,
            cagr: 0.0,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            suggested_min_capital: starting_capital,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            payoff_ratio: None,
            months_profitable: 0,
            total_months: 0,
            win_months_ratio: Decimal::ZERO,
            average_holding_period: Duration::ZERO,
            series: PerformanceSeries::default(),
        }
    }
}
