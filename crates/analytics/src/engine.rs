use crate::checked;
use crate::error::AnalyticsError;
use crate::monthly::{MonthlyGrid, month_index};
use crate::portfolio::{self, CombinedPortfolio, IndividualCurve};
use crate::report::{PerformanceReport, PerformanceSeries, ProfitFactor};
use chrono::Datelike;
use core_types::{PortfolioInput, Trade, TradeFilter};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::Serialize;
use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.25;

/// A stateless calculator for deriving performance metrics from a closed-trade ledger.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

/// Everything computed for one selection of backtest runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub labels: Vec<String>,
    pub report: PerformanceReport,
    pub monthly: MonthlyGrid,
    pub individual_curves: Vec<IndividualCurve>,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - Closed trades, expected in ascending exit-time order. Unordered input is
    ///   sorted before any running aggregate is taken.
    /// * `starting_capital` - The capital the equity curve starts from. Must be positive.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        trades: &[Trade],
        starting_capital: Decimal,
    ) -> Result<PerformanceReport, AnalyticsError> {
        if starting_capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidCapital(starting_capital));
        }

        let mut report = PerformanceReport::new(starting_capital);
        if trades.is_empty() {
            // No trades in range is a legitimate state; the zeroed report describes it.
            return Ok(report);
        }

        let trades: Cow<'_, [Trade]> = if trades.is_sorted_by_key(|t| t.exit_time) {
            Cow::Borrowed(trades)
        } else {
            let mut sorted = trades.to_vec();
            sorted.sort_by_key(|t| t.exit_time);
            Cow::Owned(sorted)
        };

        self.calculate_series(&trades, starting_capital, &mut report)?;
        self.calculate_profitability(&trades, starting_capital, &mut report)?;
        self.calculate_drawdown(&mut report)?;
        self.calculate_cagr(&trades, starting_capital, &mut report);
        self.calculate_monthly_win_ratio(&trades, &mut report)?;
        self.calculate_time_metrics(&trades, &mut report);

        debug!(
            trades = report.total_trades,
            total_net_profit = %report.total_net_profit,
            max_drawdown = %report.max_drawdown,
            "Calculated performance report"
        );
        Ok(report)
    }

    /// Combines the selected runs, then computes the blended report, the monthly grid and,
    /// optionally, each run's own equity curve.
    pub fn analyze_portfolios<P: Borrow<PortfolioInput>>(
        &self,
        members: &[P],
        filter: &TradeFilter,
        include_individual: bool,
    ) -> Result<PortfolioAnalysis, AnalyticsError> {
        let CombinedPortfolio {
            labels,
            trades,
            capital,
        } = portfolio::combine(members, filter)?;

        let report = self.calculate(&trades, capital)?;
        let monthly = MonthlyGrid::from_trades(&trades, capital)?;
        let individual_curves = if include_individual && members.len() > 1 {
            portfolio::individual_curves(members, filter)?
        } else {
            Vec::new()
        };

        Ok(PortfolioAnalysis {
            labels,
            report,
            monthly,
            individual_curves,
        })
    }

    /// Builds the cumulative P&L and dollar drawdown series.
    fn calculate_series(
        &self,
        trades: &[Trade],
        starting_capital: Decimal,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        let mut series = PerformanceSeries {
            exit_times: Vec::with_capacity(trades.len()),
            cumulative_pnl: Vec::with_capacity(trades.len()),
            drawdown: Vec::with_capacity(trades.len()),
            drawdown_pct: Vec::with_capacity(trades.len()),
        };

        let mut cumulative = Decimal::ZERO;
        let mut peak: Option<Decimal> = None;
        let mut peak_equity: Option<Decimal> = None;

        for trade in trades {
            cumulative = checked::add(cumulative, trade.profit, "cumulative P&L")?;
            let running_peak = peak.map_or(cumulative, |p| p.max(cumulative));
            peak = Some(running_peak);

            let equity = checked::add(starting_capital, cumulative, "equity")?;
            let running_peak_equity = peak_equity.map_or(equity, |p| p.max(equity));
            peak_equity = Some(running_peak_equity);

            series.exit_times.push(trade.exit_time);
            series.cumulative_pnl.push(cumulative);
            series
                .drawdown
                .push(checked::sub(cumulative, running_peak, "drawdown")?);
            series
                .drawdown_pct
                .push(drawdown_pct(equity, running_peak_equity)?);
        }

        report.series = series;
        Ok(())
    }

    /// Calculates all profitability-related metrics.
    fn calculate_profitability(
        &self,
        trades: &[Trade],
        starting_capital: Decimal,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        report.total_trades = trades.len();

        for trade in trades {
            report.total_net_profit =
                checked::add(report.total_net_profit, trade.profit, "net profit")?;
            if trade.is_win() {
                report.gross_profit = checked::add(report.gross_profit, trade.profit, "gross profit")?;
                report.winning_trades += 1;
            } else if trade.is_loss() {
                report.gross_loss =
                    checked::add(report.gross_loss, trade.profit.abs(), "gross loss")?;
                report.losing_trades += 1;
            }
        }

        report.profit_factor = ProfitFactor::from_gross(report.gross_profit, report.gross_loss)?;
        report.win_rate = Decimal::from(report.winning_trades) / Decimal::from(report.total_trades);
        report.total_return_pct =
            checked::pct(report.total_net_profit, starting_capital, "total return")?;

        if report.winning_trades > 0 {
            report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
        }
        if report.losing_trades > 0 {
            report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
            report.payoff_ratio = Some(checked::div(
                report.average_win,
                report.average_loss,
                "payoff ratio",
            )?);
        }
        Ok(())
    }

    /// Reduces the drawdown series to their minima.
    fn calculate_drawdown(&self, report: &mut PerformanceReport) -> Result<(), AnalyticsError> {
        let series = &report.series;
        report.max_drawdown = series
            .drawdown
            .iter()
            .copied()
            .min()
            .unwrap_or(Decimal::ZERO);
        report.max_drawdown_pct = series
            .drawdown_pct
            .iter()
            .copied()
            .min()
            .unwrap_or(Decimal::ZERO);
        let cushion = checked::mul(report.max_drawdown.abs(), Decimal::TWO, "suggested capital")?;
        report.suggested_min_capital =
            checked::add(report.starting_capital, cushion, "suggested capital")?;
        Ok(())
    }

    /// Annualizes the total return over the span between the first and last exit.
    ///
    /// The span is floored at one day so same-day and single-trade sets stay finite.
    fn calculate_cagr(
        &self,
        trades: &[Trade],
        starting_capital: Decimal,
        report: &mut PerformanceReport,
    ) {
        let (Some(first), Some(last)) = (trades.first(), trades.last()) else {
            return;
        };
        let days = (last.exit_time - first.exit_time).num_days();
        let years = (days as f64 / DAYS_PER_YEAR).max(1.0 / DAYS_PER_YEAR);

        // Float growth, so a final equity beyond Decimal's range still annualizes.
        let capital = starting_capital.to_f64().unwrap_or_default();
        let net = report.total_net_profit.to_f64().unwrap_or_default();
        let growth = (capital + net) / capital;
        report.cagr = if growth <= 0.0 {
            -1.0
        } else {
            growth.powf(1.0 / years) - 1.0
        };
    }

    /// Share of calendar months, first exit to last exit, that closed with a positive sum.
    fn calculate_monthly_win_ratio(
        &self,
        trades: &[Trade],
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        let mut buckets: BTreeMap<i32, Decimal> = BTreeMap::new();
        for trade in trades {
            let bucket = buckets
                .entry(month_index(trade.exit_time.year(), trade.exit_time.month()))
                .or_default();
            *bucket = checked::add(*bucket, trade.profit, "monthly P&L")?;
        }

        let (Some(first), Some(last)) = (
            buckets.keys().next().copied(),
            buckets.keys().next_back().copied(),
        ) else {
            return Ok(());
        };

        report.total_months = (last - first + 1) as usize;
        report.months_profitable = buckets.values().filter(|v| **v > Decimal::ZERO).count();
        report.win_months_ratio =
            Decimal::from(report.months_profitable) / Decimal::from(report.total_months);
        Ok(())
    }

    /// Calculates time-based metrics.
    fn calculate_time_metrics(&self, trades: &[Trade], report: &mut PerformanceReport) {
        if trades.is_empty() {
            return;
        }

        let total_secs: i64 = trades
            .iter()
            .map(|t| t.holding_period().num_seconds())
            .sum();
        let avg_secs = total_secs / trades.len() as i64;
        report.average_holding_period = Duration::from_secs(avg_secs.max(0) as u64);
    }
}

/// Percent decline of `equity` from `peak_equity`.
///
/// Zero while equity sits at its peak. Below a non-positive peak the ratio has no meaning
/// and the point counts as a total loss.
fn drawdown_pct(equity: Decimal, peak_equity: Decimal) -> Result<Decimal, AnalyticsError> {
    if equity >= peak_equity {
        return Ok(Decimal::ZERO);
    }
    if peak_equity <= Decimal::ZERO {
        return Ok(-Decimal::ONE_HUNDRED);
    }
    let decline = checked::sub(equity, peak_equity, "drawdown")?;
    checked::pct(decline, peak_equity, "drawdown percent")
}
