use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One closed position from an exported trade log.
///
/// Trades are created once when a log is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Realized profit or loss in account currency.
    pub profit: Decimal,
    /// The backtest run this trade belongs to.
    pub strategy: String,
    /// 1-based data row in the source file.
    pub source_row: usize,
}

impl Trade {
    /// Time spent in the position. Clock skew in the export never yields a negative value.
    pub fn holding_period(&self) -> TimeDelta {
        (self.exit_time - self.entry_time).max(TimeDelta::zero())
    }

    pub fn is_win(&self) -> bool {
        self.profit > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.profit < Decimal::ZERO
    }
}

/// A single backtest run together with the capital the user assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioInput {
    /// Display label, unique per loaded file, e.g. `"ES Breakout (es_breakout.csv)"`.
    pub label: String,
    /// Trades sorted by exit time ascending.
    pub trades: Vec<Trade>,
    pub capital: Decimal,
}

impl PortfolioInput {
    /// Creates a new input, rejecting non-positive capital and sorting the trades by exit time.
    pub fn new(
        label: impl Into<String>,
        mut trades: Vec<Trade>,
        capital: Decimal,
    ) -> Result<Self, CoreError> {
        if capital <= Decimal::ZERO {
            return Err(CoreError::NonPositiveCapital(capital));
        }
        trades.sort_by_key(|t| t.exit_time);
        Ok(Self {
            label: label.into(),
            trades,
            capital,
        })
    }
}

/// Inclusive exit-date window applied before any computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TradeFilter {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, CoreError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(CoreError::InvalidInput(
                    "date filter".to_string(),
                    format!("start {} is after end {}", s, e),
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        let exit_date = trade.exit_time.date();
        self.start.is_none_or(|s| exit_date >= s) && self.end.is_none_or(|e| exit_date <= e)
    }

    pub fn apply<'a>(&self, trades: &'a [Trade]) -> impl Iterator<Item = &'a Trade> {
        let filter = *self;
        trades.iter().filter(move |t| filter.matches(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn trade(exit: NaiveDateTime, profit: Decimal) -> Trade {
        Trade {
            entry_time: exit - TimeDelta::hours(2),
            exit_time: exit,
            profit,
            strategy: "Test".to_string(),
            source_row: 1,
        }
    }

    #[test]
    fn test_portfolio_input_rejects_non_positive_capital() {
        assert!(matches!(
            PortfolioInput::new("a", vec![], dec!(0)),
            Err(CoreError::NonPositiveCapital(_))
        ));
        assert!(PortfolioInput::new("a", vec![], dec!(-5)).is_err());
    }

    #[test]
    fn test_portfolio_input_sorts_by_exit_time() {
        let trades = vec![
            trade(at(2024, 2, 1, 10), dec!(1)),
            trade(at(2024, 1, 1, 10), dec!(2)),
        ];
        let input = PortfolioInput::new("a", trades, dec!(1000)).unwrap();
        assert_eq!(input.trades[0].profit, dec!(2));
        assert_eq!(input.trades[1].profit, dec!(1));
    }

    #[test]
    fn test_filter_is_inclusive_on_exit_date() {
        let filter = TradeFilter::new(
            NaiveDate::from_ymd_opt(2024, 1, 10),
            NaiveDate::from_ymd_opt(2024, 1, 20),
        )
        .unwrap();
        assert!(filter.matches(&trade(at(2024, 1, 10, 0), dec!(1))));
        assert!(filter.matches(&trade(at(2024, 1, 20, 23), dec!(1))));
        assert!(!filter.matches(&trade(at(2024, 1, 9, 23), dec!(1))));
        assert!(!filter.matches(&trade(at(2024, 1, 21, 0), dec!(1))));
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let result = TradeFilter::new(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_holding_period_never_negative() {
        let mut t = trade(at(2024, 1, 1, 10), dec!(1));
        assert_eq!(t.holding_period(), TimeDelta::hours(2));
        t.entry_time = at(2024, 1, 1, 12);
        assert_eq!(t.holding_period(), TimeDelta::zero());
    }
}
