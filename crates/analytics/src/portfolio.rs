use crate::checked;
use crate::error::AnalyticsError;
use chrono::NaiveDateTime;
use core_types::{PortfolioInput, Trade, TradeFilter};
use rust_decimal::Decimal;
use serde::Serialize;
use std::borrow::Borrow;
use tracing::debug;

/// Several backtest runs merged into one blended ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedPortfolio {
    pub labels: Vec<String>,
    /// Union of all member trades inside the filter, by exit time ascending.
    pub trades: Vec<Trade>,
    /// Sum of member capitals.
    pub capital: Decimal,
}

/// A member run's own equity curve, measured against its own capital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualCurve {
    pub label: String,
    pub capital: Decimal,
    pub exit_times: Vec<NaiveDateTime>,
    pub cumulative_pnl: Vec<Decimal>,
    pub cumulative_pct: Vec<Decimal>,
}

/// Picks the runs named in `labels`, in the order given.
pub fn select<'a>(
    inputs: &'a [PortfolioInput],
    labels: &[String],
) -> Result<Vec<&'a PortfolioInput>, AnalyticsError> {
    if labels.is_empty() {
        return Err(AnalyticsError::EmptySelection);
    }
    labels
        .iter()
        .map(|label| {
            inputs
                .iter()
                .find(|p| &p.label == label)
                .ok_or_else(|| AnalyticsError::UnknownPortfolio(label.clone()))
        })
        .collect()
}

/// Merges the member runs: trades are filtered, concatenated and re-sorted by exit time;
/// capitals are summed.
pub fn combine<P: Borrow<PortfolioInput>>(
    members: &[P],
    filter: &TradeFilter,
) -> Result<CombinedPortfolio, AnalyticsError> {
    if members.is_empty() {
        return Err(AnalyticsError::EmptySelection);
    }

    let mut labels = Vec::with_capacity(members.len());
    let mut trades = Vec::new();
    let mut capital = Decimal::ZERO;
    for member in members {
        let member: &PortfolioInput = member.borrow();
        if member.capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidCapital(member.capital));
        }
        labels.push(member.label.clone());
        trades.extend(filter.apply(&member.trades).cloned());
        capital = checked::add(capital, member.capital, "combined capital")?;
    }
    trades.sort_by_key(|t| t.exit_time);

    debug!(
        members = labels.len(),
        trades = trades.len(),
        %capital,
        "Combined portfolio"
    );
    Ok(CombinedPortfolio {
        labels,
        trades,
        capital,
    })
}

/// Each member's cumulative P&L inside the filter. Members with no trades in range are left out.
pub fn individual_curves<P: Borrow<PortfolioInput>>(
    members: &[P],
    filter: &TradeFilter,
) -> Result<Vec<IndividualCurve>, AnalyticsError> {
    let mut curves = Vec::with_capacity(members.len());
    for member in members {
        let member: &PortfolioInput = member.borrow();
        let mut trades: Vec<&Trade> = filter.apply(&member.trades).collect();
        if trades.is_empty() || member.capital <= Decimal::ZERO {
            continue;
        }
        trades.sort_by_key(|t| t.exit_time);

        let mut running = Decimal::ZERO;
        let mut cumulative_pnl = Vec::with_capacity(trades.len());
        let mut cumulative_pct = Vec::with_capacity(trades.len());
        for trade in &trades {
            running = checked::add(running, trade.profit, "cumulative P&L")?;
            cumulative_pnl.push(running);
            cumulative_pct.push(checked::pct(running, member.capital, "cumulative return")?);
        }

        curves.push(IndividualCurve {
            label: member.label.clone(),
            capital: member.capital,
            exit_times: trades.iter().map(|t| t.exit_time).collect(),
            cumulative_pnl,
            cumulative_pct,
        });
    }
    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn trade(day: u32, profit: Decimal) -> Trade {
        let exit = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Trade {
            entry_time: exit,
            exit_time: exit,
            profit,
            strategy: "Test".to_string(),
            source_row: day as usize,
        }
    }

    fn inputs() -> Vec<PortfolioInput> {
        vec![
            PortfolioInput::new(
                "A (a.csv)",
                vec![trade(1, dec!(100)), trade(10, dec!(-40))],
                dec!(10000),
            )
            .unwrap(),
            PortfolioInput::new(
                "B (b.csv)",
                vec![trade(5, dec!(20)), trade(20, dec!(60))],
                dec!(5000),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_combine_sorts_union_and_sums_capital() {
        let combined = combine(&inputs(), &TradeFilter::default()).unwrap();
        let days: Vec<usize> = combined.trades.iter().map(|t| t.source_row).collect();
        assert_eq!(days, vec![1, 5, 10, 20]);
        assert_eq!(combined.capital, dec!(15000));
        assert_eq!(combined.labels, vec!["A (a.csv)", "B (b.csv)"]);
    }

    #[test]
    fn test_combine_applies_filter() {
        let filter = TradeFilter::new(NaiveDate::from_ymd_opt(2024, 3, 6), None).unwrap();
        let combined = combine(&inputs(), &filter).unwrap();
        assert_eq!(combined.trades.len(), 2);
        // Capital is not reduced by filtering.
        assert_eq!(combined.capital, dec!(15000));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let none: [PortfolioInput; 0] = [];
        assert_eq!(
            combine(&none, &TradeFilter::default()),
            Err(AnalyticsError::EmptySelection)
        );
        assert_eq!(select(&inputs(), &[]), Err(AnalyticsError::EmptySelection));
    }

    #[test]
    fn test_select_by_label() {
        let all = inputs();
        let picked = select(&all, &["B (b.csv)".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].capital, dec!(5000));
        assert_eq!(
            select(&all, &["C".to_string()]),
            Err(AnalyticsError::UnknownPortfolio("C".to_string()))
        );

        let combined = combine(&picked, &TradeFilter::default()).unwrap();
        assert_eq!(combined.capital, dec!(5000));
    }

    #[test]
    fn test_individual_curves_use_own_capital() {
        let curves = individual_curves(&inputs(), &TradeFilter::default()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].cumulative_pnl, vec![dec!(100), dec!(60)]);
        assert_eq!(curves[0].cumulative_pct, vec![dec!(1), dec!(0.6)]);
        assert_eq!(curves[1].cumulative_pnl, vec![dec!(20), dec!(80)]);
        assert_eq!(curves[1].cumulative_pct, vec![dec!(0.4), dec!(1.6)]);
    }

    #[test]
    fn test_individual_curves_skip_members_outside_filter() {
        let filter = TradeFilter::new(NaiveDate::from_ymd_opt(2024, 3, 15), None).unwrap();
        let curves = individual_curves(&inputs(), &filter).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].label, "B (b.csv)");
    }

    #[test]
    fn test_oversized_amounts_are_errors_not_panics() {
        let big = dec!(50000000000000000000000000000);
        let rich = vec![
            PortfolioInput::new("A (a.csv)", vec![trade(1, dec!(1))], big).unwrap(),
            PortfolioInput::new("B (b.csv)", vec![trade(2, dec!(1))], big).unwrap(),
        ];
        assert_eq!(
            combine(&rich, &TradeFilter::default()),
            Err(AnalyticsError::Overflow("combined capital"))
        );

        let tiny = vec![
            PortfolioInput::new(
                "C (c.csv)",
                vec![trade(3, dec!(10000000000000000000000000))],
                dec!(0.001),
            )
            .unwrap(),
        ];
        assert_eq!(
            individual_curves(&tiny, &TradeFilter::default()),
            Err(AnalyticsError::Overflow("cumulative return"))
        );
    }
}
