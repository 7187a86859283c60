use analytics::{AnalyticsEngine, AnalyticsError, MonthlyGrid, ProfitFactor};
use core_types::{DateOrder, PortfolioInput, TradeFilter};
use ledger::{ColumnMap, parse_trades};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const LOG: &str = "\
Trade number,Strategy,Entry time,Exit time,Profit,
1,Opening Range,1/5/2024 9:30:00 AM,1/5/2024 10:00:00 AM,$500.00,
2,Opening Range,1/20/2024 9:30:00 AM,1/20/2024 11:30:00 AM,($200.00),
3,Opening Range,2/10/2024 9:30:00 AM,2/10/2024 9:45:00 AM,$100.00,
4,Opening Range,not a time,2/11/2024 9:45:00 AM,$75.00,
";

fn load() -> PortfolioInput {
    let parsed = parse_trades(
        LOG.as_bytes(),
        &ColumnMap::default(),
        DateOrder::MonthFirst,
        "opening_range",
    )
    .unwrap();
    assert_eq!(parsed.warnings.len(), 1);
    PortfolioInput::new("Opening Range (opening_range.csv)", parsed.trades, dec!(10000)).unwrap()
}

#[test]
fn parsed_log_produces_expected_metrics() {
    let input = load();
    let report = AnalyticsEngine::new()
        .calculate(&input.trades, input.capital)
        .unwrap();

    assert_eq!(report.series.cumulative_pnl, vec![dec!(500), dec!(300), dec!(400)]);
    assert_eq!(report.total_net_profit, dec!(400));
    assert_eq!(report.max_drawdown, dec!(-200));
    assert_eq!(report.win_rate, dec!(2) / dec!(3));
    assert_eq!(report.profit_factor, ProfitFactor::Finite(dec!(3)));

    let grid = MonthlyGrid::from_trades(&input.trades, input.capital).unwrap();
    let (dollar, _) = grid.row(2024).unwrap();
    assert_eq!(dollar.months[0], dec!(300));
    assert_eq!(dollar.months[1], dec!(100));
    assert_eq!(dollar.ytd, dec!(400));
}

#[test]
fn filter_that_removes_everything_yields_empty_analysis() {
    let input = load();
    let filter = TradeFilter::new(chrono::NaiveDate::from_ymd_opt(2025, 1, 1), None).unwrap();
    let analysis = AnalyticsEngine::new()
        .analyze_portfolios(&[input], &filter, false)
        .unwrap();

    assert_eq!(analysis.report.total_trades, 0);
    assert_eq!(analysis.report.profit_factor, ProfitFactor::Undefined);
    assert_eq!(analysis.report.win_rate, Decimal::ZERO);
    assert!(analysis.report.series.cumulative_pnl.is_empty());
    assert!(analysis.monthly.is_empty());
}

#[test]
fn zero_capital_is_rejected_before_any_metric() {
    let input = load();
    let engine = AnalyticsEngine::new();
    assert_eq!(
        engine.calculate(&input.trades, Decimal::ZERO),
        Err(AnalyticsError::InvalidCapital(Decimal::ZERO))
    );
    assert!(MonthlyGrid::from_trades(&input.trades, Decimal::ZERO).is_err());
}

#[test]
fn oversized_profits_surface_as_overflow() {
    let log = "\
Entry time,Exit time,Profit
1/5/2024 9:30:00 AM,1/5/2024 10:00:00 AM,\"$50,000,000,000,000,000,000,000,000,000\"
1/6/2024 9:30:00 AM,1/6/2024 10:00:00 AM,\"$50,000,000,000,000,000,000,000,000,000\"
";
    let parsed = parse_trades(log.as_bytes(), &ColumnMap::default(), DateOrder::MonthFirst, "big")
        .unwrap();
    assert!(parsed.warnings.is_empty());
    let input = PortfolioInput::new("big (big.csv)", parsed.trades, dec!(10000)).unwrap();

    let result = AnalyticsEngine::new().analyze_portfolios(&[input], &TradeFilter::default(), false);
    assert!(matches!(result, Err(AnalyticsError::Overflow(_))));
}
