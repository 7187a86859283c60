use analytics::{IndividualCurve, MONTH_LABELS, MonthlyGrid, PerformanceReport};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use ledger::RowWarning;
use rust_decimal::Decimal;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn sign_color(value: Decimal) -> Option<Color> {
    if value > Decimal::ZERO {
        Some(Color::Green)
    } else if value < Decimal::ZERO {
        Some(Color::Red)
    } else {
        None
    }
}

fn colored(text: String, color: Option<Color>) -> Cell {
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    match color {
        Some(c) => cell.fg(c),
        None => cell,
    }
}

/// `$12,345`, rounded to whole currency units.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp(0);
    if rounded.is_zero() {
        return "$0".to_string();
    }
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// A percentage with `dp` decimals, e.g. `+3.0%`. Zero is never signed.
pub fn format_pct(value: Decimal, dp: u32, signed: bool) -> String {
    let rounded = value.round_dp(dp);
    if rounded.is_zero() {
        return format!("{:.*}%", dp as usize, Decimal::ZERO);
    }
    let sign = if signed && rounded > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.*}%", sign, dp as usize, rounded)
}

/// A fraction such as a win rate shown as a percentage.
pub fn format_fraction(value: Decimal, dp: u32) -> String {
    format_pct(value * Decimal::ONE_HUNDRED, dp, false)
}

/// The headline numbers, one column each.
pub fn metric_cards(report: &PerformanceReport) -> Table {
    let half = Decimal::new(5, 1);
    let cagr_color = if report.cagr >= 0.0 { Color::Green } else { Color::Red };
    let rate_color = |v: Decimal| if v >= half { Color::Green } else { Color::Red };

    let mut table = new_table();
    table.set_header(vec![
        "Annual Return (CAGR)",
        "Max Drawdown",
        "Num Trades",
        "Win Rate",
        "Win Months",
        "Profit Factor",
    ]);
    table.add_row(vec![
        Cell::new(format!("{:.1}%", report.cagr * 100.0)).fg(cagr_color),
        Cell::new(format!(
            "{} ({})",
            format_pct(report.max_drawdown_pct, 1, false),
            format_money(report.max_drawdown)
        ))
        .fg(Color::Red),
        Cell::new(report.total_trades),
        Cell::new(format_fraction(report.win_rate, 1)).fg(rate_color(report.win_rate)),
        Cell::new(format_fraction(report.win_months_ratio, 0))
            .fg(rate_color(report.win_months_ratio)),
        Cell::new(report.profit_factor.to_string()).fg(Color::Green),
    ]);
    table
}

/// Summary statistics as key/value rows.
pub fn summary_table(report: &PerformanceReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Summary Statistics", ""]);

    let rows: Vec<(&str, String)> = vec![
        ("Number of Trades", report.total_trades.to_string()),
        ("Initial Capital", format_money(report.starting_capital)),
        ("Suggested Min Capital", format_money(report.suggested_min_capital)),
        ("Win Rate", format_fraction(report.win_rate, 1)),
        ("Profitable Trades", report.winning_trades.to_string()),
        ("Losing Trades", report.losing_trades.to_string()),
        (
            "Months Profitable",
            format!("{} / {}", report.months_profitable, report.total_months),
        ),
        (
            "Total Net Profit",
            format!(
                "{} ({})",
                format_pct(report.total_return_pct, 1, true),
                format_money(report.total_net_profit)
            ),
        ),
        (
            "Max Drawdown",
            format!(
                "{} ({})",
                format_pct(report.max_drawdown_pct, 1, false),
                format_money(report.max_drawdown)
            ),
        ),
        ("Profit Factor", report.profit_factor.to_string()),
        ("Average Win", format_money(report.average_win)),
        ("Average Loss", format_money(report.average_loss)),
        (
            "Payoff Ratio",
            report
                .payoff_ratio
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        (
            "Avg Holding Period",
            humanize_secs(report.average_holding_period.as_secs()),
        ),
    ];
    for (key, value) in rows {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn humanize_secs(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let minutes = rem / 60;
    match (days, hours) {
        (0, 0) => format!("{}m", minutes),
        (0, _) => format!("{}h {}m", hours, minutes),
        _ => format!("{}d {}h", days, hours),
    }
}

/// Monthly returns in percent of starting capital, with the dollar amount beneath.
pub fn monthly_table(grid: &MonthlyGrid) -> Table {
    let mut table = new_table();
    let mut header = vec!["YEAR"];
    header.extend(MONTH_LABELS);
    header.push("YTD");
    table.set_header(header);

    for (dollar, percent) in grid.dollar.iter().zip(&grid.percent) {
        let mut cells = vec![Cell::new(dollar.year)];
        let values = dollar
            .months
            .iter()
            .chain(std::iter::once(&dollar.ytd))
            .zip(percent.months.iter().chain(std::iter::once(&percent.ytd)));
        for (dlr, pct) in values {
            cells.push(colored(
                format!("{}\n{}", format_pct(*pct, 1, true), format_money(*dlr)),
                sign_color(*pct),
            ));
        }
        table.add_row(cells);
    }
    table
}

/// Final value of each run's own equity curve.
pub fn curves_table(curves: &[IndividualCurve]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Strategy", "Capital", "Trades", "Last Exit", "Return", "Net Profit"]);
    for curve in curves {
        let pnl = curve.cumulative_pnl.last().copied().unwrap_or(Decimal::ZERO);
        let pct = curve.cumulative_pct.last().copied().unwrap_or(Decimal::ZERO);
        let last_exit = curve
            .exit_times
            .last()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&curve.label),
            Cell::new(format_money(curve.capital)).set_alignment(CellAlignment::Right),
            Cell::new(curve.exit_times.len()).set_alignment(CellAlignment::Right),
            Cell::new(last_exit),
            colored(format_pct(pct, 1, true), sign_color(pct)),
            colored(format_money(pnl), sign_color(pnl)),
        ]);
    }
    table
}

/// Row warnings grouped under the run they came from.
pub fn warnings_table(warnings: &[(String, RowWarning)]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Run", "Row", "Warning"]);
    for (label, warning) in warnings {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(warning.row()).set_alignment(CellAlignment::Right),
            Cell::new(warning.to_string()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use chrono::NaiveDate;
    use core_types::Trade;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(0)), "$0");
        assert_eq!(format_money(dec!(0.4)), "$0");
        assert_eq!(format_money(dec!(999.6)), "$1,000");
        assert_eq!(format_money(dec!(1234567.89)), "$1,234,568");
        assert_eq!(format_money(dec!(-200)), "-$200");
        assert_eq!(format_money(dec!(-12345)), "-$12,345");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(dec!(3), 1, true), "+3.0%");
        assert_eq!(format_pct(dec!(-1.904761), 1, true), "-1.9%");
        assert_eq!(format_pct(dec!(0.01), 1, true), "0.0%");
        assert_eq!(format_fraction(dec!(2) / dec!(3), 1), "66.7%");
    }

    #[test]
    fn test_humanize_secs() {
        assert_eq!(humanize_secs(45 * 60), "45m");
        assert_eq!(humanize_secs(3 * 3600 + 60), "3h 1m");
        assert_eq!(humanize_secs(2 * 86_400 + 5 * 3600), "2d 5h");
    }

    #[test]
    fn test_monthly_table_has_a_row_per_year() {
        let exit = |y, m| {
            NaiveDate::from_ymd_opt(y, m, 3)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        };
        let trades: Vec<Trade> = [(2023, 12, dec!(50)), (2024, 2, dec!(-20))]
            .into_iter()
            .map(|(y, m, p)| Trade {
                entry_time: exit(y, m),
                exit_time: exit(y, m),
                profit: p,
                strategy: "T".to_string(),
                source_row: 1,
            })
            .collect();
        let grid = MonthlyGrid::from_trades(&trades, dec!(1000)).unwrap();
        let table = monthly_table(&grid);

        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("YTD"));
        assert!(rendered.contains("+5.0%"));
        assert!(rendered.contains("-2.0%"));

        let report = AnalyticsEngine::new().calculate(&trades, dec!(1000)).unwrap();
        assert!(summary_table(&report).to_string().contains("Suggested Min Capital"));
        assert!(metric_cards(&report).to_string().contains("Profit Factor"));
    }
}
