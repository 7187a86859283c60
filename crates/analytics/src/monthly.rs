use crate::checked;
use crate::error::AnalyticsError;
use chrono::Datelike;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MONTH_LABELS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Months since year zero, so consecutive calendar months differ by one.
pub(crate) fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

/// One year of the monthly returns grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub year: i32,
    /// January through December.
    pub months: [Decimal; 12],
    /// Sum of the twelve months.
    pub ytd: Decimal,
}

impl MonthlyRow {
    fn empty(year: i32) -> Self {
        Self {
            year,
            months: [Decimal::ZERO; 12],
            ytd: Decimal::ZERO,
        }
    }

    fn as_percent_of(&self, capital: Decimal) -> Result<Self, AnalyticsError> {
        let mut months = [Decimal::ZERO; 12];
        for (pct, dollar) in months.iter_mut().zip(&self.months) {
            *pct = checked::pct(*dollar, capital, "monthly return")?;
        }
        Ok(Self {
            year: self.year,
            months,
            ytd: checked::pct(self.ytd, capital, "YTD return")?,
        })
    }
}

/// Dense (year x month) grid of summed trade P&L.
///
/// Every observed year carries all twelve months, zero-filled where nothing closed.
/// Rows are ordered by year ascending; `dollar` and `percent` rows line up one to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyGrid {
    pub starting_capital: Decimal,
    pub dollar: Vec<MonthlyRow>,
    /// `dollar` divided by starting capital, times 100.
    pub percent: Vec<MonthlyRow>,
}

impl MonthlyGrid {
    /// Buckets `trades` by the year and month of their exit and sums the profit.
    pub fn from_trades(
        trades: &[Trade],
        starting_capital: Decimal,
    ) -> Result<Self, AnalyticsError> {
        if starting_capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidCapital(starting_capital));
        }

        let mut years: BTreeMap<i32, MonthlyRow> = BTreeMap::new();
        for trade in trades {
            let year = trade.exit_time.year();
            let month = trade.exit_time.month0() as usize;
            let cell = &mut years
                .entry(year)
                .or_insert_with(|| MonthlyRow::empty(year))
                .months[month];
            *cell = checked::add(*cell, trade.profit, "monthly P&L")?;
        }

        let dollar = years
            .into_values()
            .map(|mut row| -> Result<MonthlyRow, AnalyticsError> {
                row.ytd = checked::sum(&row.months, "YTD P&L")?;
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let percent = dollar
            .iter()
            .map(|row| row.as_percent_of(starting_capital))
            .collect::<Result<Vec<MonthlyRow>, AnalyticsError>>()?;

        Ok(Self {
            starting_capital,
            dollar,
            percent,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.dollar.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.dollar.iter().map(|r| r.year)
    }

    /// Dollar and percent rows for `year`.
    pub fn row(&self, year: i32) -> Option<(&MonthlyRow, &MonthlyRow)> {
        let idx = self.dollar.iter().position(|r| r.year == year)?;
        Some((&self.dollar[idx], &self.percent[idx]))
    }
}
