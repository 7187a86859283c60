use serde::{Deserialize, Serialize};
use std::fmt;

/// How an all-numeric date such as `03/04/2024` is read.
///
/// The preferred order is only a tie-breaker: a date that is valid in just one
/// order (e.g. `25/03/2024`) is read in that order regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// US convention, `MM/DD/YYYY`.
    #[default]
    MonthFirst,
    /// `DD/MM/YYYY`.
    DayFirst,
}

impl DateOrder {
    /// Returns the other ordering.
    pub fn opposite(&self) -> Self {
        match self {
            DateOrder::MonthFirst => DateOrder::DayFirst,
            DateOrder::DayFirst => DateOrder::MonthFirst,
        }
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrder::MonthFirst => write!(f, "month_first"),
            DateOrder::DayFirst => write!(f, "day_first"),
        }
    }
}
