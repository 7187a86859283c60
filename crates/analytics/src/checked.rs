//! Overflow-checked `Decimal` arithmetic.
//!
//! Parsed profits can sit anywhere in `Decimal`'s range, so sums and ratios of them are
//! computed with the `checked_*` operations and surface `AnalyticsError::Overflow`.

use crate::error::AnalyticsError;
use rust_decimal::Decimal;

pub(crate) fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_add(b).ok_or(AnalyticsError::Overflow(what))
}

pub(crate) fn sub(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_sub(b).ok_or(AnalyticsError::Overflow(what))
}

pub(crate) fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_mul(b).ok_or(AnalyticsError::Overflow(what))
}

pub(crate) fn div(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_div(b).ok_or(AnalyticsError::Overflow(what))
}

/// `value / base * 100`.
pub(crate) fn pct(value: Decimal, base: Decimal, what: &'static str) -> Result<Decimal, AnalyticsError> {
    mul(div(value, base, what)?, Decimal::ONE_HUNDRED, what)
}

pub(crate) fn sum<'a, I>(values: I, what: &'static str) -> Result<Decimal, AnalyticsError>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, *v, what))
}
