use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses an exported profit string such as `"$558.00"`, `"($119.00)"` or `"-1,204.50"`.
///
/// Returns `None` when nothing numeric remains after stripping currency formatting.
/// A parenthesis anywhere in the value marks it negative.
pub fn parse_currency(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let negative = trimmed.contains('(');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | '(' | ')' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -value } else { value })
}
