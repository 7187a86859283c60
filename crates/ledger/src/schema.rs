use crate::error::LedgerError;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Maps the logical trade fields onto the column names of an exported log.
///
/// The defaults match the trade-list export of the source platform exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub profit: String,
    pub exit_time: String,
    pub entry_time: String,
    /// Optional free-text label column. When absent the file name is used.
    pub strategy: Option<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            profit: "Profit".to_string(),
            exit_time: "Exit time".to_string(),
            entry_time: "Entry time".to_string(),
            strategy: Some("Strategy".to_string()),
        }
    }
}

/// Column positions validated once against a file's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub profit: usize,
    pub exit_time: usize,
    pub entry_time: usize,
    pub strategy: Option<usize>,
}

impl ColumnMap {
    /// Resolves the mapping against a header row, failing fast on any missing required column.
    ///
    /// Headers are trimmed. Blank headers and `Unnamed…` placeholders (left by a trailing
    /// delimiter in the export) are never matched.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ResolvedSchema, LedgerError> {
        let named: Vec<(usize, &str)> = headers
            .iter()
            .map(str::trim)
            .enumerate()
            .filter(|(_, h)| !is_placeholder(h))
            .collect();

        let find = |column: &str| {
            named
                .iter()
                .find(|(_, h)| *h == column.trim())
                .map(|(i, _)| *i)
        };
        let require = |field: &'static str, column: &str| {
            find(column).ok_or_else(|| LedgerError::MissingColumn {
                field,
                column: column.to_string(),
                available: named.iter().map(|(_, h)| h.to_string()).collect(),
            })
        };

        Ok(ResolvedSchema {
            profit: require("profit", &self.profit)?,
            exit_time: require("exit time", &self.exit_time)?,
            entry_time: require("entry time", &self.entry_time)?,
            strategy: self.strategy.as_deref().and_then(|c| find(c)),
        })
    }
}

fn is_placeholder(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_default_export_header() {
        let headers = StringRecord::from(vec![
            "Trade number",
            "Instrument",
            "Strategy",
            " Entry time",
            "Exit time ",
            "Profit",
            "",
        ]);
        let schema = ColumnMap::default().resolve(&headers).unwrap();
        assert_eq!(schema.entry_time, 3);
        assert_eq!(schema.exit_time, 4);
        assert_eq!(schema.profit, 5);
        assert_eq!(schema.strategy, Some(2));
    }

    #[test]
    fn test_strategy_column_is_optional() {
        let headers = StringRecord::from(vec!["Entry time", "Exit time", "Profit"]);
        let schema = ColumnMap::default().resolve(&headers).unwrap();
        assert_eq!(schema.strategy, None);
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let headers = StringRecord::from(vec!["Entry time", "Profit", "Unnamed: 2"]);
        match ColumnMap::default().resolve(&headers) {
            Err(LedgerError::MissingColumn {
                field, available, ..
            }) => {
                assert_eq!(field, "exit time");
                assert_eq!(available, vec!["Entry time", "Profit"]);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_mapping() {
        let map = ColumnMap {
            profit: "PnL".to_string(),
            exit_time: "Closed".to_string(),
            entry_time: "Opened".to_string(),
            strategy: None,
        };
        let headers = StringRecord::from(vec!["Opened", "Closed", "PnL", "Strategy"]);
        let schema = map.resolve(&headers).unwrap();
        assert_eq!(schema.profit, 2);
        assert_eq!(schema.strategy, None);
    }
}
