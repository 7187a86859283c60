use crate::settings::{AnalysisSettings, Config, PortfolioSettings};
use chrono::NaiveDate;
use clap::Args;
use core_types::DateOrder;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// A trade-log CSV to analyze. Repeat for several runs; replaces the configured portfolios.
    #[arg(long = "file", value_name = "CSV")]
    pub files: Vec<PathBuf>,

    /// Starting capital for each `--file`, in the same order. Missing values use the default.
    #[arg(long = "capital", value_name = "AMOUNT")]
    pub capitals: Vec<Decimal>,

    /// Only include trades that exit on or after this date (format: YYYY-MM-DD).
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Only include trades that exit on or before this date (format: YYYY-MM-DD).
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Read ambiguous numeric dates as DD/MM/YYYY instead of MM/DD/YYYY.
    #[arg(long)]
    pub day_first: bool,

    /// Also compute each run's own equity curve.
    #[arg(long)]
    pub individual: bool,
}

impl Config {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&mut self, args: &OverrideArgs) {
        if !args.files.is_empty() {
            self.portfolios = args
                .files
                .iter()
                .enumerate()
                .map(|(i, path)| PortfolioSettings {
                    path: path.clone(),
                    capital: args
                        .capitals
                        .get(i)
                        .copied()
                        .unwrap_or(crate::settings::DEFAULT_CAPITAL),
                    enabled: true,
                })
                .collect();
        }

        let analysis: &mut AnalysisSettings = &mut self.analysis;
        if args.start_date.is_some() {
            analysis.start_date = args.start_date;
        }
        if args.end_date.is_some() {
            analysis.end_date = args.end_date;
        }
        if args.day_first {
            analysis.date_order = DateOrder::DayFirst;
        }
        analysis.individual_curves |= args.individual;
    }
}
