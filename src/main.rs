use analytics::{AnalyticsEngine, PortfolioAnalysis, portfolio};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use configuration::{Config, OverrideArgs, PortfolioSettings, load_config};
use core_types::PortfolioInput;
use ledger::{PortfolioLog, RowWarning, load_trade_log};
use serde::Serialize;
use std::path::PathBuf;

mod logging;
mod render;

/// The main entry point for the backtest analyzer.
fn main() -> anyhow::Result<()> {
    // Load ANALYZER__* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.log_dir.as_deref())?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Check(args) => handle_check(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance analytics for exported backtest trade logs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute equity, drawdown and monthly returns for one or more trade logs.
    Analyze(AnalyzeArgs),
    /// Load trade logs and report parse warnings without computing metrics.
    Check(CheckArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Configuration file (defaults to ./config.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    /// Only blend the runs with these labels, e.g. "ES Breakout (es.csv)". Defaults to all.
    #[arg(long = "strategy", value_name = "LABEL")]
    strategies: Vec<String>,

    /// Print the analysis as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct CheckArgs {
    /// Configuration file (defaults to ./config.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,
}

/// The JSON document produced by `analyze --json`.
#[derive(Serialize)]
struct AnalysisOutput<'a> {
    #[serde(flatten)]
    analysis: &'a PortfolioAnalysis,
    warnings: Vec<LabeledWarning<'a>>,
}

#[derive(Serialize)]
struct LabeledWarning<'a> {
    run: &'a str,
    #[serde(flatten)]
    warning: &'a RowWarning,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn resolve_config(path: Option<&PathBuf>, overrides: &OverrideArgs) -> anyhow::Result<Config> {
    let mut config = load_config(path.map(PathBuf::as_path)).context("Failed to load configuration")?;
    config.apply_overrides(overrides);
    config.validate()?;

    if config.enabled_portfolios().next().is_none() {
        bail!("No trade logs to analyze: pass --file or add [[portfolios]] to the configuration");
    }
    Ok(config)
}

/// Reads every enabled trade log.
fn load_logs(config: &Config) -> anyhow::Result<Vec<(&PortfolioSettings, PortfolioLog)>> {
    config
        .enabled_portfolios()
        .map(|settings| -> anyhow::Result<_> {
            let log = load_trade_log(&settings.path, &config.columns, config.analysis.date_order)
                .with_context(|| format!("Failed to load {}", settings.path.display()))?;
            Ok((settings, log))
        })
        .collect()
}

fn labeled_warnings(log: &PortfolioLog) -> impl Iterator<Item = (String, RowWarning)> + '_ {
    log.warnings.iter().cloned().map(move |w| (log.label.clone(), w))
}

/// Loads every enabled trade log and pairs it with its capital.
fn load_portfolios(
    config: &Config,
) -> anyhow::Result<(Vec<PortfolioInput>, Vec<(String, RowWarning)>)> {
    let mut inputs = Vec::new();
    let mut warnings = Vec::new();

    for (settings, log) in load_logs(config)? {
        warnings.extend(labeled_warnings(&log));
        let input = log
            .into_input(settings.capital)
            .with_context(|| format!("Invalid capital for {}", settings.path.display()))?;
        inputs.push(input);
    }
    Ok((inputs, warnings))
}

/// Handles the orchestration of a full analysis.
fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_ref(), &args.overrides)?;
    let (inputs, warnings) = load_portfolios(&config)?;

    let selected: Vec<&PortfolioInput> = if args.strategies.is_empty() {
        inputs.iter().collect()
    } else {
        portfolio::select(&inputs, &args.strategies)?
    };
    let filter = config.analysis.filter()?;

    let engine = AnalyticsEngine::new();
    let analysis =
        engine.analyze_portfolios(&selected, &filter, config.analysis.individual_curves)?;

    if analysis.report.total_trades == 0 {
        tracing::warn!(
            start = ?filter.start,
            end = ?filter.end,
            "No trades in the selected date range"
        );
    }
    tracing::info!(
        runs = analysis.labels.len(),
        trades = analysis.report.total_trades,
        capital = %analysis.report.starting_capital,
        "Analysis complete"
    );

    if args.json {
        let output = AnalysisOutput {
            analysis: &analysis,
            warnings: warnings
                .iter()
                .map(|(run, warning)| LabeledWarning { run, warning })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Runs: {}", analysis.labels.join(", "));
    println!("{}", render::metric_cards(&analysis.report));
    println!("\nMonthly Returns");
    println!("{}", render::monthly_table(&analysis.monthly));
    println!("{}", render::summary_table(&analysis.report));
    if !analysis.individual_curves.is_empty() {
        println!("\nIndividual Equity Curves");
        println!("{}", render::curves_table(&analysis.individual_curves));
    }
    if !warnings.is_empty() {
        println!("\nParse Warnings");
        println!("{}", render::warnings_table(&warnings));
    }
    println!("\nHYPOTHETICAL PERFORMANCE. Past performance is not indicative of future results.");

    Ok(())
}

/// Loads the configured logs and reports what was read.
fn handle_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_ref(), &args.overrides)?;
    let logs = load_logs(&config)?;

    let mut warnings = Vec::new();
    for (settings, log) in &logs {
        println!("{}, capital {}", log, render::format_money(settings.capital));
        warnings.extend(labeled_warnings(log));
    }
    if warnings.is_empty() {
        println!("No parse warnings.");
    } else {
        println!("{}", render::warnings_table(&warnings));
    }
    Ok(())
}
