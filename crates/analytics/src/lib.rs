//! # Backtest Analytics Engine
//!
//! This crate turns a ledger of closed trades into performance statistics: the equity and
//! drawdown curves, CAGR, win rate, profit factor and the monthly returns grid.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files or the
//!   command line. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `AnalyticsEngine` and `MonthlyGrid::from_trades` are pure
//!   functions of `(trades, starting capital)`. Every request is a full recompute.
//! - **Defined empty state:** An empty trade set is not an error; it produces zeroed metrics
//!   and empty series. Non-positive capital and empty selections are rejected up front.
//! - **No panics on parsed input:** all `Decimal` arithmetic is overflow-checked and
//!   reports `AnalyticsError::Overflow` instead.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the metrics calculation and the portfolio analysis entry point.
//! - `PerformanceReport`: scalar metrics plus the per-trade series.
//! - `MonthlyGrid`: the dense (year x month) returns grid with YTD.
//! - `portfolio`: combining runs and per-run equity curves.

// Declare the modules that constitute this crate.
mod checked;
pub mod engine;
pub mod error;
pub mod monthly;
pub mod portfolio;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, PortfolioAnalysis};
pub use error::AnalyticsError;
pub use monthly::{MONTH_LABELS, MonthlyGrid, MonthlyRow};
pub use portfolio::{CombinedPortfolio, IndividualCurve};
pub use report::{PerformanceReport, PerformanceSeries, ProfitFactor};
