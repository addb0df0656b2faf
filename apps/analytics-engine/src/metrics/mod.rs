//! Performance metrics for completed backtest runs.
//!
//! Implements the summary statistics the reporting layer consumes:
//! - Win rate, expectancy, and trade statistics
//! - Profit factor (gross profit / gross loss)
//! - Payoff ratio (average win / average loss)
//! - Calmar ratio (compound annualized return / max drawdown)
//! - Sortino ratio (downside risk-adjusted returns)
//! - Drawdown recovery periods on the equity curve
//!
//! Degenerate inputs (zero denominators, missing dates) resolve to null or
//! zero per metric; nothing in this module returns an error.

mod analyzer;
pub(crate) mod constants;
mod format;
pub(crate) mod math;
mod types;

pub use analyzer::PerformanceAnalyzer;
pub use format::{format_decimal, format_pct, format_ratio};
pub use types::{MetricsReport, RecoveryPeriod, TradeRecord, TradeSide};
