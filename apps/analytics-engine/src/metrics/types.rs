//! Core types for trade history analytics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::constants::{HUNDRED, SECONDS_PER_DAY};

/// Position side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Bought first, sold later.
    Long,
    /// Sold first, bought back later.
    Short,
}

/// A completed trade produced by the backtest runner.
///
/// Read-only input to the analytics: the runner owns creation, this crate
/// never mutates a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Entry timestamp.
    pub entry_date: DateTime<Utc>,
    /// Exit timestamp; later than `entry_date` when present.
    pub exit_date: Option<DateTime<Utc>>,
    /// Entry price.
    pub entry_price: Decimal,
    /// Exit price.
    pub exit_price: Decimal,
    /// Position size in shares (positive).
    pub size: Decimal,
    /// Realized profit and loss.
    pub pnl: Decimal,
    /// Realized return percentage, when the runner recorded one.
    pub pnl_pct: Option<Decimal>,
    /// Holding period in bars, expressed in days.
    pub bar_duration: Decimal,
    /// Position side (LONG/SHORT).
    pub side: TradeSide,
}

impl TradeRecord {
    /// Check if this trade was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Return percentage computed from pnl and entry value.
    ///
    /// `None` when the entry value (price x size) is zero.
    #[must_use]
    pub fn return_pct(&self) -> Option<Decimal> {
        let entry_value = (self.entry_price * self.size).abs();
        if entry_value == Decimal::ZERO {
            return None;
        }
        Some(self.pnl / entry_value * HUNDRED)
    }

    /// Holding period in fractional days between entry and exit.
    ///
    /// `None` when the exit date is missing.
    #[must_use]
    pub fn duration_days(&self) -> Option<Decimal> {
        let exit = self.exit_date?;
        let seconds = (exit - self.entry_date).num_seconds();
        Some(Decimal::from(seconds) / SECONDS_PER_DAY)
    }
}

/// A completed drawdown-and-recovery window on an equity curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPeriod {
    /// Index of the first curve point below the pre-drawdown peak.
    pub drawdown_start_idx: usize,
    /// Index of the first curve point above the pre-drawdown peak.
    pub recovery_idx: usize,
    /// Recovery length in curve samples (daily curves: days).
    pub recovery_days: u64,
    /// Deepest decline inside the window as a percent of the peak.
    pub drawdown_pct: Decimal,
}

/// Full metrics report with every analyzer output.
///
/// The serialized form is the flat metric-name to value-or-null map consumed
/// by the service layer; `Default` is the empty-trades sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Winning trades as a percent of all trades (0 to 100).
    pub win_rate: Decimal,
    /// Gross profit / gross loss; `None` when either side is zero.
    pub profit_factor: Option<Decimal>,
    /// Average win / |average loss|; `None` when either is zero.
    pub payoff_ratio: Option<Decimal>,
    /// Annualized return / |max drawdown|; `None` without a drawdown or a
    /// measurable trading period.
    pub calmar_ratio: Option<Decimal>,
    /// Mean excess period return / downside deviation; `None` without an
    /// equity curve or without negative returns.
    pub sortino_ratio: Option<Decimal>,
    /// Longest run of winning trades in order.
    pub max_consecutive_wins: u64,
    /// Longest run of losing trades in order.
    pub max_consecutive_losses: u64,
    /// Mean pnl over winning trades; 0 when there are none.
    pub avg_win: Decimal,
    /// Mean pnl over losing trades (negative); 0 when there are none.
    pub avg_loss: Decimal,
    /// Largest single winning pnl; 0 when there are no winners.
    pub largest_win: Decimal,
    /// Most negative single pnl; 0 when there are no losers.
    pub largest_loss: Decimal,
    /// Mean holding period in days; `None` when no trade has both dates.
    pub avg_trade_duration: Option<Decimal>,
    /// Completed drawdown-and-recovery windows of the equity curve.
    pub recovery_periods: Vec<RecoveryPeriod>,
    /// Expected pnl per trade from win rate and average win/loss.
    pub expectancy: Decimal,
}

impl Default for MetricsReport {
    fn default() -> Self {
        Self {
            win_rate: Decimal::ZERO,
            profit_factor: None,
            payoff_ratio: None,
            calmar_ratio: None,
            sortino_ratio: None,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            avg_trade_duration: None,
            recovery_periods: Vec::new(),
            expectancy: Decimal::ZERO,
        }
    }
}

impl MetricsReport {
    /// Serialize the report as the flat metric map consumed by the API layer.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
