//! Session state, limit, and event types for risk tracking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configurable limits enforced by a risk session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum peak-to-trough drawdown before trading halts (fraction of peak).
    pub max_drawdown_pct: Decimal,
    /// Maximum single position notional as a fraction of current equity.
    pub max_position_size_pct: Decimal,
    /// Maximum aggregate dollar risk across open positions as a fraction of equity.
    pub max_portfolio_heat: Decimal,
    /// Maximum gross exposure as a multiple of current equity.
    pub max_leverage: Decimal,
    /// Optional trailing stop below the session peak (fraction; disabled when `None`).
    pub trailing_stop_pct: Option<Decimal>,
    /// Assumed risk fraction for positions carrying no stop loss.
    pub default_stop_heat: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_drawdown_pct: Decimal::new(25, 2),      // 0.25 (25%)
            max_position_size_pct: Decimal::new(25, 2), // 0.25 (25%)
            max_portfolio_heat: Decimal::new(10, 2),    // 0.10 (10%)
            max_leverage: Decimal::new(2, 0),           // 2x gross exposure
            trailing_stop_pct: None,
            default_stop_heat: Decimal::new(2, 2), // 0.02 (2%)
        }
    }
}

/// Lifecycle state of a risk session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No capital registered yet; monitoring calls are inert.
    Uninitialized,
    /// Session is live and accepting equity updates.
    Active,
    /// A halt limit tripped; sticky until the session is re-initialized.
    Halted,
}

/// Limit identifiers attached to risk events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskEventCode {
    /// Drawdown from the session peak reached the configured maximum.
    MaxDrawdownHalt,
    /// Equity fell to or below the trailing stop level under the peak.
    TrailingStopHalt,
    /// A proposed position exceeded the single-position size limit.
    PositionSizeLimit,
    /// A proposed position would push aggregate heat past the limit.
    PortfolioHeatLimit,
    /// A proposed position would push gross exposure past the leverage limit.
    LeverageLimit,
}

/// A recorded limit breach, appended to the session's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Which limit tripped.
    pub code: RiskEventCode,
    /// Human-readable description.
    pub message: String,
    /// Observed value that tripped the limit.
    pub observed: Decimal,
    /// The configured limit it was compared against.
    pub limit: Decimal,
    /// Session equity at the time of the event.
    pub equity: Decimal,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

impl RiskEvent {
    /// Create a new event with a fresh id.
    #[must_use]
    pub fn new(
        code: RiskEventCode,
        message: String,
        observed: Decimal,
        limit: Decimal,
        equity: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            message,
            observed,
            limit,
            equity,
            timestamp,
        }
    }
}

/// An open position tracked by the session.
///
/// Identity is caller-supplied; the session stores positions keyed by id and
/// overwrites on collision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Position notional in dollars.
    pub size: Decimal,
    /// Entry price.
    pub entry_price: Decimal,
    /// Stop loss level, if one is set.
    pub stop_loss: Option<Decimal>,
    /// When the position was opened.
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Create a new position without a stop loss.
    #[must_use]
    pub fn new(size: Decimal, entry_price: Decimal, opened_at: DateTime<Utc>) -> Self {
        Self {
            size,
            entry_price,
            stop_loss: None,
            opened_at,
        }
    }

    /// Attach a stop loss level.
    #[must_use]
    pub const fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Dollar risk carried by this position.
    ///
    /// With a stop set this is the stop distance as a fraction of entry price
    /// times the position size; without one, `size * default_stop_heat`.
    #[must_use]
    pub fn heat(&self, default_stop_heat: Decimal) -> Decimal {
        match self.stop_loss {
            Some(stop) if self.entry_price > Decimal::ZERO => {
                (self.entry_price - stop).abs() / self.entry_price * self.size
            }
            _ => self.size * default_stop_heat,
        }
    }
}

/// One recorded equity observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquitySample {
    /// Observation time, when the caller supplied one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Equity value.
    pub equity: Decimal,
}

/// Read-only snapshot of session state for the reporting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStatistics {
    /// Latest equity value.
    pub current_equity: Decimal,
    /// Running session peak.
    pub peak_equity: Decimal,
    /// Current drawdown from the peak (fraction).
    pub current_drawdown: Decimal,
    /// Deepest drawdown observed this session (fraction).
    pub max_drawdown_reached: Decimal,
    /// Whether trading is halted.
    pub trading_halted: bool,
    /// Which halt tripped, when halted.
    pub halt_reason: Option<RiskEventCode>,
    /// Number of open positions.
    pub open_position_count: usize,
    /// Aggregate dollar risk as a fraction of current equity.
    pub portfolio_heat: Decimal,
    /// All limit breaches recorded this session.
    pub risk_events: Vec<RiskEvent>,
}
