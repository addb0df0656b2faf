//! Stateful risk session tracking drawdown, heat, and leverage.
//!
//! A [`RiskManager`] owns one monitoring session: the external backtest
//! engine feeds it equity updates bar by bar and asks permission before
//! opening positions. Limit breaches append to an event log; drawdown and
//! trailing stop breaches additionally halt the session until it is
//! re-initialized.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::sizing::{PositionSizer, SizingContext};
use super::types::{
    EquitySample, Position, RiskEvent, RiskEventCode, RiskLimits, RiskStatistics, SessionState,
};

/// Single-owner risk session.
///
/// All state is owned by the instance; concurrent use requires external
/// synchronization. Monitoring methods never fail on numeric input:
/// abnormal conditions surface as `false` returns plus an appended
/// [`RiskEvent`].
#[derive(Debug)]
pub struct RiskManager {
    limits: RiskLimits,
    state: SessionState,
    initial_capital: Decimal,
    current_equity: Decimal,
    peak_equity: Decimal,
    current_drawdown: Decimal,
    max_drawdown_reached: Decimal,
    halt_reason: Option<RiskEventCode>,
    open_positions: HashMap<String, Position>,
    equity_history: Vec<EquitySample>,
    risk_events: Vec<RiskEvent>,
}

impl RiskManager {
    /// Create a manager with the given limits. The session starts
    /// uninitialized; call [`initialize`](Self::initialize) before use.
    #[must_use]
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            state: SessionState::Uninitialized,
            initial_capital: Decimal::ZERO,
            current_equity: Decimal::ZERO,
            peak_equity: Decimal::ZERO,
            current_drawdown: Decimal::ZERO,
            max_drawdown_reached: Decimal::ZERO,
            halt_reason: None,
            open_positions: HashMap::new(),
            equity_history: Vec::new(),
            risk_events: Vec::new(),
        }
    }

    /// Create a manager with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RiskLimits::default())
    }

    /// Start a fresh session with the given capital.
    ///
    /// Clears all prior state, including a halt, and moves to ACTIVE.
    pub fn initialize(&mut self, capital: Decimal, timestamp: Option<DateTime<Utc>>) {
        self.state = SessionState::Active;
        self.initial_capital = capital;
        self.current_equity = capital;
        self.peak_equity = capital;
        self.current_drawdown = Decimal::ZERO;
        self.max_drawdown_reached = Decimal::ZERO;
        self.halt_reason = None;
        self.open_positions.clear();
        self.equity_history.clear();
        self.risk_events.clear();
        self.equity_history.push(EquitySample {
            timestamp,
            equity: capital,
        });

        tracing::info!(capital = %capital, "Risk session initialized");
    }

    /// Clear the session back to the uninitialized state.
    ///
    /// Together with [`initialize`](Self::initialize), this is the only path
    /// out of a halt.
    pub fn reset(&mut self) {
        self.state = SessionState::Uninitialized;
        self.initial_capital = Decimal::ZERO;
        self.current_equity = Decimal::ZERO;
        self.peak_equity = Decimal::ZERO;
        self.current_drawdown = Decimal::ZERO;
        self.max_drawdown_reached = Decimal::ZERO;
        self.halt_reason = None;
        self.open_positions.clear();
        self.equity_history.clear();
        self.risk_events.clear();

        tracing::info!("Risk session reset");
    }

    /// Record a new equity observation.
    ///
    /// Returns `true` while trading is allowed. Drawdown at or past
    /// `max_drawdown_pct`, or equity at or below the trailing stop level,
    /// halts the session and returns `false`; every later call also returns
    /// `false` (with drawdown reported against the frozen peak) until the
    /// session is re-initialized.
    pub fn update_equity(&mut self, equity: Decimal, timestamp: Option<DateTime<Utc>>) -> bool {
        match self.state {
            SessionState::Uninitialized => {
                tracing::debug!("Equity update ignored, session not initialized");
                false
            }
            SessionState::Halted => {
                self.current_equity = equity;
                self.current_drawdown = drawdown_from(self.peak_equity, equity);
                self.max_drawdown_reached = self.max_drawdown_reached.max(self.current_drawdown);
                false
            }
            SessionState::Active => {
                if equity > self.peak_equity {
                    self.peak_equity = equity;
                }
                self.current_equity = equity;
                self.current_drawdown = drawdown_from(self.peak_equity, equity);
                self.max_drawdown_reached = self.max_drawdown_reached.max(self.current_drawdown);

                if self.current_drawdown >= self.limits.max_drawdown_pct {
                    let message = format!(
                        "Drawdown {:.2}% reached max drawdown limit {:.2}%",
                        self.current_drawdown * Decimal::ONE_HUNDRED,
                        self.limits.max_drawdown_pct * Decimal::ONE_HUNDRED,
                    );
                    self.halt(
                        RiskEventCode::MaxDrawdownHalt,
                        message,
                        self.current_drawdown,
                        self.limits.max_drawdown_pct,
                        timestamp,
                    );
                    return false;
                }

                if let Some(trailing) = self.limits.trailing_stop_pct {
                    let stop_level = self.peak_equity * (Decimal::ONE - trailing);
                    if equity <= stop_level {
                        let message = format!(
                            "Equity {equity} at or below trailing stop level {stop_level} ({:.2}% under peak {})",
                            trailing * Decimal::ONE_HUNDRED,
                            self.peak_equity,
                        );
                        self.halt(
                            RiskEventCode::TrailingStopHalt,
                            message,
                            self.current_drawdown,
                            trailing,
                            timestamp,
                        );
                        return false;
                    }
                }

                self.equity_history.push(EquitySample { timestamp, equity });
                true
            }
        }
    }

    /// Check whether a new position of `size` dollars may be opened.
    ///
    /// Returns `false` without logging when the session is halted or has no
    /// positive equity. Otherwise the size, heat (only when `stop_loss_pct`
    /// is supplied), and leverage limits are checked in that order; the
    /// first breach appends a [`RiskEvent`] and rejects the position.
    pub fn can_open_position(&mut self, size: Decimal, stop_loss_pct: Option<Decimal>) -> bool {
        if self.state == SessionState::Halted {
            tracing::debug!(size = %size, "Position rejected, trading halted");
            return false;
        }
        if self.current_equity <= Decimal::ZERO {
            tracing::debug!(size = %size, "Position rejected, no positive equity");
            return false;
        }

        let size_fraction = size / self.current_equity;
        if size_fraction > self.limits.max_position_size_pct {
            let message = format!(
                "Position size {:.2}% of equity exceeds limit {:.2}%",
                size_fraction * Decimal::ONE_HUNDRED,
                self.limits.max_position_size_pct * Decimal::ONE_HUNDRED,
            );
            return self.reject(
                RiskEventCode::PositionSizeLimit,
                message,
                size_fraction,
                self.limits.max_position_size_pct,
            );
        }

        if let Some(stop_loss_pct) = stop_loss_pct {
            let projected_heat =
                (self.calculate_portfolio_heat() + size * stop_loss_pct) / self.current_equity;
            if projected_heat > self.limits.max_portfolio_heat {
                let message = format!(
                    "Projected portfolio heat {:.2}% exceeds limit {:.2}%",
                    projected_heat * Decimal::ONE_HUNDRED,
                    self.limits.max_portfolio_heat * Decimal::ONE_HUNDRED,
                );
                return self.reject(
                    RiskEventCode::PortfolioHeatLimit,
                    message,
                    projected_heat,
                    self.limits.max_portfolio_heat,
                );
            }
        }

        let gross_exposure: Decimal = self.open_positions.values().map(|p| p.size).sum();
        let projected_leverage = (gross_exposure + size) / self.current_equity;
        if projected_leverage > self.limits.max_leverage {
            let message = format!(
                "Projected gross exposure {projected_leverage:.2}x exceeds max leverage {:.2}x",
                self.limits.max_leverage,
            );
            return self.reject(
                RiskEventCode::LeverageLimit,
                message,
                projected_leverage,
                self.limits.max_leverage,
            );
        }

        true
    }

    /// Track an open position under a caller-supplied id.
    ///
    /// Ids are not checked for uniqueness; a duplicate id replaces the
    /// existing position.
    pub fn add_position(&mut self, id: impl Into<String>, position: Position) {
        let id = id.into();
        if let Some(previous) = self.open_positions.insert(id.clone(), position) {
            tracing::debug!(
                id = %id,
                previous_size = %previous.size,
                "Duplicate position id, previous entry replaced"
            );
        }
    }

    /// Stop tracking a position, returning it if it existed.
    pub fn remove_position(&mut self, id: &str) -> Option<Position> {
        self.open_positions.remove(id)
    }

    /// Aggregate dollar risk across open positions.
    ///
    /// Positions with a stop contribute their stop distance as a fraction of
    /// entry price times size; positions without one contribute
    /// `size * default_stop_heat`.
    #[must_use]
    pub fn calculate_portfolio_heat(&self) -> Decimal {
        self.open_positions
            .values()
            .map(|p| p.heat(self.limits.default_stop_heat))
            .sum()
    }

    /// Dollar position size that risks `risk_pct` of equity between entry
    /// and stop, capped at the single-position size limit.
    ///
    /// Returns zero when entry equals stop or equity is not positive.
    #[must_use]
    pub fn get_risk_adjusted_position_size(
        &self,
        entry_price: Decimal,
        stop_loss: Decimal,
        risk_pct: Decimal,
    ) -> Decimal {
        if self.current_equity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let stop_distance = (entry_price - stop_loss).abs();
        if stop_distance == Decimal::ZERO {
            return Decimal::ZERO;
        }

        let shares = self.current_equity * risk_pct / stop_distance;
        let position_size = shares * entry_price;
        position_size.min(self.current_equity * self.limits.max_position_size_pct)
    }

    /// Run a sizing strategy against current session equity, capping the
    /// resulting notional at the single-position size limit.
    #[must_use]
    pub fn position_size_with(
        &self,
        sizer: &dyn PositionSizer,
        price: Decimal,
        context: &SizingContext<'_>,
    ) -> u64 {
        let shares = sizer.calculate_position_size(self.current_equity, price, context);
        if shares == 0 {
            return 0;
        }

        let cap = self.current_equity * self.limits.max_position_size_pct;
        if Decimal::from(shares) * price > cap {
            return (cap / price).floor().to_u64().unwrap_or(0);
        }
        shares
    }

    /// Read-only snapshot of the session for the reporting layer.
    #[must_use]
    pub fn get_statistics(&self) -> RiskStatistics {
        let heat = self.calculate_portfolio_heat();
        let heat_fraction = if self.current_equity > Decimal::ZERO {
            heat / self.current_equity
        } else {
            Decimal::ZERO
        };

        RiskStatistics {
            current_equity: self.current_equity,
            peak_equity: self.peak_equity,
            current_drawdown: self.current_drawdown,
            max_drawdown_reached: self.max_drawdown_reached,
            trading_halted: self.state == SessionState::Halted,
            halt_reason: self.halt_reason,
            open_position_count: self.open_positions.len(),
            portfolio_heat: heat_fraction,
            risk_events: self.risk_events.clone(),
        }
    }

    /// Recorded equity observations, oldest first.
    #[must_use]
    pub fn get_equity_curve(&self) -> &[EquitySample] {
        &self.equity_history
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is halted.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.state, SessionState::Halted)
    }

    /// Limits this session enforces.
    #[must_use]
    pub const fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Capital the session was initialized with.
    #[must_use]
    pub const fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    fn halt(
        &mut self,
        code: RiskEventCode,
        message: String,
        observed: Decimal,
        limit: Decimal,
        timestamp: Option<DateTime<Utc>>,
    ) {
        tracing::warn!(
            code = ?code,
            observed = %observed,
            limit = %limit,
            equity = %self.current_equity,
            "Trading halted"
        );
        self.state = SessionState::Halted;
        self.halt_reason = Some(code);
        self.risk_events.push(RiskEvent::new(
            code,
            message,
            observed,
            limit,
            self.current_equity,
            timestamp.unwrap_or_else(Utc::now),
        ));
    }

    fn reject(
        &mut self,
        code: RiskEventCode,
        message: String,
        observed: Decimal,
        limit: Decimal,
    ) -> bool {
        tracing::debug!(code = ?code, observed = %observed, limit = %limit, "Position rejected");
        self.risk_events.push(RiskEvent::new(
            code,
            message,
            observed,
            limit,
            self.current_equity,
            Utc::now(),
        ));
        false
    }
}

/// Drawdown of `equity` below `peak` as a fraction of the peak, clamped at
/// zero. A non-positive peak reports zero.
fn drawdown_from(peak: Decimal, equity: Decimal) -> Decimal {
    if peak > Decimal::ZERO {
        ((peak - equity) / peak).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}
