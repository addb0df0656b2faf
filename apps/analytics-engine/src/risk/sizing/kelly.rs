//! Fractional Kelly criterion sizing.

use rust_decimal::Decimal;

use super::types::SizingContext;
use super::{PositionSizer, whole_shares};

/// Sizes positions with a fractional Kelly bet derived from historical win
/// rate and payoff ratio.
///
/// The Kelly fraction `W - (1 - W) / R` is scaled by `fraction` (full Kelly
/// overbets badly on estimation error) and clamped into `[0, max_pct]`.
#[derive(Debug, Clone)]
pub struct KellySizer {
    win_rate: Decimal,
    payoff_ratio: Decimal,
    fraction: Decimal,
    max_pct: Decimal,
}

impl KellySizer {
    /// Create a sizer from a win rate (fraction in `[0, 1]`) and a payoff
    /// ratio (average win over average loss magnitude).
    #[must_use]
    pub const fn new(
        win_rate: Decimal,
        payoff_ratio: Decimal,
        fraction: Decimal,
        max_pct: Decimal,
    ) -> Self {
        Self {
            win_rate,
            payoff_ratio,
            fraction,
            max_pct,
        }
    }
}

impl Default for KellySizer {
    fn default() -> Self {
        Self {
            win_rate: Decimal::new(5, 1),     // 0.5
            payoff_ratio: Decimal::new(15, 1), // 1.5
            fraction: Decimal::new(5, 1),     // half-Kelly
            max_pct: Decimal::new(25, 2),     // 0.25 (25% notional cap)
        }
    }
}

impl PositionSizer for KellySizer {
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        _context: &SizingContext<'_>,
    ) -> u64 {
        if equity <= Decimal::ZERO || price <= Decimal::ZERO {
            return 0;
        }
        if self.payoff_ratio <= Decimal::ZERO {
            return 0;
        }

        let kelly = self.win_rate - (Decimal::ONE - self.win_rate) / self.payoff_ratio;
        let pct = (self.fraction * kelly).clamp(Decimal::ZERO, self.max_pct);
        whole_shares(equity * pct, price)
    }

    fn name(&self) -> &'static str {
        "KELLY"
    }
}
