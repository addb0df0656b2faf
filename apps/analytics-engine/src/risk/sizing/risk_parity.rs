//! Volatility-targeting sizing against realized volatility.

use rust_decimal::Decimal;

use crate::metrics::constants::TRADING_DAYS;
use crate::metrics::math;

use super::types::SizingContext;
use super::{PositionSizer, whole_shares};

/// Smallest fraction of equity a position may be sized at.
const MIN_PCT: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Scales the allocation so the position's expected volatility matches a
/// target: quiet markets get larger positions, turbulent ones smaller.
///
/// The allocation is `target_vol / realized_vol` clamped into
/// `[0.01, max_pct]`, with realized volatility taken as the annualized
/// standard deviation of the last `lookback` returns. With insufficient
/// history the target is used as the realized value, which resolves to the
/// `max_pct` allocation.
#[derive(Debug, Clone)]
pub struct RiskParitySizer {
    target_vol: Decimal,
    lookback: usize,
    max_pct: Decimal,
}

impl RiskParitySizer {
    /// Create a sizer targeting `target_vol` annualized volatility
    /// (fraction, e.g. `0.15`).
    #[must_use]
    pub const fn new(target_vol: Decimal, lookback: usize, max_pct: Decimal) -> Self {
        Self {
            target_vol,
            lookback,
            max_pct,
        }
    }
}

impl Default for RiskParitySizer {
    fn default() -> Self {
        Self {
            target_vol: Decimal::new(15, 2), // 0.15 (15% annualized)
            lookback: 20,
            max_pct: Decimal::new(25, 2), // 0.25 (25% notional cap)
        }
    }
}

impl PositionSizer for RiskParitySizer {
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        context: &SizingContext<'_>,
    ) -> u64 {
        if equity <= Decimal::ZERO || price <= Decimal::ZERO {
            return 0;
        }

        let realized = realized_volatility(context.returns, self.lookback);
        let ratio = match realized {
            Some(vol) if vol > Decimal::ZERO => self.target_vol / vol,
            _ => Decimal::ONE,
        };

        let pct = ratio.clamp(MIN_PCT, self.max_pct);
        whole_shares(equity * pct, price)
    }

    fn name(&self) -> &'static str {
        "RISK_PARITY"
    }
}

/// Annualized standard deviation of the last `lookback` returns.
///
/// Returns `None` with fewer than `lookback` observations.
fn realized_volatility(returns: &[Decimal], lookback: usize) -> Option<Decimal> {
    if lookback == 0 || returns.len() < lookback {
        return None;
    }

    let window = &returns[returns.len() - lookback..];
    let std = math::std_dev(window)?;
    Some(std * math::sqrt_decimal(TRADING_DAYS)?)
}
