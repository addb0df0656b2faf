//! Volatility-normalized sizing from average true range.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::metrics::math;

use super::types::{Candle, SizingContext};
use super::{PositionSizer, whole_shares};

/// Fraction of equity allocated when there is not enough bar history.
const FALLBACK_PCT: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Sizes positions so that an adverse move of `multiplier` true ranges
/// costs `risk_pct` of equity, capped at `max_pct` of equity.
#[derive(Debug, Clone)]
pub struct AtrSizer {
    atr_period: usize,
    multiplier: Decimal,
    risk_pct: Decimal,
    max_pct: Decimal,
}

impl AtrSizer {
    /// Create a sizer averaging true range over `atr_period` bars.
    #[must_use]
    pub const fn new(
        atr_period: usize,
        multiplier: Decimal,
        risk_pct: Decimal,
        max_pct: Decimal,
    ) -> Self {
        Self {
            atr_period,
            multiplier,
            risk_pct,
            max_pct,
        }
    }
}

impl Default for AtrSizer {
    fn default() -> Self {
        Self {
            atr_period: 14,
            multiplier: Decimal::new(2, 0),  // 2 true ranges of room
            risk_pct: Decimal::new(2, 2),    // 0.02 (2% of equity at risk)
            max_pct: Decimal::new(25, 2),    // 0.25 (25% notional cap)
        }
    }
}

impl PositionSizer for AtrSizer {
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        context: &SizingContext<'_>,
    ) -> u64 {
        if equity <= Decimal::ZERO || price <= Decimal::ZERO {
            return 0;
        }

        let atr = average_true_range(context.bars, self.atr_period);
        let Some(atr) = atr.filter(|a| *a > Decimal::ZERO) else {
            // Not enough history or a flat market: size a flat 10% of equity
            return whole_shares(equity * FALLBACK_PCT, price);
        };

        let risk_shares = equity * self.risk_pct / (atr * self.multiplier);
        let cap_shares = equity * self.max_pct / price;
        risk_shares.min(cap_shares).floor().to_u64().unwrap_or(0)
    }

    fn name(&self) -> &'static str {
        "ATR"
    }
}

/// Mean true range over the last `period` bars.
///
/// True range is max(high - low, |high - prev close|, |low - prev close|);
/// the first bar's range seeds the series. Returns `None` when fewer than
/// `period` bars are available.
fn average_true_range(bars: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(bars.len());
    for (idx, bar) in bars.iter().enumerate() {
        let range = bar.high - bar.low;
        let tr = if idx == 0 {
            range
        } else {
            let prev_close = bars[idx - 1].close;
            range
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        };
        true_ranges.push(tr);
    }

    math::mean(&true_ranges[true_ranges.len() - period..])
}
