//! Fixed fraction-of-equity sizing.

use rust_decimal::Decimal;

use super::types::SizingContext;
use super::{PositionSizer, whole_shares};

/// Allocates a fixed fraction of equity to every position.
#[derive(Debug, Clone)]
pub struct PercentageSizer {
    pct: Decimal,
}

impl PercentageSizer {
    /// Create a sizer allocating `pct` of equity (fraction, e.g. `0.10`).
    #[must_use]
    pub const fn new(pct: Decimal) -> Self {
        Self { pct }
    }
}

impl Default for PercentageSizer {
    fn default() -> Self {
        Self {
            pct: Decimal::new(10, 2), // 0.10 (10% of equity)
        }
    }
}

impl PositionSizer for PercentageSizer {
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        _context: &SizingContext<'_>,
    ) -> u64 {
        if equity <= Decimal::ZERO || price <= Decimal::ZERO {
            return 0;
        }
        whole_shares(equity * self.pct, price)
    }

    fn name(&self) -> &'static str {
        "PERCENTAGE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_sizing() {
        let sizer = PercentageSizer::new(dec!(0.10));
        let context = SizingContext::default();

        // 10% of 100k = 10000 / 50 = 200 shares
        assert_eq!(sizer.calculate_position_size(dec!(100000), dec!(50), &context), 200);
    }

    #[test]
    fn test_percentage_sizing_floors_fractional_shares() {
        let sizer = PercentageSizer::new(dec!(0.10));
        let context = SizingContext::default();

        // 10000 / 333 = 30.03 -> 30 shares
        assert_eq!(sizer.calculate_position_size(dec!(100000), dec!(333), &context), 30);
    }

    #[test]
    fn test_percentage_sizing_zero_on_degenerate_inputs() {
        let sizer = PercentageSizer::default();
        let context = SizingContext::default();

        assert_eq!(sizer.calculate_position_size(Decimal::ZERO, dec!(50), &context), 0);
        assert_eq!(sizer.calculate_position_size(dec!(100000), dec!(-1), &context), 0);
    }
}
