//! Constant share count sizing.

use rust_decimal::Decimal;

use super::PositionSizer;
use super::types::SizingContext;

/// Sizes every position at a constant share count.
#[derive(Debug, Clone)]
pub struct FixedSizer {
    shares: u64,
}

impl FixedSizer {
    /// Create a sizer that always opens `shares` shares.
    #[must_use]
    pub const fn new(shares: u64) -> Self {
        Self { shares }
    }
}

impl Default for FixedSizer {
    fn default() -> Self {
        Self { shares: 100 }
    }
}

impl PositionSizer for FixedSizer {
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        _context: &SizingContext<'_>,
    ) -> u64 {
        if equity <= Decimal::ZERO || price <= Decimal::ZERO {
            return 0;
        }
        self.shares
    }

    fn name(&self) -> &'static str {
        "FIXED"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_sizing_ignores_market_inputs() {
        let sizer = FixedSizer::new(50);
        let context = SizingContext::default();

        assert_eq!(sizer.calculate_position_size(dec!(100000), dec!(50), &context), 50);
        assert_eq!(sizer.calculate_position_size(dec!(1000), dec!(900), &context), 50);
    }

    #[test]
    fn test_fixed_sizing_zero_on_degenerate_inputs() {
        let sizer = FixedSizer::default();
        let context = SizingContext::default();

        assert_eq!(sizer.calculate_position_size(Decimal::ZERO, dec!(50), &context), 0);
        assert_eq!(sizer.calculate_position_size(dec!(100000), Decimal::ZERO, &context), 0);
        assert_eq!(sizer.calculate_position_size(dec!(-1000), dec!(50), &context), 0);
    }
}
