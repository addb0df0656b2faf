//! Position sizing strategies.
//!
//! Five pluggable strategies share the [`PositionSizer`] capability:
//! - `FIXED`: constant share count
//! - `PERCENTAGE`: fixed fraction of equity
//! - `ATR`: volatility-normalized risk from average true range
//! - `KELLY`: fractional Kelly criterion from win rate and payoff ratio
//! - `RISK_PARITY`: volatility targeting against realized volatility
//!
//! All strategies floor-truncate to whole shares and size zero when equity
//! or price is not positive.
//!
//! # Example
//!
//! ```rust,ignore
//! use analytics_engine::risk::sizing::{PercentageSizer, PositionSizer, SizingContext};
//! use rust_decimal_macros::dec;
//!
//! let sizer = PercentageSizer::new(dec!(0.10));
//! let shares =
//!     sizer.calculate_position_size(dec!(100000), dec!(50), &SizingContext::default());
//! assert_eq!(shares, 200); // 10% of 100k = 10000 / 50 = 200 shares
//! ```

mod atr;
mod fixed;
mod kelly;
mod percentage;
mod risk_parity;
mod types;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub use atr::AtrSizer;
pub use fixed::FixedSizer;
pub use kelly::KellySizer;
pub use percentage::PercentageSizer;
pub use risk_parity::RiskParitySizer;
pub use types::{Candle, SizerKind, SizingContext};

/// Shared capability of all sizing strategies.
pub trait PositionSizer {
    /// Number of whole shares to open at `price` with `equity` available.
    fn calculate_position_size(
        &self,
        equity: Decimal,
        price: Decimal,
        context: &SizingContext<'_>,
    ) -> u64;

    /// Strategy name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Build a boxed sizer of the given kind with its default configuration.
#[must_use]
pub fn create_sizer(kind: SizerKind) -> Box<dyn PositionSizer> {
    match kind {
        SizerKind::Fixed => Box::new(FixedSizer::default()),
        SizerKind::Percentage => Box::new(PercentageSizer::default()),
        SizerKind::Atr => Box::new(AtrSizer::default()),
        SizerKind::Kelly => Box::new(KellySizer::default()),
        SizerKind::RiskParity => Box::new(RiskParitySizer::default()),
    }
}

/// Whole shares purchasable with `dollars` at `price`, floor-truncated.
fn whole_shares(dollars: Decimal, price: Decimal) -> u64 {
    if price <= Decimal::ZERO {
        return 0;
    }
    (dollars / price).floor().to_u64().unwrap_or(0)
}
