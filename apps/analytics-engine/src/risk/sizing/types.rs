//! Inputs shared by the sizing strategies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price bar consumed by volatility-aware sizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
}

/// Market history handed to sizers.
///
/// Strategies read only what they need; both slices may be empty, in which
/// case history-dependent sizers apply their documented fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizingContext<'a> {
    /// Recent price bars, oldest first.
    pub bars: &'a [Candle],
    /// Recent period returns as fractions, oldest first.
    pub returns: &'a [Decimal],
}

/// Identifies a sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizerKind {
    /// Constant share count.
    Fixed,
    /// Fixed fraction of equity.
    Percentage,
    /// Volatility-normalized risk via average true range.
    Atr,
    /// Fractional Kelly criterion.
    Kelly,
    /// Volatility targeting against realized volatility.
    RiskParity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizer_kind_serialization() {
        let json = serde_json::to_string(&SizerKind::RiskParity).unwrap();
        assert_eq!(json, "\"RISK_PARITY\"");

        let kind: SizerKind = serde_json::from_str("\"ATR\"").unwrap();
        assert_eq!(kind, SizerKind::Atr);
    }

    #[test]
    fn test_default_context_is_empty() {
        let context = SizingContext::default();
        assert!(context.bars.is_empty());
        assert!(context.returns.is_empty());
    }
}
