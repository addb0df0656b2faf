//! Risk session management and position sizing.
//!
//! This module owns the live risk-halt decision process for a backtest
//! session. The external engine feeds equity updates bar by bar; the
//! session tracks drawdown against the running peak and halts trading when
//! a limit trips.
//!
//! # Features
//!
//! - Drawdown and trailing stop halts (sticky until re-initialized)
//! - Pre-trade checks: position size, portfolio heat, gross leverage
//! - Open-position tracking with dollar heat aggregation
//! - Risk-adjusted position sizing from stop distance
//! - Pluggable sizing strategies (fixed, percentage, ATR, Kelly, risk parity)
//!
//! # Example
//!
//! ```rust,ignore
//! use analytics_engine::risk::{RiskLimits, RiskManager};
//! use rust_decimal_macros::dec;
//!
//! let mut manager = RiskManager::new(RiskLimits::default());
//! manager.initialize(dec!(100000), None);
//!
//! if !manager.update_equity(dec!(92000), None) {
//!     let stats = manager.get_statistics();
//!     println!("halted: {:?}", stats.halt_reason);
//! }
//! ```

mod manager;
pub mod sizing;
mod types;

pub use manager::RiskManager;
pub use sizing::{PositionSizer, SizerKind, SizingContext, create_sizer};
pub use types::{
    EquitySample, Position, RiskEvent, RiskEventCode, RiskLimits, RiskStatistics, SessionState,
};
