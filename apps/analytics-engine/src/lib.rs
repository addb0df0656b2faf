// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Analytics Engine - Rust Core Library
//!
//! Quantitative risk and performance analytics for the Quantlab backtesting
//! platform. Turns a completed trade history and equity trajectory into
//! summary performance ratios, a live risk-halt decision process, and
//! robustness estimates under randomized trade ordering and stress scenarios.
//!
//! # Modules
//!
//! - **`metrics`**: Performance metrics from completed trades and equity
//!   curves (win rate, profit factor, calmar/sortino, recovery periods)
//! - **`risk`**: Stateful risk session with drawdown/heat/leverage limits
//!   and sticky trading halts; the position-sizing strategy family
//! - **`monte_carlo`**: Resampling and stress-scenario simulation over
//!   finished trade/return series
//!
//! # Boundaries
//!
//! Everything here is synchronous, CPU-bound, pure-memory computation. The
//! event-driven backtest runner that produces trades bar-by-bar, market data
//! fetching, persistence, and the HTTP API live in other services; they
//! exchange plain serializable values with this crate.
//!
//! # Coverage
//!
//! Coverage threshold: 90% (Critical tier)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Performance metrics computed from completed trades and equity curves.
pub mod metrics;

/// Monte Carlo resampling and stress-testing pipeline.
pub mod monte_carlo;

/// Risk session management and position sizing.
pub mod risk;

// =============================================================================
// Re-exports
// =============================================================================

pub use metrics::{MetricsReport, PerformanceAnalyzer, RecoveryPeriod, TradeRecord, TradeSide};
pub use monte_carlo::{
    MonteCarloSimulator, Percentiles, ResampleMethod, SimulationResult, SimulatorBuilder,
    StressScenario, ValidationError,
};
pub use risk::{
    PositionSizer, RiskEvent, RiskEventCode, RiskLimits, RiskManager, RiskStatistics, SessionState,
};
