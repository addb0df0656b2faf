//! Monte Carlo resampling and stress-testing pipeline.
//!
//! Answers "how much of this backtest is luck?" by re-running a finished
//! trade or return series many times in randomized order and aggregating
//! the outcome distribution. Stress scenarios rewrite the series first to
//! probe behavior under hostile regimes.
//!
//! # Features
//!
//! - Shuffle and bootstrap resampling of per-period percent returns
//! - Trade-history input with recorded-over-derived return selection
//! - Four frozen stress scenarios (2008 crisis, flash crash, prolonged
//!   bear, black swan)
//! - Percentiles, confidence interval, profit probability, risk of ruin,
//!   and best/worst equity curves per ensemble
//! - Seeded determinism, stable across the parallel and sequential paths
//!
//! # Example
//!
//! ```rust,ignore
//! use analytics_engine::monte_carlo::{ResampleMethod, SimulatorBuilder};
//! use rust_decimal_macros::dec;
//!
//! let mut simulator = SimulatorBuilder::new()
//!     .initial_capital(dec!(100000))
//!     .n_simulations(1000)
//!     .seed(42)
//!     .build();
//!
//! let returns = vec![dec!(1.2), dec!(-0.4), dec!(0.7)];
//! let result = simulator.simulate_from_returns(&returns, ResampleMethod::Shuffle)?;
//! println!("p5 final equity: {}", result.percentiles.p5);
//! # Ok::<(), analytics_engine::monte_carlo::ValidationError>(())
//! ```

mod error;
mod simulator;
mod stress;
mod types;

pub use error::ValidationError;
pub use simulator::{MonteCarloSimulator, SimulatorBuilder};
pub use types::{Percentiles, ResampleMethod, SimulationResult, StressScenario};
