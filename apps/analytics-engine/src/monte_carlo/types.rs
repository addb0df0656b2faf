//! Simulation methods, scenarios, and result types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Resampling method for simulation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMethod {
    /// Random permutation of the input returns (removes timing luck,
    /// preserves the exact multiset).
    #[default]
    Shuffle,
    /// Sampling with replacement (approximates the empirical distribution).
    Bootstrap,
}

impl FromStr for ResampleMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shuffle" => Ok(Self::Shuffle),
            "bootstrap" => Ok(Self::Bootstrap),
            other => Err(ValidationError::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

/// Historical stress scenario applied to a copy of the input returns.
///
/// Event counts and magnitudes are fixed constants of each scenario, not
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressScenario {
    /// Variance amplification plus a deep random loss cluster.
    #[serde(rename = "2008_crisis")]
    Crisis2008,
    /// One extreme single-period loss with a partial recovery after it.
    FlashCrash,
    /// A persistent negative drift with most periods forced negative.
    ProlongedBear,
    /// A handful of extreme tail events of either sign.
    BlackSwan,
}

impl FromStr for StressScenario {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2008_crisis" => Ok(Self::Crisis2008),
            "flash_crash" => Ok(Self::FlashCrash),
            "prolonged_bear" => Ok(Self::ProlongedBear),
            "black_swan" => Ok(Self::BlackSwan),
            other => Err(ValidationError::UnknownScenario {
                name: other.to_string(),
            }),
        }
    }
}

/// Final-value percentiles across all runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Percentiles {
    /// 5th percentile.
    pub p5: Decimal,
    /// 25th percentile.
    pub p25: Decimal,
    /// 50th percentile.
    pub p50: Decimal,
    /// 75th percentile.
    pub p75: Decimal,
    /// 95th percentile.
    pub p95: Decimal,
}

/// Ensemble output of one simulation call.
///
/// Immutable once returned; every aggregate is computed over the full run
/// set before the call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Equity curve of every run, starting at the initial capital.
    pub equity_curves: Vec<Vec<Decimal>>,
    /// Terminal equity of every run.
    pub final_values: Vec<Decimal>,
    /// Peak-to-trough max drawdown of every run (fraction).
    pub max_drawdowns: Vec<Decimal>,
    /// Final-value percentiles.
    pub percentiles: Percentiles,
    /// Lower bound of the 95% confidence interval (2.5th percentile).
    pub ci_lower: Decimal,
    /// Upper bound of the 95% confidence interval (97.5th percentile).
    pub ci_upper: Decimal,
    /// Mean total return across runs, in percent.
    pub mean_return_pct: Decimal,
    /// Median total return across runs, in percent.
    pub median_return_pct: Decimal,
    /// Standard deviation of total returns across runs, in percent.
    pub std_return_pct: Decimal,
    /// Fraction of runs ending above the initial capital.
    pub probability_of_profit: Decimal,
    /// Fraction of runs ending below half the initial capital.
    pub risk_of_ruin: Decimal,
    /// Mean of the per-run max drawdowns (fraction).
    pub mean_max_drawdown: Decimal,
    /// Equity curve of the run with the highest terminal equity.
    pub best_case_curve: Vec<Decimal>,
    /// Equity curve of the run with the lowest terminal equity.
    pub worst_case_curve: Vec<Decimal>,
}
