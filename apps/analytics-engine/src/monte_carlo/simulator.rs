//! Resampling simulator over per-period strategy returns.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::metrics::TradeRecord;
use crate::metrics::constants::HUNDRED;
use crate::metrics::math;

use super::error::ValidationError;
use super::stress;
use super::types::{Percentiles, ResampleMethod, SimulationResult, StressScenario};

/// Starting equity used by [`SimulatorBuilder`] when none is given.
const DEFAULT_INITIAL_CAPITAL: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Run count used by [`SimulatorBuilder`] when none is given.
const DEFAULT_RUN_COUNT: usize = 1_000;

/// Minimum run count before the ensemble is spread across the rayon pool.
const MIN_PARALLEL_RUNS: usize = 32;

/// Monte Carlo engine that resamples historical per-period returns.
///
/// Every random draw flows from one seeded generator, so a simulator built
/// with the same seed produces bit-identical results for the same inputs.
/// Each run gets its own child seed drawn up front, which keeps results
/// independent of how the runs are scheduled.
#[derive(Debug)]
pub struct MonteCarloSimulator {
    initial_capital: Decimal,
    n_simulations: usize,
    seed: u64,
    rng: StdRng,
}

impl MonteCarloSimulator {
    /// Creates a simulator; `n_simulations` is clamped to at least one run.
    ///
    /// When `seed` is `None`, one is drawn from the thread RNG and retained;
    /// [`Self::seed`] reports the value actually used.
    #[must_use]
    pub fn new(initial_capital: Decimal, n_simulations: usize, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            initial_capital,
            n_simulations: n_simulations.max(1),
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed driving this simulator's random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of runs per simulation call.
    #[must_use]
    pub const fn n_simulations(&self) -> usize {
        self.n_simulations
    }

    /// Starting equity of every simulated run.
    #[must_use]
    pub const fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    /// Runs the full ensemble over `returns` (percent per period) using
    /// `method` resampling and aggregates the outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyReturns`] when `returns` is empty.
    pub fn simulate_from_returns(
        &mut self,
        returns: &[Decimal],
        method: ResampleMethod,
    ) -> Result<SimulationResult, ValidationError> {
        if returns.is_empty() {
            return Err(ValidationError::EmptyReturns);
        }

        info!(
            n_simulations = self.n_simulations,
            returns = returns.len(),
            method = ?method,
            seed = self.seed,
            "starting monte carlo simulation"
        );
        let start_time = Instant::now();

        let run_seeds: Vec<u64> = (0..self.n_simulations).map(|_| self.rng.random()).collect();
        let outcomes: Vec<RunOutcome> = if self.n_simulations >= MIN_PARALLEL_RUNS {
            run_seeds
                .par_iter()
                .map(|&seed| run_once(seed, returns, method, self.initial_capital))
                .collect()
        } else {
            run_seeds
                .iter()
                .map(|&seed| run_once(seed, returns, method, self.initial_capital))
                .collect()
        };

        let result = self.aggregate(outcomes);
        info!(
            mean_return_pct = %result.mean_return_pct,
            probability_of_profit = %result.probability_of_profit,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "monte carlo simulation complete"
        );
        Ok(result)
    }

    /// Derives per-trade percent returns from `trades` and simulates them.
    ///
    /// A recorded `pnl_pct` wins over the derived return; trades with
    /// neither are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTrades`] for an empty slice and
    /// [`ValidationError::NoUsableReturns`] when no trade yields a return.
    pub fn simulate_from_trades(
        &mut self,
        trades: &[TradeRecord],
        method: ResampleMethod,
    ) -> Result<SimulationResult, ValidationError> {
        if trades.is_empty() {
            return Err(ValidationError::EmptyTrades);
        }

        let returns: Vec<Decimal> = trades
            .iter()
            .filter_map(|trade| trade.pnl_pct.or_else(|| trade.return_pct()))
            .collect();
        if returns.is_empty() {
            return Err(ValidationError::NoUsableReturns {
                trade_count: trades.len(),
            });
        }

        self.simulate_from_returns(&returns, method)
    }

    /// Applies `scenario` to a copy of `returns` and simulates the stressed
    /// series with bootstrap resampling.
    ///
    /// Bootstrap keeps run outcomes varied under stress; a pure shuffle
    /// would give every run the same final value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyReturns`] when `returns` is empty.
    pub fn stress_test(
        &mut self,
        returns: &[Decimal],
        scenario: StressScenario,
    ) -> Result<SimulationResult, ValidationError> {
        if returns.is_empty() {
            return Err(ValidationError::EmptyReturns);
        }

        let mut stressed = returns.to_vec();
        stress::apply_scenario(scenario, &mut stressed, &mut self.rng);
        debug!(scenario = ?scenario, returns = stressed.len(), "applied stress scenario");

        self.simulate_from_returns(&stressed, ResampleMethod::Bootstrap)
    }

    /// Draws one resampled return series, with or without replacement.
    ///
    /// `n_samples` defaults to the population size.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyReturns`] for an empty input and
    /// [`ValidationError::SampleExceedsPopulation`] when sampling more than
    /// the population without replacement.
    pub fn bootstrap_returns(
        &mut self,
        returns: &[Decimal],
        n_samples: Option<usize>,
        replacement: bool,
    ) -> Result<Vec<Decimal>, ValidationError> {
        if returns.is_empty() {
            return Err(ValidationError::EmptyReturns);
        }

        let n_samples = n_samples.unwrap_or(returns.len());
        if replacement {
            return Ok((0..n_samples)
                .map(|_| returns[self.rng.random_range(0..returns.len())])
                .collect());
        }

        if n_samples > returns.len() {
            return Err(ValidationError::SampleExceedsPopulation {
                requested: n_samples,
                available: returns.len(),
            });
        }
        Ok(rand::seq::index::sample(&mut self.rng, returns.len(), n_samples)
            .iter()
            .map(|idx| returns[idx])
            .collect())
    }

    fn aggregate(&self, outcomes: Vec<RunOutcome>) -> SimulationResult {
        let final_values: Vec<Decimal> = outcomes.iter().map(|run| run.final_value).collect();
        let max_drawdowns: Vec<Decimal> = outcomes.iter().map(|run| run.max_drawdown).collect();

        let mut sorted_finals = final_values.clone();
        sorted_finals.sort_unstable();

        let percentiles = Percentiles {
            p5: percentile(&sorted_finals, 0.05),
            p25: percentile(&sorted_finals, 0.25),
            p50: percentile(&sorted_finals, 0.50),
            p75: percentile(&sorted_finals, 0.75),
            p95: percentile(&sorted_finals, 0.95),
        };
        let ci_lower = percentile(&sorted_finals, 0.025);
        let ci_upper = percentile(&sorted_finals, 0.975);

        // Total return is monotonic in final value, so the sorted order
        // carries over and the median can read the middle directly.
        let return_pcts: Vec<Decimal> = sorted_finals
            .iter()
            .map(|&value| self.total_return_pct(value))
            .collect();
        let mean_return_pct = math::mean(&return_pcts).unwrap_or(Decimal::ZERO);
        let median_return_pct = median(&return_pcts);
        let std_return_pct = math::std_dev(&return_pcts).unwrap_or(Decimal::ZERO);

        let mean_max_drawdown = math::mean(&max_drawdowns).unwrap_or(Decimal::ZERO);

        let run_count = Decimal::from(outcomes.len());
        let ruin_floor = self.initial_capital / Decimal::TWO;
        let profitable = outcomes
            .iter()
            .filter(|run| run.final_value > self.initial_capital)
            .count();
        let ruined = outcomes
            .iter()
            .filter(|run| run.final_value < ruin_floor)
            .count();

        let best_case_curve = outcomes
            .iter()
            .max_by_key(|run| run.final_value)
            .map(|run| run.equity_curve.clone())
            .unwrap_or_default();
        let worst_case_curve = outcomes
            .iter()
            .min_by_key(|run| run.final_value)
            .map(|run| run.equity_curve.clone())
            .unwrap_or_default();

        SimulationResult {
            equity_curves: outcomes.into_iter().map(|run| run.equity_curve).collect(),
            final_values,
            max_drawdowns,
            percentiles,
            ci_lower,
            ci_upper,
            mean_return_pct,
            median_return_pct,
            std_return_pct,
            probability_of_profit: Decimal::from(profitable) / run_count,
            risk_of_ruin: Decimal::from(ruined) / run_count,
            mean_max_drawdown,
            best_case_curve,
            worst_case_curve,
        }
    }

    /// Total return of `final_value` over the starting capital, in percent.
    fn total_return_pct(&self, final_value: Decimal) -> Decimal {
        if self.initial_capital <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (final_value / self.initial_capital - Decimal::ONE) * HUNDRED
    }
}

/// Builder for [`MonteCarloSimulator`].
#[derive(Debug, Clone, Copy)]
pub struct SimulatorBuilder {
    initial_capital: Decimal,
    n_simulations: usize,
    seed: Option<u64>,
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            n_simulations: DEFAULT_RUN_COUNT,
            seed: None,
        }
    }
}

impl SimulatorBuilder {
    /// Creates a builder with the default capital and run count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the starting equity of every run.
    #[must_use]
    pub const fn initial_capital(mut self, capital: Decimal) -> Self {
        self.initial_capital = capital;
        self
    }

    /// Sets the number of runs per simulation call.
    #[must_use]
    pub const fn n_simulations(mut self, count: usize) -> Self {
        self.n_simulations = count;
        self
    }

    /// Pins the random seed for reproducible results.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the simulator.
    #[must_use]
    pub fn build(self) -> MonteCarloSimulator {
        MonteCarloSimulator::new(self.initial_capital, self.n_simulations, self.seed)
    }
}

/// Output of a single resampled run.
#[derive(Debug, Clone)]
struct RunOutcome {
    equity_curve: Vec<Decimal>,
    final_value: Decimal,
    max_drawdown: Decimal,
}

fn run_once(
    seed: u64,
    returns: &[Decimal],
    method: ResampleMethod,
    initial_capital: Decimal,
) -> RunOutcome {
    let mut rng = StdRng::seed_from_u64(seed);
    let resampled: Vec<Decimal> = match method {
        ResampleMethod::Shuffle => {
            let mut sequence = returns.to_vec();
            sequence.shuffle(&mut rng);
            sequence
        }
        ResampleMethod::Bootstrap => (0..returns.len())
            .map(|_| returns[rng.random_range(0..returns.len())])
            .collect(),
    };

    let equity_curve = equity_curve_from_returns(initial_capital, &resampled);
    let final_value = equity_curve.last().copied().unwrap_or(initial_capital);
    let max_drawdown = math::max_drawdown(&equity_curve);

    RunOutcome {
        equity_curve,
        final_value,
        max_drawdown,
    }
}

/// Compounds percent returns into an equity curve starting at
/// `initial_capital`.
fn equity_curve_from_returns(initial_capital: Decimal, returns: &[Decimal]) -> Vec<Decimal> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    curve.push(initial_capital);
    let mut equity = initial_capital;
    for r in returns {
        equity *= Decimal::ONE + *r / HUNDRED;
        curve.push(equity);
    }
    curve
}

/// Nearest-rank percentile over an ascending slice.
fn percentile(sorted: &[Decimal], p: f64) -> Decimal {
    if sorted.is_empty() {
        return Decimal::ZERO;
    }
    let idx = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Median of an ascending slice, averaging the two middle values for even
/// lengths.
fn median(sorted: &[Decimal]) -> Decimal {
    let n = sorted.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO
    } else {
        sorted[n / 2]
    }
}
