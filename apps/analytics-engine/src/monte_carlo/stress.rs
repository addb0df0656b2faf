//! Stress scenario mutators.
//!
//! Each mutator rewrites a slice of percent returns in place. The slice
//! length never changes; scenarios only rewrite values.

use rand::Rng;
use rust_decimal::Decimal;

use crate::metrics::math;

use super::types::StressScenario;

/// Volatility multiplier applied around the mean in the crisis scenario.
const CRISIS_VOL_MULTIPLIER: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Per-period drift added to every return in the prolonged bear scenario.
const BEAR_DRIFT: Decimal = Decimal::from_parts(5, 0, 0, true, 0);

/// Applies `scenario` to `returns` in place using `rng` for every random
/// draw.
pub(super) fn apply_scenario<R: Rng>(
    scenario: StressScenario,
    returns: &mut [Decimal],
    rng: &mut R,
) {
    if returns.is_empty() {
        return;
    }

    match scenario {
        StressScenario::Crisis2008 => apply_crisis(returns, rng),
        StressScenario::FlashCrash => apply_flash_crash(returns, rng),
        StressScenario::ProlongedBear => apply_prolonged_bear(returns, rng),
        StressScenario::BlackSwan => apply_black_swan(returns, rng),
    }
}

/// Triples the spread around the mean, then replaces a random half of the
/// entries with losses drawn uniformly from -20% to -5%.
fn apply_crisis<R: Rng>(returns: &mut [Decimal], rng: &mut R) {
    let mean = math::mean(returns).unwrap_or(Decimal::ZERO);
    for r in returns.iter_mut() {
        *r = mean + CRISIS_VOL_MULTIPLIER * (*r - mean);
    }

    let crash_count = returns.len() / 2;
    for idx in rand::seq::index::sample(rng, returns.len(), crash_count) {
        returns[idx] = decimal_from(rng.random_range(-20.0..-5.0));
    }
}

/// Drops one entry in the middle half of the series to a loss between -50%
/// and -30%, then halves the magnitude of up to five following entries and
/// forces them positive.
fn apply_flash_crash<R: Rng>(returns: &mut [Decimal], rng: &mut R) {
    let n = returns.len();
    let lower = n / 4;
    let upper = (n * 3 / 4).max(lower + 1);
    let crash_idx = rng.random_range(lower..upper);
    returns[crash_idx] = decimal_from(rng.random_range(-50.0..-30.0));

    let recovery_end = (crash_idx + 6).min(n);
    for r in &mut returns[crash_idx + 1..recovery_end] {
        *r = r.abs() / Decimal::TWO;
    }
}

/// Adds a -5% drift to every entry, then forces a random 70% of the entries
/// negative.
fn apply_prolonged_bear<R: Rng>(returns: &mut [Decimal], rng: &mut R) {
    for r in returns.iter_mut() {
        *r += BEAR_DRIFT;
    }

    let forced_count = returns.len() * 7 / 10;
    for idx in rand::seq::index::sample(rng, returns.len(), forced_count) {
        returns[idx] = -returns[idx].abs();
    }
}

/// Overwrites five to ten random entries with tail events of four to six
/// standard deviations, signed by a fair coin flip.
fn apply_black_swan<R: Rng>(returns: &mut [Decimal], rng: &mut R) {
    let std = math::std_dev(returns).unwrap_or(Decimal::ZERO);
    let event_count = rng.random_range(5..=10).min(returns.len());
    for idx in rand::seq::index::sample(rng, returns.len(), event_count) {
        let magnitude = decimal_from(rng.random_range(4.0..6.0)) * std;
        returns[idx] = if rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };
    }
}

fn decimal_from(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}
