//! Statistical math utilities shared by the analyzer, the simulator, and
//! the sizing strategies.

use rust_decimal::Decimal;

use super::constants::{TOLERANCE, TWO};

/// Calculate mean of a slice of decimals.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len() as u64))
}

/// Calculate sample standard deviation of a slice of decimals.
pub fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    let variance = variance_sum / Decimal::from((values.len() - 1) as u64);

    sqrt_decimal(variance)
}

/// Calculate downside deviation (only negative returns).
pub fn downside_deviation(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let negative_returns: Vec<Decimal> = values
        .iter()
        .filter(|v| **v < Decimal::ZERO)
        .copied()
        .collect();

    if negative_returns.is_empty() {
        return Some(Decimal::ZERO);
    }

    let variance_sum: Decimal = negative_returns.iter().map(|v| *v * *v).sum();
    let variance = variance_sum / Decimal::from(values.len() as u64); // Use total count

    sqrt_decimal(variance)
}

/// Approximate square root using Newton's method.
pub fn sqrt_decimal(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value == Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut guess = value / TWO;

    for _ in 0..50 {
        let next = (guess + value / guess) / TWO;
        if (next - guess).abs() < TOLERANCE {
            return Some(next);
        }
        guess = next;
    }

    Some(guess)
}

/// Period-over-period fractional change of an equity series.
///
/// Points with a non-positive predecessor are skipped, so the result may be
/// shorter than `len - 1`.
pub fn percent_change_series(values: &[Decimal]) -> Vec<Decimal> {
    if values.len() < 2 {
        return Vec::new();
    }

    let mut returns = Vec::with_capacity(values.len() - 1);
    for window in values.windows(2) {
        let prev = window[0];
        let curr = window[1];
        if prev > Decimal::ZERO {
            returns.push((curr - prev) / prev);
        }
    }

    returns
}

/// Maximum peak-to-trough decline of an equity series as a fraction of the
/// peak. Zero for empty or monotonically rising series.
pub fn max_drawdown(values: &[Decimal]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;

    for value in values {
        if *value > peak {
            peak = *value;
        } else if peak > Decimal::ZERO {
            let drawdown = (peak - *value) / peak;
            max_dd = max_dd.max(drawdown);
        }
    }

    max_dd
}
