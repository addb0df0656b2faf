//! Error types for simulation inputs.

use thiserror::Error;

/// Caller misuse detected before any simulation work starts.
///
/// Degenerate numeric conditions inside a run never raise; only invalid
/// inputs reach this type, and they are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Trade list was empty where at least one trade is required.
    #[error("No trades provided for simulation")]
    EmptyTrades,

    /// Returns array was empty where at least one return is required.
    #[error("No returns provided for simulation")]
    EmptyReturns,

    /// Trades were present but none yielded a usable return.
    #[error("No usable returns could be derived from {trade_count} trades")]
    NoUsableReturns {
        /// Number of trades inspected.
        trade_count: usize,
    },

    /// More samples requested without replacement than are available.
    #[error("Cannot draw {requested} samples without replacement from {available} returns")]
    SampleExceedsPopulation {
        /// Number of samples requested.
        requested: usize,
        /// Number of returns available.
        available: usize,
    },

    /// Unrecognized resampling method name.
    #[error("Unknown resampling method '{name}'")]
    UnknownMethod {
        /// The name that failed to parse.
        name: String,
    },

    /// Unrecognized stress scenario name.
    #[error("Unknown stress scenario '{name}'")]
    UnknownScenario {
        /// The name that failed to parse.
        name: String,
    },
}
