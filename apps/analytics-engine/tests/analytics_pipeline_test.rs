//! End-to-End Analytics Pipeline Tests
//!
//! Runs the full flow from a finished trade history -> performance report ->
//! risk session with halts -> Monte Carlo robustness checks.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use analytics_engine::metrics::{format_pct, format_ratio};
use analytics_engine::monte_carlo::{ResampleMethod, SimulatorBuilder, StressScenario};
use analytics_engine::risk::sizing::{SizerKind, SizingContext, create_sizer};
use analytics_engine::{
    PerformanceAnalyzer, RiskEventCode, RiskManager, SessionState, SimulationResult, TradeRecord,
    TradeSide,
};

// =============================================================================
// Fixtures
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn base_date() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}

/// Five closed trades on a 1000 dollar entry value each: +100, -50, +150,
/// -30, +80.
fn backtest_trades() -> Vec<TradeRecord> {
    let pnls = [dec!(100), dec!(-50), dec!(150), dec!(-30), dec!(80)];
    (0i64..)
        .zip(pnls)
        .map(|(i, pnl)| {
            let entry = base_date() + Duration::days(i * 3);
            TradeRecord {
                entry_date: entry,
                exit_date: Some(entry + Duration::days(2)),
                entry_price: dec!(100),
                exit_price: dec!(100) + pnl / dec!(10),
                size: dec!(10),
                pnl,
                pnl_pct: None,
                bar_duration: dec!(2),
                side: TradeSide::Long,
            }
        })
        .collect()
}

/// Session equity marked after each trade close.
fn session_equity_curve() -> Vec<Decimal> {
    vec![
        dec!(100000),
        dec!(100100),
        dec!(100050),
        dec!(100200),
        dec!(100170),
        dec!(100250),
    ]
}

// =============================================================================
// Trade history to metrics report
// =============================================================================

#[test]
fn test_trade_history_to_metrics_report() {
    let report = PerformanceAnalyzer::new(
        backtest_trades(),
        dec!(100000),
        dec!(100250),
        session_equity_curve(),
    )
    .calculate_all_metrics();

    assert_eq!(report.win_rate, dec!(60));
    assert_eq!(report.avg_win, dec!(110));
    assert_eq!(report.avg_loss, dec!(-40));
    assert_eq!(report.largest_win, dec!(150));
    assert_eq!(report.largest_loss, dec!(-50));
    assert_eq!(report.profit_factor, Some(dec!(4.125)));
    assert_eq!(report.max_consecutive_wins, 1);
    assert_eq!(report.max_consecutive_losses, 1);

    // Display layer rendering of the same report.
    assert_eq!(format_pct(report.win_rate), "60.00%");
    assert_eq!(format_ratio(report.payoff_ratio), "2.75");
    assert_eq!(format_ratio(None), "N/A");
}

#[test]
fn test_metrics_report_serializes_for_service_layer() {
    let report = PerformanceAnalyzer::new(
        backtest_trades(),
        dec!(100000),
        dec!(100250),
        session_equity_curve(),
    )
    .calculate_all_metrics();

    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert!(json.get("win_rate").is_some());
    assert!(json["profit_factor"].is_string());
    assert!(json["recovery_periods"].is_array());
    assert!(json["calmar_ratio"].is_string());
}

// =============================================================================
// Risk session over the same run
// =============================================================================

#[test]
fn test_risk_session_halts_after_drawdown_breach() {
    init_tracing();

    let mut manager = RiskManager::with_defaults();
    manager.initialize(dec!(100000), Some(base_date()));

    let updates = session_equity_curve().into_iter().skip(1);
    for (offset, equity) in (1i64..).zip(updates) {
        let ts = base_date() + Duration::days(offset);
        assert!(manager.update_equity(equity, Some(ts)));
    }

    // Well inside every limit while the session is healthy.
    assert!(manager.can_open_position(dec!(20000), Some(dec!(0.05))));

    // Peak is 100250, so 70000 is a 30.17% drawdown: past the 25% limit.
    assert!(!manager.update_equity(dec!(70000), None));
    assert!(manager.is_halted());
    assert_eq!(manager.state(), SessionState::Halted);
    assert!(!manager.can_open_position(dec!(1000), None));

    let stats = manager.get_statistics();
    assert!(stats.trading_halted);
    assert_eq!(stats.halt_reason, Some(RiskEventCode::MaxDrawdownHalt));
    assert_eq!(stats.peak_equity, dec!(100250));
    assert_eq!(stats.risk_events.len(), 1);

    // The breaching sample is not part of the recorded curve.
    assert_eq!(manager.get_equity_curve().len(), 6);
}

#[test]
fn test_sizing_strategies_respect_session_limits() {
    let mut manager = RiskManager::with_defaults();
    manager.initialize(dec!(100000), None);

    // 10% of equity at price 50 buys 200 shares.
    let sizer = create_sizer(SizerKind::Percentage);
    let context = SizingContext::default();
    assert_eq!(
        manager.position_size_with(sizer.as_ref(), dec!(50), &context),
        200
    );

    // 1% risk over a 5 dollar stop: 200 shares, 20000 notional, under the
    // 25000 single-position cap.
    let sized = manager.get_risk_adjusted_position_size(dec!(100), dec!(95), dec!(0.01));
    assert_eq!(sized, dec!(20000));
}

// =============================================================================
// Monte Carlo over the same trades
// =============================================================================

#[test]
fn test_monte_carlo_confirms_profitable_ordering() {
    init_tracing();

    let mut simulator = SimulatorBuilder::new()
        .initial_capital(dec!(100000))
        .n_simulations(100)
        .seed(42)
        .build();

    let result = simulator
        .simulate_from_trades(&backtest_trades(), ResampleMethod::Shuffle)
        .unwrap();

    // Derived returns are +10, -5, +15, -3, +8 percent; every ordering
    // compounds to the same profitable terminal equity.
    assert_eq!(result.probability_of_profit, Decimal::ONE);
    assert_eq!(result.risk_of_ruin, Decimal::ZERO);
    assert_eq!(result.equity_curves.len(), 100);
    assert_eq!(result.percentiles.p5, result.percentiles.p95);
    assert!(result.mean_return_pct > dec!(25));
}

#[test]
fn test_stress_scenario_degrades_results() {
    init_tracing();

    let returns = [dec!(10), dec!(-5), dec!(15), dec!(-3), dec!(8)];
    let mut simulator = SimulatorBuilder::new()
        .initial_capital(dec!(100000))
        .n_simulations(100)
        .seed(7)
        .build();

    let baseline = simulator
        .simulate_from_returns(&returns, ResampleMethod::Bootstrap)
        .unwrap();
    let stressed = simulator
        .stress_test(&returns, StressScenario::ProlongedBear)
        .unwrap();

    assert!(stressed.mean_return_pct < baseline.mean_return_pct);
    assert!(stressed.probability_of_profit < dec!(0.5));
    assert_eq!(stressed.equity_curves.len(), 100);
}

#[test]
fn test_simulation_result_serializes_for_service_layer() {
    let mut simulator = SimulatorBuilder::new()
        .initial_capital(dec!(100000))
        .n_simulations(50)
        .seed(1)
        .build();

    let result = simulator
        .simulate_from_trades(&backtest_trades(), ResampleMethod::Bootstrap)
        .unwrap();

    let encoded = serde_json::to_string(&result).unwrap();
    let decoded: SimulationResult = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.final_values, result.final_values);
    assert_eq!(decoded.percentiles.p50, result.percentiles.p50);
}
