use chrono::{DateTime, Duration, TimeZone, Utc};
use leadlag::backtest::{self, BacktestConfig, TriggerBacktestEngine};
use leadlag::cli::{DataConfig, PipelineConfig};
use leadlag::commands::{run_backtest, run_discover};
use leadlag::data::{generate_lead_lag_returns, load_directory, ReturnSeriesStore};
use leadlag::discovery::{
    compute_correlations, discover_signals, DirectionPolicy, DiscoveryConfig, Signal,
    SignalSelector,
};
use leadlag::ledger::TradeAction;
use leadlag::types::Direction;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

// --- Helpers ---

fn axis(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

fn store(series: Vec<(&str, Vec<Option<f64>>)>) -> ReturnSeriesStore {
    let n = series[0].1.len();
    let map: BTreeMap<_, _> = series
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    ReturnSeriesStore::new(axis(n), map).unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// --- Scenarios ---

#[test]
fn test_single_spike_opens_and_unwinds_after_lag() {
    let mut leader = vec![Some(0.0); 20];
    leader[10] = Some(0.004);
    let store = store(vec![("EURUSD", leader), ("GBPUSD", vec![Some(0.0); 20])]);

    let signal = Signal {
        rank: 0,
        leader: "EURUSD".to_string(),
        follower: "GBPUSD".to_string(),
        lag: 2,
        correlation: 0.8,
        score: 4.0,
        direction: Direction::Opposite,
    };
    // Flat sizing: every trigger trades exactly the base size
    let config = BacktestConfig {
        trigger_threshold: 0.003,
        base_size: dec!(1.0),
        size_scale: 0.0,
        ..Default::default()
    };

    let report = backtest::run(&store, &[signal], &config).unwrap();
    let trades = report.ledger.trades();
    let t = axis(20);

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].action, TradeAction::Open);
    assert_eq!(trades[0].timestamp, t[10]);
    assert_eq!(trades[0].instrument, "GBPUSD");
    assert_eq!(trades[0].size, dec!(-1.0));
    assert_eq!(trades[1].action, TradeAction::Close);
    assert_eq!(trades[1].timestamp, t[12]);
    assert_eq!(trades[1].size, dec!(1.0));
    assert_eq!(report.ledger.position("GBPUSD"), Decimal::ZERO);
    assert!(report.open_legs.is_empty());
}

#[test]
fn test_default_sizing_scales_spike() {
    let mut leader = vec![Some(0.0); 20];
    leader[10] = Some(0.004);
    let store = store(vec![("EURUSD", leader), ("GBPUSD", vec![Some(0.0); 20])]);
    let signal = Signal {
        rank: 0,
        leader: "EURUSD".to_string(),
        follower: "GBPUSD".to_string(),
        lag: 2,
        correlation: 0.8,
        score: 4.0,
        direction: Direction::Opposite,
    };

    let engine = TriggerBacktestEngine::new(BacktestConfig::default()).unwrap();
    let report = engine.run(&store, &[signal]);
    assert_eq!(report.ledger.trades()[0].size, dec!(-1.16666667));
    assert_eq!(report.ledger.position("GBPUSD"), Decimal::ZERO);
}

#[test]
fn test_short_history_yields_no_signals_and_no_trades() {
    // Hourly gaps leave at most 6 valid pairs in any 12-hour window
    let sparse = |scale: f64| -> Vec<Option<f64>> {
        (0..30)
            .map(|i| (i % 2 == 0).then(|| scale * ((i * 7 % 11) as f64 - 5.0)))
            .collect()
    };
    let store = store(vec![("EURUSD", sparse(0.001)), ("GBPUSD", sparse(-0.002))]);

    let discovery = DiscoveryConfig {
        window: 12,
        max_lag: 6,
        ..Default::default()
    };
    let records = compute_correlations(&store, &discovery).unwrap();
    let signals = SignalSelector::from_config(&discovery).select(&records);
    assert!(signals.is_empty());

    let report = backtest::run(&store, &signals, &BacktestConfig::default()).unwrap();
    assert!(report.no_qualifying_signals());
    assert!(report.ledger.trades().is_empty());
    assert!(report.final_positions().values().all(|p| p.is_zero()));
    assert_eq!(report.ledger.position("EURUSD"), Decimal::ZERO);
    assert_eq!(report.total_pnl(), 0.0);
}

#[test]
fn test_correlation_scan_is_idempotent() {
    let instruments = names(&["AUDUSD", "EURUSD", "GBPUSD", "USDJPY"]);
    let store = generate_lead_lag_returns(&instruments, 150, 3, 11).unwrap();
    let config = DiscoveryConfig {
        window: 24,
        max_lag: 4,
        ..Default::default()
    };

    let first = compute_correlations(&store, &config).unwrap();
    let second = compute_correlations(&store, &config).unwrap();
    assert_eq!(first, second);

    let sequential = compute_correlations(
        &store,
        &DiscoveryConfig {
            parallel: false,
            ..config
        },
    )
    .unwrap();
    assert_eq!(first, sequential);
}

#[test]
fn test_synthetic_pipeline_recovers_planted_pairs() {
    // AUDUSD and EURUSD lead; GBPUSD follows AUDUSD, USDJPY follows EURUSD
    let instruments = names(&["AUDUSD", "EURUSD", "GBPUSD", "USDJPY"]);
    let store = generate_lead_lag_returns(&instruments, 300, 3, 5).unwrap();
    let config = DiscoveryConfig {
        window: 24,
        max_lag: 4,
        top_k: 2,
        ..Default::default()
    };

    let signals = discover_signals(&store, &config).unwrap();
    assert_eq!(signals.len(), 2);
    let mut pairs: Vec<_> = signals
        .iter()
        .map(|s| (s.leader.as_str(), s.follower.as_str(), s.lag))
        .collect();
    pairs.sort();
    assert_eq!(pairs, vec![("AUDUSD", "GBPUSD", 3), ("EURUSD", "USDJPY", 3)]);
    assert!(signals.iter().all(|s| s.direction == Direction::Opposite));
}

#[test]
fn test_correlation_sign_policy_follows_negative_response() {
    let instruments = names(&["EURUSD", "GBPUSD"]);
    let store = generate_lead_lag_returns(&instruments, 200, 2, 9).unwrap();
    let config = DiscoveryConfig {
        window: 24,
        max_lag: 3,
        direction_policy: DirectionPolicy::CorrelationSign,
        ..Default::default()
    };

    let signals = discover_signals(&store, &config).unwrap();
    // Followers react against their leader, so the correlation is negative
    assert_eq!(signals[0].direction, Direction::Opposite);
}

#[test]
fn test_backtest_positions_net_out_after_all_legs_mature() {
    let instruments = names(&["EURUSD", "GBPUSD"]);
    let store = generate_lead_lag_returns(&instruments, 240, 2, 42).unwrap();
    let signals = discover_signals(
        &store,
        &DiscoveryConfig {
            window: 24,
            max_lag: 3,
            ..Default::default()
        },
    )
    .unwrap();
    let report = backtest::run(&store, &signals, &BacktestConfig::default()).unwrap();

    let summary = report.ledger.summary();
    assert!(summary.opens > 0);
    assert_eq!(summary.opens, summary.closes + report.open_legs.len());

    let pending: Decimal = report.open_legs.iter().map(|l| l.size).sum();
    let net: Decimal = report.final_positions().values().copied().sum();
    assert_eq!(net, pending);
}

// --- Ingestion ---

fn write_prices(dir: &std::path::Path, instrument: &str, closes: &[f64]) {
    let mut file = fs::File::create(dir.join(format!("{}.csv", instrument))).unwrap();
    writeln!(file, "timestamp,close").unwrap();
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    for (i, close) in closes.iter().enumerate() {
        let ts = start + Duration::hours(i as i64);
        writeln!(file, "{},{}", ts.to_rfc3339(), close).unwrap();
    }
}

#[test]
fn test_csv_directory_feeds_discovery() {
    let dir = tempdir().unwrap();
    let leader: Vec<f64> = (0..80)
        .map(|i| 1.10 + 0.002 * ((i * 7 % 11) as f64 - 5.0))
        .collect();
    // Follower copies the leader shifted by one hour
    let mut follower = vec![1.25];
    follower.extend(leader.iter().take(79).map(|p| p + 0.15));
    write_prices(dir.path(), "EURUSD", &leader);
    write_prices(dir.path(), "GBPUSD", &follower);

    let store = load_directory(dir.path(), &names(&["EURUSD", "GBPUSD"]), 4).unwrap();
    assert_eq!(store.len(), 80);
    assert_eq!(store.return_at("EURUSD", 0), None);

    let records = compute_correlations(
        &store,
        &DiscoveryConfig {
            window: 20,
            max_lag: 2,
            ..Default::default()
        },
    )
    .unwrap();
    let best = records
        .iter()
        .max_by(|a, b| a.mean_abs_correlation.total_cmp(&b.mean_abs_correlation))
        .unwrap();
    assert_eq!(best.leader, "EURUSD");
    assert_eq!(best.follower, "GBPUSD");
    assert_eq!(best.lag, 1);
}

// --- Commands ---

fn synthetic_pipeline() -> PipelineConfig {
    PipelineConfig {
        data: DataConfig {
            instruments: names(&["EURUSD", "GBPUSD", "USDJPY"]),
            synthetic: true,
            synthetic_hours: 240,
            ..Default::default()
        },
        discovery: DiscoveryConfig {
            window: 24,
            max_lag: 3,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_discover_command_writes_signals_json() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("signals.json");
    let signals = run_discover(&synthetic_pipeline(), &output).unwrap();

    let written: Vec<Signal> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, signals);
}

#[test]
fn test_backtest_command_results_json() {
    let dir = tempdir().unwrap();
    let report = run_backtest(&synthetic_pipeline(), dir.path(), true).unwrap();

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("results.json")).unwrap())
            .unwrap();
    assert_eq!(results["no_qualifying_signals"], false);
    assert_eq!(results["ticks"], report.diagnostics.ticks);
    assert_eq!(
        results["signals"].as_array().map(|a| a.len()),
        Some(report.signals.len())
    );

    let trades = fs::read_to_string(dir.path().join("trades.csv")).unwrap();
    assert!(trades.starts_with("sequence,timestamp,signal_rank"));
}

#[test]
fn test_invalid_config_is_rejected_before_loading() {
    let mut config = synthetic_pipeline();
    config.discovery.window = 5;
    let dir = tempdir().unwrap();
    assert!(run_discover(&config, &dir.path().join("signals.json")).is_err());
}
