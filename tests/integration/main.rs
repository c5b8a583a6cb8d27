// Integration tests for the watchlist pipeline
//
// These tests drive the full screen end-to-end against an in-memory provider:
// - Metric derivation, tiering and filtering across tickers
// - Per-ticker failure isolation and warnings
// - Deterministic ordering for sequential and concurrent runs
// - Expiration selection, feature flags and the cache layer


use options_activity::activity::{ActivityTier, FlowBias, Moneyness, OptionType, WarningKind};
use options_activity::activity::{ScreenResult, WatchlistPipeline};
use options_activity::config::{ActivityThresholds, ScreenerConfig};
use options_activity::error::{MarketDataError, TickerError};
use options_activity::market_data::{CachedProvider, RawContract};
use options_activity::report::{ReportGenerator, EMPTY_STATE_MESSAGE};
use std::sync::atomic::Ordering;
use std::time::Duration;
use support::{contract, MockProvider, MockTicker};

const EXP: &str = "2026-10-23";

fn config(tickers: &[&str]) -> ScreenerConfig {
    ScreenerConfig {
        watchlist: tickers.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

fn keys(result: &ScreenResult) -> Vec<(String, OptionType, u64)> {
    result
        .records
        .iter()
        .map(|r| (r.ticker.clone(), r.option_type, r.strike as u64))
        .collect()
}

#[tokio::test]
async fn test_extreme_contract_is_reported() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(95.0)
            .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.vol_over_oi, Some(5.0));
    assert_eq!(record.activity_tier, ActivityTier::Extreme);
    assert_eq!(record.option_type, OptionType::Call);
    assert_eq!(record.expiration, EXP);
    assert_eq!(record.spot, Some(95.0));
    assert_eq!(record.moneyness, Some(Moneyness::Otm));
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_zero_open_interest_passes_as_unknown() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(100.0)
            .chain(EXP, vec![contract(100.0, 200, 0)], vec![]),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].open_interest, None);
    assert_eq!(result.records[0].vol_over_oi, None);
    assert_eq!(result.records[0].activity_tier, ActivityTier::Unknown);
}

#[tokio::test]
async fn test_volume_gate_and_normal_tier_excluded() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).spot(100.0).chain(
            EXP,
            vec![
                // Extreme but below the volume gate
                contract(90.0, 99, 10),
                // Normal tier
                contract(100.0, 500, 1000),
                // Exactly at the gate and the unusual threshold
                contract(110.0, 100, 100),
            ],
            vec![],
        ),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;

    assert_eq!(keys(&result), vec![("AAA".to_string(), OptionType::Call, 110)]);
    assert_eq!(result.records[0].activity_tier, ActivityTier::Unusual);
}

#[tokio::test]
async fn test_puts_without_volume_leave_ratio_undefined() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).spot(100.0).chain(
            EXP,
            vec![contract(100.0, 600, 1000), contract(105.0, 400, 1000)],
            vec![RawContract::new(95.0, None, Some(50))],
        ),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;

    assert_eq!(result.imbalances.len(), 1);
    let row = &result.imbalances[0];
    assert_eq!(row.call_volume, 1000);
    assert_eq!(row.put_volume, 0);
    assert_eq!(row.ratio, None);
    assert_eq!(row.bias, FlowBias::Neutral);
}

#[tokio::test]
async fn test_call_heavy_imbalance() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).spot(100.0).chain(
            EXP,
            vec![contract(100.0, 300, 1000)],
            vec![contract(95.0, 200, 1000)],
        ),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;

    let row = &result.imbalances[0];
    assert_eq!(row.ratio, Some(1.5));
    assert_eq!(row.bias, FlowBias::CallHeavy);
}

#[tokio::test]
async fn test_fetch_failure_is_skipped() {
    let provider = MockProvider::new()
        .with_ticker(
            "BAD",
            MockTicker::failing(MarketDataError::ConnectionError("reset".to_string())),
        )
        .with_ticker(
            "AAA",
            MockTicker::new(&[EXP])
                .spot(100.0)
                .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
        );

    let result = WatchlistPipeline::new(provider)
        .run(&config(&["BAD", "AAA"]))
        .await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].ticker, "AAA");
    assert_eq!(result.imbalances.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::FetchFailure);
    assert_eq!(result.warnings[0].message, "BAD: failed to load options data");
}

#[tokio::test]
async fn test_no_expirations_is_no_data() {
    let provider = MockProvider::new().with_ticker("EMPTY", MockTicker::new(&[]).spot(10.0));

    let result = WatchlistPipeline::new(provider).run(&config(&["EMPTY"])).await;

    assert!(result.is_empty());
    assert!(result.imbalances.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::NoData);
}

#[tokio::test]
async fn test_missing_spot_is_no_data() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let pipeline = WatchlistPipeline::new(provider);
    let result = pipeline.run(&config(&["AAA"])).await;

    assert!(result.is_empty());
    assert_eq!(result.warnings[0].kind, WarningKind::NoData);
    assert_eq!(pipeline.provider().chain_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_spot_disabled_is_never_fetched() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let mut cfg = config(&["AAA"]);
    cfg.features.spot = false;

    let pipeline = WatchlistPipeline::new(provider);
    let result = pipeline.run(&cfg).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].spot, None);
    assert_eq!(result.records[0].pct_from_spot, None);
    assert_eq!(result.records[0].moneyness, None);
    assert_eq!(pipeline.provider().spot_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_relative_volume_flag() {
    let chain = vec![
        contract(100.0, 100, 100),
        contract(105.0, 200, 100),
        contract(110.0, 600, 100),
    ];
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).spot(100.0).chain(EXP, chain, vec![]),
    );
    let pipeline = WatchlistPipeline::new(provider);

    let on = pipeline.run(&config(&["AAA"])).await;
    let top = &on.records[0];
    assert_eq!(top.strike, 110.0);
    assert_eq!(top.relative_volume, Some(3.0));

    let mut cfg = config(&["AAA"]);
    cfg.features.relative_volume = false;
    let off = pipeline.run(&cfg).await;
    assert!(off.records.iter().all(|r| r.relative_volume.is_none()));
}

fn ranking_provider() -> MockProvider {
    MockProvider::new()
        .with_ticker(
            "AAA",
            MockTicker::new(&[EXP]).spot(100.0).chain(
                EXP,
                vec![contract(100.0, 500, 100), contract(101.0, 150, 0)],
                vec![contract(95.0, 300, 100)],
            ),
        )
        .with_ticker(
            "BBB",
            MockTicker::new(&[EXP]).spot(50.0).chain(
                EXP,
                vec![contract(50.0, 800, 100)],
                vec![contract(45.0, 300, 100), contract(40.0, 120, 0)],
            ),
        )
        .with_ticker(
            "SLOW",
            MockTicker::new(&[EXP])
                .spot(10.0)
                .chain(EXP, vec![contract(10.0, 200, 100)], vec![])
                .delayed(Duration::from_millis(30)),
        )
}

#[tokio::test]
async fn test_ranking_across_tickers() {
    let pipeline = WatchlistPipeline::new(ranking_provider());
    let result = pipeline.run(&config(&["SLOW", "AAA", "BBB"])).await;

    assert_eq!(
        keys(&result),
        vec![
            ("BBB".to_string(), OptionType::Call, 50),
            ("AAA".to_string(), OptionType::Call, 100),
            // Equal ratios keep watchlist then call/put order
            ("AAA".to_string(), OptionType::Put, 95),
            ("BBB".to_string(), OptionType::Put, 45),
            ("SLOW".to_string(), OptionType::Call, 10),
            // Undefined ratios last
            ("AAA".to_string(), OptionType::Call, 101),
            ("BBB".to_string(), OptionType::Put, 40),
        ]
    );
}

#[tokio::test]
async fn test_parallel_matches_sequential() {
    let pipeline = WatchlistPipeline::new(ranking_provider());
    let watchlist = ["SLOW", "AAA", "MISSING", "BBB"];

    let parallel = pipeline.run(&config(&watchlist)).await;

    let mut cfg = config(&watchlist);
    cfg.features.parallel = false;
    let sequential = pipeline.run(&cfg).await;

    assert_eq!(parallel.records, sequential.records);
    assert_eq!(parallel.imbalances, sequential.imbalances);
    assert_eq!(parallel.warnings, sequential.warnings);

    let order: Vec<&str> = parallel.imbalances.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(order, vec!["SLOW", "AAA", "BBB"]);
}

#[tokio::test]
async fn test_duplicate_tickers_screened_twice() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(100.0)
            .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let result = WatchlistPipeline::new(provider)
        .run(&config(&["AAA", "AAA"]))
        .await;

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.imbalances.len(), 2);
}

#[tokio::test]
async fn test_expiration_selection_and_fallback() {
    let later = "2026-10-30";
    let provider = MockProvider::new()
        .with_ticker(
            "AAA",
            MockTicker::new(&[EXP, later])
                .spot(100.0)
                .chain(EXP, vec![contract(100.0, 500, 100)], vec![])
                .chain(later, vec![contract(120.0, 400, 100)], vec![]),
        )
        .with_ticker(
            "BBB",
            MockTicker::new(&[EXP])
                .spot(100.0)
                .chain(EXP, vec![contract(90.0, 300, 100)], vec![]),
        );

    let mut cfg = config(&["AAA", "BBB"]);
    cfg.expiration_selection
        .insert("AAA".to_string(), later.to_string());
    cfg.expiration_selection
        .insert("BBB".to_string(), "2027-01-15".to_string());

    let pipeline = WatchlistPipeline::new(provider);
    let result = pipeline.run(&cfg).await;

    assert_eq!(result.imbalances[0].expiration, later);
    assert_eq!(result.imbalances[1].expiration, EXP);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].ticker, "BBB");
    assert_eq!(result.warnings[0].kind, WarningKind::ExpirationFallback);
    // Fallback still produces rows
    assert!(result.records.iter().any(|r| r.ticker == "BBB"));

    cfg.features.expiration_selection = false;
    let nearest = pipeline.run(&cfg).await;
    assert_eq!(nearest.imbalances[0].expiration, EXP);
    assert!(nearest.warnings.is_empty());
}

#[tokio::test]
async fn test_slow_ticker_times_out() {
    let provider = MockProvider::new()
        .with_ticker(
            "HANG",
            MockTicker::new(&[EXP])
                .spot(100.0)
                .delayed(Duration::from_secs(5)),
        )
        .with_ticker(
            "AAA",
            MockTicker::new(&[EXP])
                .spot(100.0)
                .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
        );

    let pipeline =
        WatchlistPipeline::new(provider).with_fetch_timeout(Duration::from_millis(50));
    let result = pipeline.run(&config(&["HANG", "AAA"])).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].ticker, "HANG");
    assert_eq!(result.warnings[0].kind, WarningKind::FetchFailure);

    let err = pipeline.screen_ticker("HANG", &config(&["HANG"])).await.unwrap_err();
    assert!(matches!(
        err,
        TickerError::FetchFailure {
            source: MarketDataError::Timeout(50),
            ..
        }
    ));
}

#[tokio::test]
async fn test_queued_requests_do_not_time_out() {
    let tickers: Vec<String> = (0..25).map(|i| format!("T{:02}", i)).collect();
    let mut provider = MockProvider::new().throttled(Duration::from_millis(10));
    for ticker in &tickers {
        provider = provider.with_ticker(
            ticker,
            MockTicker::new(&[EXP])
                .spot(100.0)
                .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
        );
    }

    // 75 queued requests at 10ms each; the tail waits far beyond the deadline
    let pipeline =
        WatchlistPipeline::new(provider).with_fetch_timeout(Duration::from_millis(100));
    let names: Vec<&str> = tickers.iter().map(String::as_str).collect();
    let result = pipeline.run(&config(&names)).await;

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.records.len(), 25);
    assert_eq!(pipeline.provider().permits.load(Ordering::SeqCst), 75);
}

#[tokio::test]
async fn test_custom_thresholds() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP]).spot(100.0).chain(
            EXP,
            vec![contract(100.0, 250, 100), contract(105.0, 150, 100)],
            vec![],
        ),
    );

    let mut cfg = config(&["AAA"]);
    cfg.thresholds = ActivityThresholds::new(2.0, 3.0, 6.0);

    let result = WatchlistPipeline::new(provider).run(&cfg).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].vol_over_oi, Some(2.5));
    assert_eq!(result.records[0].activity_tier, ActivityTier::Unusual);
}

#[tokio::test]
async fn test_cached_provider_reuses_fetches() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(100.0)
            .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let pipeline = WatchlistPipeline::new(CachedProvider::new(provider, Duration::from_secs(60)));
    let first = pipeline.run(&config(&["AAA"])).await;
    let second = pipeline.run(&config(&["AAA"])).await;

    assert_eq!(first.records, second.records);

    let inner = pipeline.provider().inner();
    assert_eq!(inner.expiration_calls.load(Ordering::SeqCst), 1);
    assert_eq!(inner.chain_calls.load(Ordering::SeqCst), 1);
    assert_eq!(inner.spot_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_screen_renders_empty_state() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(100.0)
            .chain(EXP, vec![contract(100.0, 500, 1000)], vec![]),
    );

    let cfg = config(&["AAA"]);
    let result = WatchlistPipeline::new(provider).run(&cfg).await;
    assert!(result.is_empty());

    let report = ReportGenerator::new(&cfg).render(&result);
    assert!(report.markdown_content.contains(EMPTY_STATE_MESSAGE));
    assert!(report.markdown_content.contains("## Flow Imbalance"));
    assert!(report.failed_tickers.is_empty());
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let provider = MockProvider::new().with_ticker(
        "AAA",
        MockTicker::new(&[EXP])
            .spot(100.0)
            .chain(EXP, vec![contract(100.0, 500, 100)], vec![]),
    );

    let result = WatchlistPipeline::new(provider).run(&config(&["AAA"])).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["records"][0]["option_type"], "CALL");
    assert_eq!(json["records"][0]["activity_tier"], "Extreme");
    assert_eq!(json["imbalances"][0]["bias"], "NEUTRAL");
}
