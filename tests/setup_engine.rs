use {
    anyhow::{Result, bail},
    chrono::{Days, NaiveDate},
    market_snapshot::{
        ANALYSIS, MarketSnapshot, RawBar, SetupEngine, build_market_snapshot,
        config::SetupConfig,
        engine::{RsiRebound, SetupRule, TrendFollowing, evaluate_setups},
        models::SetupResult,
    },
};

fn rising_bars(n: usize) -> Vec<RawBar> {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
    (0..n)
        .map(|i| {
            let c = 100.0 + i as f64;
            let date = start + Days::new(i as u64);
            RawBar::new(date.format("%Y-%m-%d").to_string(), c, c, c, c, 1_000.0)
        })
        .collect()
}

fn find<'a>(results: &'a [SetupResult], name: &str) -> &'a SetupResult {
    results
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no result named {name}: {results:?}"))
}

struct BrokenRule;

impl SetupRule for BrokenRule {
    fn id(&self) -> &str {
        "broken_rule"
    }

    fn evaluate(&self, _snapshot: &MarketSnapshot, _config: &SetupConfig) -> Result<Vec<SetupResult>> {
        bail!("indicator feed exploded")
    }
}

#[test]
fn failing_rule_does_not_block_the_others() {
    let snapshot = build_market_snapshot(rising_bars(150), &ANALYSIS).unwrap();
    let engine = SetupEngine::empty(ANALYSIS.setups)
        .with_rule(TrendFollowing)
        .with_rule(BrokenRule)
        .with_rule(RsiRebound);

    assert_eq!(engine.rule_ids(), vec!["trend_following", "broken_rule", "rsi_rebound"]);

    let results = engine.evaluate(&snapshot);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].name, "Trend Following");
    assert_eq!(results[1].name, "broken_rule");
    assert!(!results[1].active);
    assert!(results[1].details.contains("indicator feed exploded"));
    assert_eq!(results[2].name, "RSI Rebound");
}

#[test]
fn misaligned_indicators_fail_every_standard_rule() {
    let mut snapshot = build_market_snapshot(rising_bars(150), &ANALYSIS).unwrap();
    snapshot.indicators.rows.pop();
    snapshot.indicators.dates.pop();

    let results = SetupEngine::default().evaluate(&snapshot);
    assert_eq!(results.len(), 4);
    for r in &results {
        assert!(!r.active);
        assert!(r.details.contains("indicator table has 149 rows"), "{r:?}");
    }
}

#[test]
fn trend_following_fires_on_a_clean_uptrend() {
    let snapshot = build_market_snapshot(rising_bars(300), &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);

    let trend = find(&results, "Trend Following");
    assert!(trend.active, "{}", trend.details);
}

#[test]
fn trend_following_waits_when_volume_is_thin() {
    let mut bars = rising_bars(300);
    if let Some(last) = bars.last_mut() {
        last.volume = Some(100.0);
    }
    let snapshot = build_market_snapshot(bars, &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);

    let trend = find(&results, "Trend Following");
    assert!(!trend.active);
    assert!(trend.details.contains("volume"));
}

fn with_rsi(tail: &[f64]) -> Vec<RawBar> {
    let mut bars = rising_bars(150);
    let n = bars.len();
    for (i, bar) in bars.iter_mut().enumerate() {
        let from_end = n - 1 - i;
        bar.indicators.rsi_14 = Some(if from_end < tail.len() {
            tail[tail.len() - 1 - from_end]
        } else {
            50.0
        });
    }
    bars
}

#[test]
fn rsi_rebound_needs_cross_and_band() {
    let snapshot = build_market_snapshot(with_rsi(&[25.0, 28.0, 35.0]), &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);
    assert!(find(&results, "RSI Rebound").active);

    // Crossed, but already above the rebound ceiling.
    let snapshot = build_market_snapshot(with_rsi(&[25.0, 28.0, 50.0]), &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);
    let rebound = find(&results, "RSI Rebound");
    assert!(!rebound.active);
    assert!(rebound.details.contains("rebound band"));

    // In the band, but never oversold.
    let snapshot = build_market_snapshot(with_rsi(&[40.0, 38.0, 41.0]), &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);
    assert!(!find(&results, "RSI Rebound").active);
}

#[test]
fn ema_cross_is_reported_only_on_the_crossing_bar() {
    let mut bars = rising_bars(150);
    let n = bars.len();
    for (i, bar) in bars.iter_mut().enumerate() {
        bar.indicators.ema_9 = Some(if i == n - 1 { 12.0 } else { 10.0 });
        bar.indicators.ema_21 = Some(11.0);
    }
    let snapshot = build_market_snapshot(bars, &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);

    let buy = find(&results, "EMA Cross (9 x 21) buy");
    assert!(buy.active, "{}", buy.details);
    assert!(results.iter().all(|r| !r.name.ends_with("sell")));

    // Without the cross there is nothing to report for that pair.
    let snapshot = build_market_snapshot(rising_bars(150), &ANALYSIS).unwrap();
    let results = evaluate_setups(&snapshot, &ANALYSIS.setups);
    assert!(results.iter().all(|r| !r.name.starts_with("EMA Cross")));
}
