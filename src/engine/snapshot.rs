use crate::{
    analysis::{
        breakout_signals, compute_fibonacci, consolidate_levels, detect_all_divergences, enrich,
        return_correlation, trend_by_timeframe, trend_strength,
    },
    config::AnalysisConfig,
    domain::Timeframe,
    models::{IndicatorRow, MacroContext, MarketSnapshot, PriceSeries, RawBar, SnapshotError},
};

/// Optional extras attached to a snapshot at build time.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub symbol: Option<String>,
    /// Benchmarks (name, daily series) correlated against the asset.
    pub benchmarks: Vec<(String, PriceSeries)>,
}

impl SnapshotOptions {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Default::default()
        }
    }
}

/// Validates raw rows and builds the snapshot for the latest bar.
pub fn build_market_snapshot(raw: Vec<RawBar>, config: &AnalysisConfig) -> Result<MarketSnapshot, SnapshotError> {
    build_market_snapshot_with(raw, config, &SnapshotOptions::default())
}

pub fn build_market_snapshot_with(
    raw: Vec<RawBar>,
    config: &AnalysisConfig,
    options: &SnapshotOptions,
) -> Result<MarketSnapshot, SnapshotError> {
    let label = options.symbol.as_deref().unwrap_or("<unnamed>");
    log::debug!("Building snapshot for {} ({} rows)", label, raw.len());

    let (series, pre_joined) = PriceSeries::from_raw(raw).inspect_err(|e| {
        log::warn!("Rejected input for {}: {}", label, e);
    })?;

    assemble(series, pre_joined, config, options)
}

/// Runs every detector over an already validated series.
pub fn assemble(
    series: PriceSeries,
    pre_joined: Vec<IndicatorRow>,
    config: &AnalysisConfig,
    options: &SnapshotOptions,
) -> Result<MarketSnapshot, SnapshotError> {
    let (Some(latest_price), Some(latest_date)) = (series.latest_close(), series.latest_date()) else {
        return Err(SnapshotError::EmptySeries);
    };

    let snapshot = crate::trace_time!("Build Snapshot", 20_000, {
        // 1. Indicators (pre-joined columns win when complete)
        let indicators = enrich(&series, pre_joined);

        // 2. Levels, swing, trend
        let levels = consolidate_levels(&series, &config.levels);
        let fibonacci = compute_fibonacci(&series, &config.fibonacci);
        let mut trend_map = trend_by_timeframe(&series, &config.trend);
        let trend = trend_map
            .entry(Timeframe::Daily)
            .or_insert_with(|| trend_strength(&series.close_prices, &config.trend, Timeframe::Daily))
            .clone();

        // 3. Signals built on top
        let breakouts = breakout_signals(&series, &levels, &config.breakout);
        let divergences = detect_all_divergences(&series, &indicators, &config.divergence);

        let macro_context = (!options.benchmarks.is_empty()).then(|| {
            options
                .benchmarks
                .iter()
                .filter_map(|(name, bench)| Some((name.clone(), return_correlation(&series, bench)?)))
                .fold(MacroContext::default(), |ctx, (name, rho)| ctx.with(name, rho))
        });

        MarketSnapshot {
            symbol: options.symbol.clone(),
            latest_date,
            latest_price,
            levels,
            fibonacci,
            trend,
            trend_by_timeframe: trend_map,
            breakouts,
            divergences,
            series,
            indicators,
            macro_context,
        }
    });

    log::debug!(
        "Snapshot {} @ {}: {} supports, {} resistances, {} divergences, {} breakout signals",
        snapshot.symbol.as_deref().unwrap_or("<unnamed>"),
        snapshot.latest_date,
        snapshot.levels.supports.len(),
        snapshot.levels.resistances.len(),
        snapshot.divergences.len(),
        snapshot.breakouts.len()
    );

    let undefined = snapshot.indicators.missing_columns();
    if !undefined.is_empty() {
        log::debug!(
            "Not enough history for: {}",
            undefined.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
        );
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    fn raw_series(n: usize) -> Vec<RawBar> {
        let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let c = 50.0 + (i as f64 / 5.0).sin() * 5.0 + i as f64 * 0.05;
                let date = start + chrono::Days::new(i as u64);
                RawBar::new(date.format("%Y-%m-%d").to_string(), c, c + 0.5, c - 0.5, c, 1_000.0)
            })
            .collect()
    }

    #[test]
    fn validation_errors_surface() {
        let err = build_market_snapshot(vec![], &ANALYSIS).unwrap_err();
        assert_eq!(err, SnapshotError::EmptySeries);
    }

    #[test]
    fn snapshot_covers_every_component() {
        let snap = build_market_snapshot_with(raw_series(260), &ANALYSIS, &SnapshotOptions::for_symbol("TEST")).unwrap();

        assert_eq!(snap.symbol.as_deref(), Some("TEST"));
        assert_eq!(snap.indicators.len(), 260);
        assert_eq!(snap.series.len(), 260);
        assert!(snap.trend_by_timeframe.contains_key(&Timeframe::Daily));
        assert_eq!(snap.trend, snap.trend_by_timeframe[&Timeframe::Daily]);
        assert!(snap.fibonacci.is_some());
        assert!(!snap.levels.supports.is_empty());
        assert!(snap.macro_context.is_none());
    }

    #[test]
    fn benchmarks_become_macro_context() {
        let bench = PriceSeries::from_raw(raw_series(260)).unwrap().0;
        let options = SnapshotOptions {
            symbol: None,
            benchmarks: vec![("SELF".to_string(), bench)],
        };
        let snap = build_market_snapshot_with(raw_series(260), &ANALYSIS, &options).unwrap();
        let rho = snap.macro_context.unwrap().correlations["SELF"];
        approx::assert_abs_diff_eq!(rho, 1.0, epsilon = 1e-9);
    }
}
