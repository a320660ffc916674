use {
    crate::{
        config::AnalysisConfig,
        engine::snapshot::{SnapshotOptions, build_market_snapshot_with},
        models::{MarketSnapshot, PriceSeries, RawBar, SnapshotError},
    },
    rayon::prelude::*,
};

/// One asset to analyse.
#[derive(Debug, Clone)]
pub struct AssetInput {
    pub symbol: String,
    pub bars: Vec<RawBar>,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub symbol: String,
    pub result: Result<MarketSnapshot, SnapshotError>,
}

/// Builds one snapshot per asset in parallel. Failures stay local to their asset;
/// output order follows input order.
pub fn build_snapshots(inputs: Vec<AssetInput>, config: &AnalysisConfig) -> Vec<BatchOutcome> {
    build_snapshots_with(inputs, config, &[])
}

/// Same as [`build_snapshots`], correlating every asset against the same benchmarks.
pub fn build_snapshots_with(
    inputs: Vec<AssetInput>,
    config: &AnalysisConfig,
    benchmarks: &[(String, PriceSeries)],
) -> Vec<BatchOutcome> {
    crate::trace_time!("Batch Snapshots", 500_000, {
        inputs
            .into_par_iter()
            .map(|input| {
                let options = SnapshotOptions {
                    symbol: Some(input.symbol.clone()),
                    benchmarks: benchmarks.to_vec(),
                };
                BatchOutcome {
                    result: build_market_snapshot_with(input.bars, config, &options),
                    symbol: input.symbol,
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    #[test]
    fn failures_are_reported_per_asset() {
        let good: Vec<RawBar> = (1..=28)
            .map(|d| RawBar::new(format!("2024-02-{:02}", d), 10.0, 11.0, 9.0, 10.0 + d as f64 * 0.1, 5.0))
            .collect();
        let inputs = vec![
            AssetInput {
                symbol: "GOOD".into(),
                bars: good,
            },
            AssetInput {
                symbol: "EMPTY".into(),
                bars: vec![],
            },
        ];

        let out = build_snapshots(inputs, &ANALYSIS);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol, "GOOD");
        assert!(out[0].result.is_ok());
        assert!(matches!(out[1].result, Err(SnapshotError::EmptySeries)));
    }
}
