//! Cross-asset analytics: momentum ranking and return correlation.

use {
    crate::{
        models::{MomentumScore, PriceSeries},
        utils::{paired_pct_returns, pearson_correlation},
    },
    std::collections::{BTreeMap, HashMap},
};

pub const MOMENTUM_WINDOWS: [usize; 3] = [21, 63, 126];

/// Return of the latest close against the close `window` bars back (counting the latest bar).
pub fn trailing_return(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let latest = *closes.last()?;
    let base = closes[closes.len() - window];
    let r = latest / base - 1.0;
    r.is_finite().then_some(r)
}

pub fn momentum_score(symbol: &str, series: &PriceSeries, windows: &[usize]) -> Option<MomentumScore> {
    let last_close = series.latest_close()?;
    let returns: Vec<(usize, Option<f64>)> = windows
        .iter()
        .map(|&w| (w, trailing_return(&series.close_prices, w)))
        .collect();

    let available: Vec<f64> = returns.iter().filter_map(|(_, r)| *r).collect();
    let score = (!available.is_empty()).then(|| available.iter().sum::<f64>() / available.len() as f64);

    Some(MomentumScore {
        symbol: symbol.to_string(),
        last_close,
        returns,
        score,
    })
}

/// Ranks assets by score, best first. Assets without any score go last; empty series are skipped.
pub fn rank_momentum(assets: &BTreeMap<String, PriceSeries>, windows: &[usize]) -> Vec<MomentumScore> {
    let mut ranking: Vec<MomentumScore> = assets
        .iter()
        .filter_map(|(symbol, series)| momentum_score(symbol, series, windows))
        .collect();

    ranking.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    ranking
}

/// Pearson correlation of daily returns over the dates both series share.
pub fn return_correlation(asset: &PriceSeries, benchmark: &PriceSeries) -> Option<f64> {
    let bench_by_date: HashMap<_, _> = benchmark
        .dates
        .iter()
        .zip(&benchmark.close_prices)
        .map(|(d, c)| (*d, *c))
        .collect();

    let aligned: Vec<(f64, f64)> = asset
        .dates
        .iter()
        .zip(&asset.close_prices)
        .filter_map(|(d, &c)| bench_by_date.get(d).map(|&bc| (c, bc)))
        .collect();

    let (a, b) = paired_pct_returns(&aligned);
    pearson_correlation(&a, &b)
}
