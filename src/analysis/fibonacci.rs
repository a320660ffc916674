use {
    crate::{
        analysis::extrema::{Pivot, local_maxima, local_minima},
        config::{DF, FibonacciConfig, HighPrice, LowPrice, Price},
        models::{FibLevel, FibonacciLevels, PriceSeries},
        utils::{get_max, get_min},
    },
    std::collections::BTreeMap,
};

pub const RETRACEMENT_RATIOS: [(f64, &str); 7] = [
    (0.0, "0.0%"),
    (0.236, "23.6%"),
    (0.382, "38.2%"),
    (0.5, "50.0%"),
    (0.618, "61.8%"),
    (0.786, "78.6%"),
    (1.0, "100.0%"),
];

pub const EXTENSION_RATIOS: [(f64, &str); 3] = [(1.272, "127.2%"), (1.618, "161.8%"), (2.0, "200.0%")];

#[derive(Debug, Clone, Copy, PartialEq)]
enum PivotKind {
    High,
    Low,
}

/// Union of pivot positions found at several orders, keyed by position.
fn multi_scale(series: &[f64], orders: [usize; 2], detect: fn(&[f64], usize) -> Vec<Pivot>) -> BTreeMap<usize, f64> {
    orders
        .into_iter()
        .flat_map(|order| detect(series, order))
        .collect()
}

/// Resolves the (anchor, opposite) pair from the most recent pivots.
fn recent_swing(highs: &BTreeMap<usize, f64>, lows: &BTreeMap<usize, f64>) -> Option<(Pivot, Pivot)> {
    let last_high = highs.iter().next_back().map(|(&i, &v)| (i, v));
    let last_low = lows.iter().next_back().map(|(&i, &v)| (i, v));

    let (anchor, anchor_kind) = match (last_high, last_low) {
        (Some(h), Some(l)) if l.0 > h.0 => (l, PivotKind::Low),
        (Some(h), _) => (h, PivotKind::High),
        (None, Some(l)) => (l, PivotKind::Low),
        (None, None) => return None,
    };

    let opposite_pool = match anchor_kind {
        PivotKind::High => lows,
        PivotKind::Low => highs,
    };
    let opposite = opposite_pool
        .range(..anchor.0)
        .next_back()
        .map(|(&i, &v)| (i, v))?;

    Some((anchor, opposite))
}

fn build_levels(high: f64, low: f64) -> (Vec<FibLevel>, Vec<FibLevel>) {
    let diff = high - low;

    let retracements = RETRACEMENT_RATIOS
        .iter()
        .map(|&(ratio, label)| {
            let price = if ratio == 0.0 {
                high
            } else if ratio == 1.0 {
                low
            } else {
                high - diff * ratio
            };
            FibLevel {
                label: label.to_string(),
                ratio,
                price: Price::new(price),
            }
        })
        .collect();

    let extensions = EXTENSION_RATIOS
        .iter()
        .map(|&(ratio, label)| FibLevel {
            label: label.to_string(),
            ratio,
            price: Price::new(high + diff * (ratio - 1.0)),
        })
        .collect();

    (retracements, extensions)
}

/// Retracement/extension levels of the most recent significant swing inside the lookback window.
/// Falls back to the window's global high/low when no pivot pair exists.
pub fn compute_fibonacci(series: &PriceSeries, config: &FibonacciConfig) -> Option<FibonacciLevels> {
    let window = series.tail(config.lookback);
    let orders = [config.short_order, config.long_order];

    let highs = multi_scale(&window.high_prices, orders, local_maxima);
    let lows = multi_scale(&window.low_prices, orders, local_minima);

    let (a, b) = match recent_swing(&highs, &lows) {
        Some(pair) => pair,
        None => (
            get_max(&window.high_prices)?,
            get_min(&window.low_prices)?,
        ),
    };

    // High/low by value, whatever the chronology
    let (high, low) = if a.1 >= b.1 { (a, b) } else { (b, a) };
    let (retracements, extensions) = build_levels(high.1, low.1);

    if DF.log_fibonacci {
        log::info!(
            "Fibonacci swing: high {:.4} @ {} / low {:.4} @ {}",
            high.1,
            window.dates[high.0],
            low.1,
            window.dates[low.0]
        );
    }

    Some(FibonacciLevels {
        base_high: HighPrice::new(high.1),
        base_low: LowPrice::new(low.1),
        high_date: window.dates[high.0],
        low_date: window.dates[low.0],
        retracements,
        extensions,
    })
}
