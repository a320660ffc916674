use {
    crate::{
        analysis::indicators::ema,
        config::{DF, TrendConfig},
        domain::Timeframe,
        models::{MaStack, PriceSeries, TrendDirection, TrendSnapshot},
        utils::linear_regression_slope,
    },
    std::collections::BTreeMap,
};

/// Regression slope over the last `span` defined values.
fn trailing_slope(values: &[Option<f64>], span: usize) -> f64 {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    let start = defined.len().saturating_sub(span);
    linear_regression_slope(&defined[start..])
}

fn direction_from_slopes(slopes: [f64; 3]) -> TrendDirection {
    if slopes.iter().all(|s| *s > 0.0) {
        TrendDirection::Uptrend
    } else if slopes.iter().all(|s| *s < 0.0) {
        TrendDirection::Downtrend
    } else {
        TrendDirection::Sideways
    }
}

fn stack_from_latest(short: Option<f64>, medium: Option<f64>, long: Option<f64>) -> MaStack {
    match (short, medium, long) {
        (Some(s), Some(m), Some(l)) if s > m && m > l => MaStack::BullishStack,
        (Some(s), Some(m), Some(l)) if s < m && m < l => MaStack::BearishStack,
        _ => MaStack::Mixed,
    }
}

/// Direction from the slopes of three EMAs, stacking from their latest values.
pub fn trend_strength(closes: &[f64], config: &TrendConfig, timeframe: Timeframe) -> TrendSnapshot {
    let short = ema(closes, config.short_span);
    let medium = ema(closes, config.medium_span);
    let long = ema(closes, config.long_span);

    let slope_short = trailing_slope(&short, config.short_span);
    let slope_medium = trailing_slope(&medium, config.medium_span);
    let slope_long = trailing_slope(&long, config.long_span);

    let ma_short = short.last().copied().flatten();
    let ma_medium = medium.last().copied().flatten();
    let ma_long = long.last().copied().flatten();

    let snapshot = TrendSnapshot {
        timeframe,
        direction: direction_from_slopes([slope_short, slope_medium, slope_long]),
        slope_short,
        slope_medium,
        slope_long,
        stack: stack_from_latest(ma_short, ma_medium, ma_long),
        ma_short,
        ma_medium,
        ma_long,
    };

    if DF.log_trend {
        log::info!(
            "Trend [{}]: {} / {} (slopes {:.4} {:.4} {:.4})",
            timeframe,
            snapshot.direction,
            snapshot.stack,
            slope_short,
            slope_medium,
            slope_long
        );
    }
    snapshot
}

/// Trend per configured timeframe. Resampled timeframes shorter than the longest span are left out.
pub fn trend_by_timeframe(series: &PriceSeries, config: &TrendConfig) -> BTreeMap<Timeframe, TrendSnapshot> {
    config
        .timeframes
        .iter()
        .filter_map(|&timeframe| {
            let resampled = series.resample(timeframe);
            if timeframe != Timeframe::Daily && resampled.len() < config.longest_span() {
                return None;
            }
            Some((timeframe, trend_strength(&resampled.close_prices, config, timeframe)))
        })
        .collect()
}
