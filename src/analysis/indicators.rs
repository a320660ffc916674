//! Primitive indicator library. Every function returns one value per input sample,
//! `None` while its window is not yet full.

use {
    crate::{
        config::VolRatio,
        models::{IndicatorColumn, IndicatorRow, IndicatorTable, PriceSeries},
    },
    chrono::{Days, NaiveDate},
};

pub const RSI_WINDOW: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_WINDOW: usize = 21;
pub const BOLLINGER_STD: f64 = 2.0;
pub const ATR_WINDOW: usize = 14;
pub const STOCH_WINDOW: usize = 14;
pub const STOCH_SMOOTH: usize = 3;
pub const VOLUME_WINDOW: usize = 20;
pub const YEAR_DAYS: u64 = 364;

pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut rolling_sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        rolling_sum += v;
        if i >= window {
            rolling_sum -= values[i - window];
        }
        if i + 1 >= window {
            let mean = rolling_sum / window as f64;
            out[i] = mean.is_finite().then_some(mean);
        }
    }
    out
}

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return prev;
            }
            let next = match prev {
                Some(p) => p + alpha * (v - p),
                None => v,
            };
            prev = Some(next);
            prev
        })
        .collect()
}

/// Same as [`ema`] over a sparse input; gaps before the first value stay `None`.
fn ema_sparse(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let dense: Vec<f64> = values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let mut out = ema(&dense, span);
    for (o, v) in out.iter_mut().zip(values) {
        if v.is_none() {
            *o = None;
        }
    }
    out
}

/// RSI from rolling-mean gains and losses. 50 while undefined: no full window yet,
/// or no losses inside the window.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else if delta < 0.0 {
            losses[i] = -delta;
        }
    }

    // First sample has no delta
    let avg_gain = sma(&gains[1.min(n)..], window);
    let avg_loss = sma(&losses[1.min(n)..], window);

    let mut out = vec![Some(50.0); n];
    for i in 1..n {
        if let (Some(g), Some(l)) = (avg_gain[i - 1], avg_loss[i - 1]) {
            out[i] = Some(if l > f64::EPSILON { 100.0 - 100.0 / (1.0 + g / l) } else { 50.0 });
        }
    }
    out
}

pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_sparse(&line, signal_span);
    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

pub struct Bollinger {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bands at `num_std` sample standard deviations around the SMA.
pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> Bollinger {
    let middle = sma(closes, window);
    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if window >= 2 {
        for i in (window - 1)..n {
            let Some(mean) = middle[i] else { continue };
            let slice = &closes[i + 1 - window..=i];
            let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            let sd = var.sqrt();
            upper[i] = Some(mean + num_std * sd);
            lower[i] = Some(mean - num_std * sd);
        }
    }

    Bollinger {
        middle,
        upper,
        lower,
    }
}

/// Rolling mean of the true range.
pub fn atr(series: &PriceSeries, window: usize) -> Vec<Option<f64>> {
    let true_ranges: Vec<f64> = series
        .bars()
        .enumerate()
        .map(|(i, bar)| bar.true_range(i.checked_sub(1).map(|p| series.close_prices[p])))
        .collect();
    sma(&true_ranges, window)
}

pub struct Stochastic {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

pub fn stochastic(series: &PriceSeries, window: usize, smooth: usize) -> Stochastic {
    let n = series.len();
    let mut k = vec![None; n];

    if window > 0 {
        for i in (window.saturating_sub(1))..n {
            let lo = series.low_prices[i + 1 - window..=i]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let hi = series.high_prices[i + 1 - window..=i]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            if hi - lo > f64::EPSILON {
                k[i] = Some((series.close_prices[i] - lo) / (hi - lo) * 100.0);
            }
        }
    }

    let mut d = vec![None; n];
    if smooth > 0 {
        for i in (smooth.saturating_sub(1))..n {
            let slice = &k[i + 1 - smooth..=i];
            if slice.iter().all(|v| v.is_some()) {
                d[i] = Some(slice.iter().flatten().sum::<f64>() / smooth as f64);
            }
        }
    }

    Stochastic { k, d }
}

/// Signed cumulative volume. The first bar and non-rising bars subtract.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| {
            let rising = i > 0 && c > closes[i - 1];
            total += if rising { v } else { -v };
            Some(total)
        })
        .collect()
}

/// Volume over its trailing average (partial windows at the start).
pub fn volume_ratio(volumes: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut rolling_sum = 0.0;

    volumes
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            rolling_sum += v;
            if i >= window {
                rolling_sum -= volumes[i - window];
            }
            let count = (i + 1).min(window) as f64;
            Some(VolRatio::calculate(v, rolling_sum / count).value())
        })
        .collect()
}

/// Trailing one-year lowest low and highest high (calendar window, partial at the start).
pub fn rolling_year_extremes(series: &PriceSeries) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut mins = Vec::with_capacity(series.len());
    let mut maxs = Vec::with_capacity(series.len());
    let mut start = 0;

    for (i, date) in series.dates.iter().enumerate() {
        let cutoff = date.checked_sub_days(Days::new(YEAR_DAYS)).unwrap_or(NaiveDate::MIN);
        while series.dates[start] <= cutoff {
            start += 1;
        }
        let lo = series.low_prices[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
        let hi = series.high_prices[start..=i]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        mins.push(lo.is_finite().then_some(lo));
        maxs.push(hi.is_finite().then_some(hi));
    }
    (mins, maxs)
}

fn fill(table: &mut IndicatorTable, column: IndicatorColumn, compute: impl FnOnce() -> Vec<Option<f64>>) {
    if !table.is_complete(column) {
        table.set_column(column, &compute());
    }
}

/// Builds the full indicator table. Pre-joined columns are kept when complete,
/// every other column is computed here.
pub fn enrich(series: &PriceSeries, pre_joined: Vec<IndicatorRow>) -> IndicatorTable {
    let rows = if pre_joined.len() == series.len() {
        pre_joined
    } else {
        vec![IndicatorRow::default(); series.len()]
    };
    let mut table = IndicatorTable::new(series.dates.clone(), rows);
    let closes = &series.close_prices;

    fill(&mut table, IndicatorColumn::Sma9, || sma(closes, 9));
    fill(&mut table, IndicatorColumn::Sma21, || sma(closes, 21));
    fill(&mut table, IndicatorColumn::Sma72, || sma(closes, 72));
    fill(&mut table, IndicatorColumn::Sma200, || sma(closes, 200));
    fill(&mut table, IndicatorColumn::Ema9, || ema(closes, 9));
    fill(&mut table, IndicatorColumn::Ema21, || ema(closes, 21));
    fill(&mut table, IndicatorColumn::Ema72, || ema(closes, 72));
    fill(&mut table, IndicatorColumn::Rsi14, || rsi(closes, RSI_WINDOW));

    let m = macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    fill(&mut table, IndicatorColumn::Macd, || m.line);
    fill(&mut table, IndicatorColumn::MacdSignal, || m.signal);
    fill(&mut table, IndicatorColumn::MacdHist, || m.histogram);

    let bb = bollinger(closes, BOLLINGER_WINDOW, BOLLINGER_STD);
    fill(&mut table, IndicatorColumn::BbMiddle, || bb.middle);
    fill(&mut table, IndicatorColumn::BbUpper, || bb.upper);
    fill(&mut table, IndicatorColumn::BbLower, || bb.lower);

    fill(&mut table, IndicatorColumn::Atr14, || atr(series, ATR_WINDOW));

    let st = stochastic(series, STOCH_WINDOW, STOCH_SMOOTH);
    fill(&mut table, IndicatorColumn::StochK, || st.k);
    fill(&mut table, IndicatorColumn::StochD, || st.d);

    fill(&mut table, IndicatorColumn::Obv, || obv(closes, &series.volumes));
    fill(&mut table, IndicatorColumn::VolumeRatio, || {
        volume_ratio(&series.volumes, VOLUME_WINDOW)
    });

    let (min_52w, max_52w) = rolling_year_extremes(series);
    fill(&mut table, IndicatorColumn::Min52w, || min_52w);
    fill(&mut table, IndicatorColumn::Max52w, || max_52w);

    table
}
