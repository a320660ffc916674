use {
    crate::{
        analysis::extrema::{Pivot, local_maxima, local_minima},
        config::{DF, DivergenceConfig, Price},
        models::{DivergenceIndicator, DivergenceKind, DivergenceSignal, IndicatorTable, PriceSeries},
    },
    chrono::{Days, NaiveDate},
    itertools::Itertools,
    strum::IntoEnumIterator,
};

fn scan_pairs(
    pivots: &[Pivot],
    kind: DivergenceKind,
    indicator: DivergenceIndicator,
    series: &PriceSeries,
    table: &IndicatorTable,
    config: &DivergenceConfig,
) -> Vec<DivergenceSignal> {
    let column = indicator.column();

    pivots
        .iter()
        .tuple_windows()
        .filter(|(a, b)| b.0 - a.0 >= config.min_distance)
        .filter_map(|(&(i1, p1), &(i2, p2))| {
            let ind1 = table.value_at(column, i1)?;
            let ind2 = table.value_at(column, i2)?;

            let diverges = match kind {
                DivergenceKind::Bullish => p2 < p1 && ind2 > ind1,
                DivergenceKind::Bearish => p2 > p1 && ind2 < ind1,
            };

            diverges.then(|| DivergenceSignal {
                kind,
                indicator,
                date: series.dates[i2],
                price: Price::new(p2),
                indicator_value: ind2,
                previous_date: series.dates[i1],
            })
        })
        .collect()
}

/// Divergences between closing price and one indicator column.
pub fn detect_divergences(
    series: &PriceSeries,
    table: &IndicatorTable,
    indicator: DivergenceIndicator,
    config: &DivergenceConfig,
) -> Vec<DivergenceSignal> {
    let lows = local_minima(&series.close_prices, config.order);
    let highs = local_maxima(&series.close_prices, config.order);

    let mut signals = scan_pairs(&lows, DivergenceKind::Bullish, indicator, series, table, config);
    signals.extend(scan_pairs(&highs, DivergenceKind::Bearish, indicator, series, table, config));
    signals.sort_by_key(|s| s.date);
    signals
}

/// Runs every supported indicator and merges the results into one chronological list.
pub fn detect_all_divergences(
    series: &PriceSeries,
    table: &IndicatorTable,
    config: &DivergenceConfig,
) -> Vec<DivergenceSignal> {
    let mut all: Vec<DivergenceSignal> = DivergenceIndicator::iter()
        .flat_map(|indicator| detect_divergences(series, table, indicator, config))
        .collect();
    all.sort_by_key(|s| s.date);

    if DF.log_divergences {
        for s in &all {
            log::info!("Divergence {} on {} at {} (price {})", s.kind, s.indicator, s.date, s.price);
        }
    }
    all
}

/// Signals dated within `recency_days` calendar days of `latest`.
pub fn recent_divergences(
    signals: &[DivergenceSignal],
    latest: NaiveDate,
    recency_days: i64,
) -> Vec<&DivergenceSignal> {
    let cutoff = latest
        .checked_sub_days(Days::new(recency_days.max(0) as u64))
        .unwrap_or(NaiveDate::MIN);
    signals.iter().filter(|s| s.date >= cutoff).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ANALYSIS,
        domain::Bar,
        models::{IndicatorColumn, IndicatorRow},
    };

    fn fixture(closes: &[f64], indicator: &[f64], column: IndicatorColumn) -> (PriceSeries, IndicatorTable) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Days::new(i as u64), c, c, c, c, 1.0))
            .collect();
        let series = PriceSeries::from_bars(bars);
        let mut table = IndicatorTable::new(series.dates.clone(), vec![IndicatorRow::default(); closes.len()]);
        let values: Vec<Option<f64>> = indicator.iter().map(|&v| Some(v)).collect();
        table.set_column(column, &values);
        (series, table)
    }

    /// Two troughs 20 bars apart, the second lower; the indicator makes a higher low.
    fn double_bottom() -> (Vec<f64>, Vec<f64>) {
        let mut price = Vec::new();
        let mut ind = Vec::new();
        for i in 0..50 {
            let d1 = (i as f64 - 15.0).abs();
            let d2 = (i as f64 - 35.0).abs();
            price.push(if i < 25 { 90.0 + d1 } else { 85.0 + d2 });
            ind.push(if i < 25 { 20.0 + d1 } else { 30.0 + d2 });
        }
        (price, ind)
    }

    #[test]
    fn lower_low_with_higher_indicator_low_is_bullish() {
        let (price, ind) = double_bottom();
        let (series, table) = fixture(&price, &ind, IndicatorColumn::Rsi14);
        let signals = detect_divergences(&series, &table, DivergenceIndicator::Rsi, &ANALYSIS.divergence);

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].kind, DivergenceKind::Bullish);
        assert_eq!(signals[0].date, series.dates[35]);
        assert_eq!(signals[0].previous_date, series.dates[15]);
    }

    #[test]
    fn mirrored_series_is_bearish_not_bullish() {
        let (price, ind) = double_bottom();
        let price: Vec<f64> = price.iter().map(|p| 200.0 - p).collect();
        let ind: Vec<f64> = ind.iter().map(|v| 100.0 - v).collect();
        let (series, table) = fixture(&price, &ind, IndicatorColumn::Obv);
        let signals = detect_divergences(&series, &table, DivergenceIndicator::Obv, &ANALYSIS.divergence);

        assert!(signals.iter().all(|s| s.kind == DivergenceKind::Bearish));
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn reversed_series_does_not_flip_to_bearish() {
        let (mut price, mut ind) = double_bottom();
        price.reverse();
        ind.reverse();
        let (series, table) = fixture(&price, &ind, IndicatorColumn::Rsi14);
        let signals = detect_divergences(&series, &table, DivergenceIndicator::Rsi, &ANALYSIS.divergence);
        assert!(signals.iter().all(|s| s.kind != DivergenceKind::Bearish));
    }

    #[test]
    fn missing_indicator_values_are_skipped() {
        let (price, _) = double_bottom();
        let (series, table) = fixture(&price, &[], IndicatorColumn::Rsi14);
        assert!(detect_all_divergences(&series, &table, &ANALYSIS.divergence).is_empty());
    }

    #[test]
    fn recency_filter_uses_calendar_days() {
        let (price, ind) = double_bottom();
        let (series, table) = fixture(&price, &ind, IndicatorColumn::Rsi14);
        let signals = detect_all_divergences(&series, &table, &ANALYSIS.divergence);
        let latest = series.latest_date().unwrap();

        // Latest bar is 14 days after the second trough
        assert_eq!(recent_divergences(&signals, latest, 15).len(), 1);
        assert!(recent_divergences(&signals, latest, 10).is_empty());
    }
}
