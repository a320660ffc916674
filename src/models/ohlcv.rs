use {
    crate::{
        config::{HighPrice, LowPrice, Price},
        domain::{Bar, Timeframe},
        models::{IndicatorRow, SnapshotError},
        utils::{format_date, get_max, get_min, parse_date},
    },
    chrono::NaiveDate,
    itertools::Itertools,
    serde::{Deserialize, Serialize},
};

/// One unvalidated input row, as read from JSON.
/// Optional indicator columns computed upstream ride along flattened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(alias = "Date")]
    pub date: String,
    #[serde(alias = "Open", default)]
    pub open: Option<f64>,
    #[serde(alias = "High", default)]
    pub high: Option<f64>,
    #[serde(alias = "Low", default)]
    pub low: Option<f64>,
    #[serde(alias = "Close", default)]
    pub close: Option<f64>,
    #[serde(alias = "Volume", default)]
    pub volume: Option<f64>,

    #[serde(flatten)]
    pub indicators: IndicatorRow,
}

impl RawBar {
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: date.into(),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            indicators: IndicatorRow::default(),
        }
    }

    fn validate(&self, row: usize) -> Result<Bar, SnapshotError> {
        let date = parse_date(&self.date).ok_or_else(|| SnapshotError::UnparseableDate {
            value: self.date.clone(),
            row,
        })?;

        let field = |column: &'static str, value: Option<f64>| -> Result<f64, SnapshotError> {
            let v = value.ok_or(SnapshotError::MissingColumn { column, row })?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(SnapshotError::NonFiniteValue { column, row })
            }
        };

        Ok(Bar::new(
            date,
            field("Open", self.open)?,
            field("High", self.high)?,
            field("Low", self.low)?,
            field("Close", self.close)?,
            field("Volume", self.volume)?,
        ))
    }
}

/// Column-oriented daily OHLCV, sorted ascending by date with unique dates.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PriceSeries {
    pub dates: Vec<NaiveDate>,
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    /// Validates raw rows, sorts them by date and rejects duplicates.
    /// Returns the series plus the pre-joined indicator rows, aligned with it.
    pub fn from_raw(raw: Vec<RawBar>) -> Result<(Self, Vec<IndicatorRow>), SnapshotError> {
        if raw.is_empty() {
            return Err(SnapshotError::EmptySeries);
        }

        let mut rows = raw
            .iter()
            .enumerate()
            .map(|(row, r)| r.validate(row).map(|bar| (bar, r.indicators)))
            .collect::<Result<Vec<_>, _>>()?;

        rows.sort_by_key(|(bar, _)| bar.date);

        if let Some(((dup, _), _)) = rows.iter().tuple_windows().find(|((a, _), (b, _))| a.date == b.date) {
            return Err(SnapshotError::DuplicateDate {
                date: format_date(dup.date),
            });
        }

        let (bars, indicators): (Vec<Bar>, Vec<IndicatorRow>) = rows.into_iter().unzip();
        Ok((Self::from_bars(bars), indicators))
    }

    /// Builds a series from bars that are already sorted and unique.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let len = bars.len();
        let mut series = Self {
            dates: Vec::with_capacity(len),
            open_prices: Vec::with_capacity(len),
            high_prices: Vec::with_capacity(len),
            low_prices: Vec::with_capacity(len),
            close_prices: Vec::with_capacity(len),
            volumes: Vec::with_capacity(len),
        };

        for b in bars {
            series.dates.push(b.date);
            series.open_prices.push(b.open);
            series.high_prices.push(b.high);
            series.low_prices.push(b.low);
            series.close_prices.push(b.close);
            series.volumes.push(b.volume);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.close_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close_prices.is_empty()
    }

    pub fn bar(&self, idx: usize) -> Bar {
        Bar::new(
            self.dates[idx],
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
            self.volumes[idx],
        )
    }

    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).map(|i| self.bar(i))
    }

    pub fn latest_close(&self) -> Option<Price> {
        self.close_prices.last().map(|&c| Price::new(c))
    }

    pub fn previous_close(&self) -> Option<Price> {
        self.len()
            .checked_sub(2)
            .map(|i| Price::new(self.close_prices[i]))
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Lowest low over the whole history.
    pub fn historical_low(&self) -> Option<LowPrice> {
        get_min(&self.low_prices).map(|(_, low)| LowPrice::new(low))
    }

    /// Highest high over the whole history.
    pub fn historical_high(&self) -> Option<HighPrice> {
        get_max(&self.high_prices).map(|(_, high)| HighPrice::new(high))
    }

    /// The last `n` bars (or all of them).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            dates: self.dates[start..].to_vec(),
            open_prices: self.open_prices[start..].to_vec(),
            high_prices: self.high_prices[start..].to_vec(),
            low_prices: self.low_prices[start..].to_vec(),
            close_prices: self.close_prices[start..].to_vec(),
            volumes: self.volumes[start..].to_vec(),
        }
    }

    /// Aggregates daily bars into `timeframe` buckets: first open, max high, min low,
    /// last close, summed volume. Each bucket is dated by its last daily bar.
    pub fn resample(&self, timeframe: Timeframe) -> Self {
        if timeframe == Timeframe::Daily {
            return self.clone();
        }

        let bars = self
            .bars()
            .chunk_by(|b| timeframe.bucket(b.date))
            .into_iter()
            .filter_map(|(_, bucket)| {
                bucket.reduce(|mut acc, b| {
                    acc.absorb(&b);
                    acc
                })
            })
            .collect();

        Self::from_bars(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: f64) -> RawBar {
        RawBar::new(date, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let (series, rows) = PriceSeries::from_raw(vec![
            raw("2024-01-03", 3.0),
            raw("2024-01-01", 1.0),
            raw("02/01/2024", 2.0),
        ])
        .unwrap();
        assert_eq!(series.close_prices, vec![1.0, 2.0, 3.0]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(PriceSeries::from_raw(vec![]).unwrap_err(), SnapshotError::EmptySeries);
    }

    #[test]
    fn missing_required_value_names_the_column() {
        let mut bad = raw("2024-01-02", 2.0);
        bad.volume = None;
        let err = PriceSeries::from_raw(vec![raw("2024-01-01", 1.0), bad]).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::MissingColumn {
                column: "Volume",
                row: 1
            }
        );
    }

    #[test]
    fn duplicate_and_unparseable_dates_fail() {
        let dup = PriceSeries::from_raw(vec![raw("2024-01-01", 1.0), raw("2024-01-01", 2.0)]);
        assert!(matches!(dup, Err(SnapshotError::DuplicateDate { .. })));

        let bad = PriceSeries::from_raw(vec![raw("not a date", 1.0)]);
        assert!(matches!(bad, Err(SnapshotError::UnparseableDate { row: 0, .. })));
    }

    #[test]
    fn non_finite_prices_fail() {
        let err = PriceSeries::from_raw(vec![raw("2024-01-01", f64::NAN)]).unwrap_err();
        assert!(matches!(err, SnapshotError::NonFiniteValue { column: "Open", row: 0 }));
    }

    #[test]
    fn weekly_resample_aggregates_iso_weeks() {
        // Mon 2024-01-01 .. Wed 2024-01-10 (two ISO weeks)
        let raws = (1..=10)
            .map(|d| raw(&format!("2024-01-{:02}", d), d as f64 * 10.0))
            .collect();
        let (daily, _) = PriceSeries::from_raw(raws).unwrap();
        let weekly = daily.resample(Timeframe::Weekly);

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.close_prices, vec![70.0, 100.0]);
        assert_eq!(weekly.high_prices[0], 71.0);
        assert_eq!(weekly.low_prices[1], 79.0);
        assert_eq!(weekly.open_prices[1], 80.0);
        assert_eq!(weekly.volumes[0], 7000.0);
        assert_eq!(weekly.dates[1], NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn historical_extremes_span_the_whole_history() {
        let (series, _) = PriceSeries::from_raw(vec![
            raw("2024-01-01", 50.0),
            raw("2024-01-02", 20.0),
            raw("2024-01-03", 80.0),
            raw("2024-01-04", 40.0),
        ])
        .unwrap();
        assert_eq!(series.historical_low(), Some(LowPrice::new(19.0)));
        assert_eq!(series.historical_high(), Some(HighPrice::new(81.0)));

        let empty = PriceSeries::default();
        assert_eq!(empty.historical_low(), None);
        assert_eq!(empty.historical_high(), None);
    }

    #[test]
    fn raw_bar_reads_capitalised_headers() {
        let bar: RawBar = serde_json::from_str(
            r#"{"Date":"2024-02-01","Open":1,"High":2,"Low":0.5,"Close":1.5,"Volume":10,"RSI_14":55.0}"#,
        )
        .unwrap();
        assert_eq!(bar.close, Some(1.5));
        assert_eq!(bar.indicators.rsi_14, Some(55.0));
    }
}
