use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Every indicator column known to the enriched table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum IndicatorColumn {
    #[strum(serialize = "SMA_9")]
    Sma9,
    #[strum(serialize = "SMA_21")]
    Sma21,
    #[strum(serialize = "SMA_72")]
    Sma72,
    #[strum(serialize = "SMA_200")]
    Sma200,
    #[strum(serialize = "EMA_9")]
    Ema9,
    #[strum(serialize = "EMA_21")]
    Ema21,
    #[strum(serialize = "EMA_72")]
    Ema72,
    #[strum(serialize = "RSI_14")]
    Rsi14,
    #[strum(serialize = "MACD")]
    Macd,
    #[strum(serialize = "MACD_Signal")]
    MacdSignal,
    #[strum(serialize = "MACD_Hist")]
    MacdHist,
    #[strum(serialize = "BB_Middle")]
    BbMiddle,
    #[strum(serialize = "BB_Upper")]
    BbUpper,
    #[strum(serialize = "BB_Lower")]
    BbLower,
    #[strum(serialize = "ATR_14")]
    Atr14,
    #[strum(serialize = "Stoch_K")]
    StochK,
    #[strum(serialize = "Stoch_D")]
    StochD,
    #[strum(serialize = "OBV")]
    Obv,
    #[strum(serialize = "Volume_Ratio")]
    VolumeRatio,
    #[strum(serialize = "Min_52w")]
    Min52w,
    #[strum(serialize = "Max_52w")]
    Max52w,
}

/// Optional indicator values for one bar. `None` means absent or not yet defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(rename = "SMA_9", default, skip_serializing_if = "Option::is_none")]
    pub sma_9: Option<f64>,
    #[serde(rename = "SMA_21", default, skip_serializing_if = "Option::is_none")]
    pub sma_21: Option<f64>,
    #[serde(rename = "SMA_72", default, skip_serializing_if = "Option::is_none")]
    pub sma_72: Option<f64>,
    #[serde(rename = "SMA_200", default, skip_serializing_if = "Option::is_none")]
    pub sma_200: Option<f64>,
    #[serde(rename = "EMA_9", default, skip_serializing_if = "Option::is_none")]
    pub ema_9: Option<f64>,
    #[serde(rename = "EMA_21", default, skip_serializing_if = "Option::is_none")]
    pub ema_21: Option<f64>,
    #[serde(rename = "EMA_72", default, skip_serializing_if = "Option::is_none")]
    pub ema_72: Option<f64>,
    #[serde(rename = "RSI_14", default, skip_serializing_if = "Option::is_none")]
    pub rsi_14: Option<f64>,
    #[serde(rename = "MACD", default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(rename = "MACD_Signal", default, skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(rename = "MACD_Hist", default, skip_serializing_if = "Option::is_none")]
    pub macd_hist: Option<f64>,
    #[serde(rename = "BB_Middle", default, skip_serializing_if = "Option::is_none")]
    pub bb_middle: Option<f64>,
    #[serde(rename = "BB_Upper", default, skip_serializing_if = "Option::is_none")]
    pub bb_upper: Option<f64>,
    #[serde(rename = "BB_Lower", default, skip_serializing_if = "Option::is_none")]
    pub bb_lower: Option<f64>,
    #[serde(rename = "ATR_14", default, skip_serializing_if = "Option::is_none")]
    pub atr_14: Option<f64>,
    #[serde(rename = "Stoch_K", default, skip_serializing_if = "Option::is_none")]
    pub stoch_k: Option<f64>,
    #[serde(rename = "Stoch_D", default, skip_serializing_if = "Option::is_none")]
    pub stoch_d: Option<f64>,
    #[serde(rename = "OBV", default, skip_serializing_if = "Option::is_none")]
    pub obv: Option<f64>,
    #[serde(rename = "Volume_Ratio", default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    #[serde(rename = "Min_52w", default, skip_serializing_if = "Option::is_none")]
    pub min_52w: Option<f64>,
    #[serde(rename = "Max_52w", default, skip_serializing_if = "Option::is_none")]
    pub max_52w: Option<f64>,
}

macro_rules! impl_row_accessors {
    ($($column:ident => $field:ident),* $(,)?) => {
        impl IndicatorRow {
            /// Finite value of `column`, if any.
            pub fn get(&self, column: IndicatorColumn) -> Option<f64> {
                let value = match column {
                    $(IndicatorColumn::$column => self.$field,)*
                };
                value.filter(|v| v.is_finite())
            }

            pub fn set(&mut self, column: IndicatorColumn, value: Option<f64>) {
                let slot = match column {
                    $(IndicatorColumn::$column => &mut self.$field,)*
                };
                *slot = value.filter(|v| v.is_finite());
            }
        }
    };
}

impl_row_accessors!(
    Sma9 => sma_9,
    Sma21 => sma_21,
    Sma72 => sma_72,
    Sma200 => sma_200,
    Ema9 => ema_9,
    Ema21 => ema_21,
    Ema72 => ema_72,
    Rsi14 => rsi_14,
    Macd => macd,
    MacdSignal => macd_signal,
    MacdHist => macd_hist,
    BbMiddle => bb_middle,
    BbUpper => bb_upper,
    BbLower => bb_lower,
    Atr14 => atr_14,
    StochK => stoch_k,
    StochD => stoch_d,
    Obv => obv,
    VolumeRatio => volume_ratio,
    Min52w => min_52w,
    Max52w => max_52w,
);

/// Full-history indicator table, row-aligned with the price series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorTable {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn new(dates: Vec<NaiveDate>, rows: Vec<IndicatorRow>) -> Self {
        debug_assert_eq!(dates.len(), rows.len());
        Self { dates, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when every row carries a value for `column`.
    pub fn is_complete(&self, column: IndicatorColumn) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.get(column).is_some())
    }

    /// True when at least one row carries a value for `column`.
    pub fn has_column(&self, column: IndicatorColumn) -> bool {
        self.rows.iter().any(|r| r.get(column).is_some())
    }

    pub fn column(&self, column: IndicatorColumn) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(column)).collect()
    }

    pub fn set_column(&mut self, column: IndicatorColumn, values: &[Option<f64>]) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.set(column, *value);
        }
    }

    pub fn value_at(&self, column: IndicatorColumn, idx: usize) -> Option<f64> {
        self.rows.get(idx).and_then(|r| r.get(column))
    }

    pub fn latest(&self, column: IndicatorColumn) -> Option<f64> {
        self.rows.last().and_then(|r| r.get(column))
    }

    /// Last `n` defined values of `column`, oldest first.
    pub fn last_defined(&self, column: IndicatorColumn, n: usize) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .rows
            .iter()
            .rev()
            .filter_map(|r| r.get(column))
            .take(n)
            .collect();
        values.reverse();
        values
    }

    /// Columns with no value at all.
    pub fn missing_columns(&self) -> Vec<IndicatorColumn> {
        IndicatorColumn::iter()
            .filter(|c| !self.has_column(*c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_match_table_headers() {
        assert_eq!(IndicatorColumn::MacdSignal.to_string(), "MACD_Signal");
        assert_eq!(IndicatorColumn::Rsi14.to_string(), "RSI_14");
        assert_eq!(IndicatorColumn::iter().count(), 21);
    }

    #[test]
    fn row_get_ignores_non_finite() {
        let mut row = IndicatorRow::default();
        row.set(IndicatorColumn::Obv, Some(f64::NAN));
        assert_eq!(row.get(IndicatorColumn::Obv), None);
        row.set(IndicatorColumn::Obv, Some(12.0));
        assert_eq!(row.get(IndicatorColumn::Obv), Some(12.0));
    }

    #[test]
    fn row_deserializes_from_header_names() {
        let row: IndicatorRow = serde_json::from_str(r#"{"RSI_14": 28.5, "MACD_Hist": -0.2}"#).unwrap();
        assert_eq!(row.rsi_14, Some(28.5));
        assert_eq!(row.macd_hist, Some(-0.2));
        assert_eq!(row.obv, None);
    }

    #[test]
    fn last_defined_skips_gaps() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut table = IndicatorTable::new(vec![d; 4], vec![IndicatorRow::default(); 4]);
        table.set_column(IndicatorColumn::Rsi14, &[Some(1.0), None, Some(3.0), Some(4.0)]);
        assert_eq!(table.last_defined(IndicatorColumn::Rsi14, 3), vec![1.0, 3.0, 4.0]);
        assert!(!table.is_complete(IndicatorColumn::Rsi14));
        assert!(table.has_column(IndicatorColumn::Rsi14));
    }
}
