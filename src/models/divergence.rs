use {
    crate::{config::Price, models::IndicatorColumn},
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DivergenceKind {
    Bullish,
    Bearish,
}

/// Indicators checked for divergence against price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum DivergenceIndicator {
    #[strum(serialize = "RSI")]
    Rsi,
    #[strum(serialize = "OBV")]
    Obv,
    #[strum(serialize = "MACD histogram")]
    MacdHistogram,
}

impl DivergenceIndicator {
    pub fn column(self) -> IndicatorColumn {
        match self {
            DivergenceIndicator::Rsi => IndicatorColumn::Rsi14,
            DivergenceIndicator::Obv => IndicatorColumn::Obv,
            DivergenceIndicator::MacdHistogram => IndicatorColumn::MacdHist,
        }
    }
}

/// One divergence between two consecutive same-type pivots.
/// `date`, `price` and `indicator_value` refer to the later pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceSignal {
    pub kind: DivergenceKind,
    pub indicator: DivergenceIndicator,
    pub date: NaiveDate,
    pub price: Price,
    pub indicator_value: f64,
    pub previous_date: NaiveDate,
}
