use {
    crate::{
        config::{Price, PriceLike},
        domain::Timeframe,
        models::{
            BreakoutKind, BreakoutSignal, DivergenceSignal, FibonacciLevels, IndicatorColumn,
            IndicatorTable, PriceLevels, PriceSeries, TrendLabel, TrendSnapshot,
        },
    },
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Correlation of the asset's daily returns with a set of benchmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroContext {
    pub correlations: BTreeMap<String, f64>,
}

impl MacroContext {
    pub fn with(mut self, benchmark: impl Into<String>, correlation: f64) -> Self {
        self.correlations.insert(benchmark.into(), correlation);
        self
    }
}

/// Everything known about one asset at its latest bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: Option<String>,
    pub latest_date: NaiveDate,
    pub latest_price: Price,
    pub levels: PriceLevels,
    pub fibonacci: Option<FibonacciLevels>,
    /// Daily trend.
    pub trend: TrendSnapshot,
    pub trend_by_timeframe: BTreeMap<Timeframe, TrendSnapshot>,
    pub breakouts: BTreeMap<BreakoutKind, BreakoutSignal>,
    pub divergences: Vec<DivergenceSignal>,
    pub series: PriceSeries,
    pub indicators: IndicatorTable,
    pub macro_context: Option<MacroContext>,
}

impl MarketSnapshot {
    pub fn latest(&self, column: IndicatorColumn) -> Option<f64> {
        self.indicators.latest(column)
    }

    /// `None` when SMA 200 is not available yet.
    pub fn price_above_sma200(&self) -> Option<bool> {
        self.latest(IndicatorColumn::Sma200)
            .map(|sma| self.latest_price.value() >= sma)
    }

    pub fn daily_label(&self, price_above_long_ma: Option<bool>) -> TrendLabel {
        self.trend.label(price_above_long_ma)
    }

    pub fn timeframe_label(&self, timeframe: Timeframe, price_above_long_ma: Option<bool>) -> Option<TrendLabel> {
        self.trend_by_timeframe
            .get(&timeframe)
            .map(|t| t.label(price_above_long_ma))
    }
}
