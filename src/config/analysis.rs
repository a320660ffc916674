//! Analysis and computation configuration

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::config::{TolerancePct, Weight};
use crate::domain::Timeframe;

/// One swing-detection source feeding the level consolidator.
/// Given in full when overridden: there is no single default source.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SwingSource {
    /// Neighborhood order `k` (window of `2k+1` samples).
    pub order: usize,
    pub weight: Weight,
    /// Merge tolerance for candidates produced by this source.
    pub tolerance: TolerancePct,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub swing_short: SwingSource,
    pub swing_medium: SwingSource,
    pub swing_long: SwingSource,
    /// Detector run on weekly-resampled highs/lows.
    pub weekly_swing: SwingSource,

    // Round numbers around the mean close
    pub round_step: f64,
    pub round_width: usize,
    pub round_weight: Weight,
    pub round_tolerance: TolerancePct,

    // 52-week and all-time extremes
    pub extreme_weight: Weight,
    pub extreme_tolerance: TolerancePct,
    pub rolling_weeks: usize,
}

impl LevelConfig {
    /// Smallest tolerance of any source. Used by the final settle pass.
    pub fn settle_tolerance(&self) -> TolerancePct {
        [
            self.swing_short.tolerance,
            self.swing_medium.tolerance,
            self.swing_long.tolerance,
            self.weekly_swing.tolerance,
            self.round_tolerance,
            self.extreme_tolerance,
        ]
        .into_iter()
        .fold(TolerancePct::new(f64::MAX), |acc, t| if t < acc { t } else { acc })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciConfig {
    /// Number of trailing bars searched for the swing.
    pub lookback: usize,
    pub short_order: usize,
    pub long_order: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceConfig {
    pub order: usize,
    /// Minimum number of bars between two paired pivots.
    pub min_distance: usize,
    /// Divergences older than this (calendar days before the latest bar) are not narrated.
    pub recency_days: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub short_span: usize,
    pub medium_span: usize,
    pub long_span: usize,
    pub timeframes: Cow<'static, [Timeframe]>,
}

impl TrendConfig {
    pub fn longest_span(&self) -> usize {
        self.short_span.max(self.medium_span).max(self.long_span)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    pub tolerance: TolerancePct,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    pub rsi_oversold: f64,
    /// Upper bound of the rebound band `(oversold, ceiling]`.
    pub rsi_rebound_ceiling: f64,
    /// How many trailing bars may contain the oversold cross.
    pub rsi_lookback_bars: usize,
    pub min_volume_ratio: f64,
}

/// Conditional thresholds used by the narrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorThresholds {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Bollinger bandwidth (% of middle band)
    pub bb_squeeze_pct: f64,
    pub bb_wide_pct: f64,
    /// ATR as % of close
    pub atr_high_pct: f64,
    pub atr_moderate_pct: f64,
    pub volume_strong: f64,
    pub volume_mild: f64,
    pub volume_below_average: f64,
    pub stoch_overbought: f64,
    pub stoch_oversold: f64,
    pub proximity_52w_pct: f64,
    pub correlation_strong: f64,
    pub correlation_moderate: f64,
    pub max_levels_listed: usize,
    pub max_divergences_listed: usize,
}

/// The Master Analysis Configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub levels: LevelConfig,
    pub fibonacci: FibonacciConfig,
    pub divergence: DivergenceConfig,
    pub trend: TrendConfig,
    pub breakout: BreakoutConfig,
    pub setups: SetupConfig,
    pub narrator: NarratorThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        ANALYSIS
    }
}

// Missing fields in a config file fall back to these
impl Default for LevelConfig {
    fn default() -> Self {
        ANALYSIS.levels
    }
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        ANALYSIS.fibonacci
    }
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        ANALYSIS.divergence
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        ANALYSIS.trend
    }
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        ANALYSIS.breakout
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        ANALYSIS.setups
    }
}

impl Default for NarratorThresholds {
    fn default() -> Self {
        ANALYSIS.narrator
    }
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    levels: LevelConfig {
        // Larger scale => larger weight and wider tolerance
        swing_short: SwingSource {
            order: 3,
            weight: Weight::new(1.0),
            tolerance: TolerancePct::new(0.5),
        },
        swing_medium: SwingSource {
            order: 5,
            weight: Weight::new(2.0),
            tolerance: TolerancePct::new(1.0),
        },
        swing_long: SwingSource {
            order: 10,
            weight: Weight::new(3.0),
            tolerance: TolerancePct::new(1.5),
        },
        weekly_swing: SwingSource {
            order: 2,
            weight: Weight::new(4.0),
            tolerance: TolerancePct::new(1.5),
        },

        round_step: 5.0,
        round_width: 5,
        round_weight: Weight::new(0.5),
        round_tolerance: TolerancePct::new(0.5),

        extreme_weight: Weight::new(5.0),
        extreme_tolerance: TolerancePct::new(1.0),
        rolling_weeks: 52,
    },

    fibonacci: FibonacciConfig {
        lookback: 252, // ~1 trading year
        short_order: 3,
        long_order: 8,
    },

    divergence: DivergenceConfig {
        order: 5,
        min_distance: 5,
        recency_days: 15,
    },

    trend: TrendConfig {
        short_span: 9,
        medium_span: 21,
        long_span: 72,
        timeframes: Cow::Borrowed(&[Timeframe::Daily, Timeframe::Weekly]),
    },

    breakout: BreakoutConfig {
        tolerance: TolerancePct::new(0.5),
    },

    setups: SetupConfig {
        rsi_oversold: 30.0,
        rsi_rebound_ceiling: 45.0,
        rsi_lookback_bars: 3,
        min_volume_ratio: 1.0,
    },

    narrator: NarratorThresholds {
        rsi_overbought: 70.0,
        rsi_oversold: 30.0,
        bb_squeeze_pct: 4.0,
        bb_wide_pct: 12.0,
        atr_high_pct: 4.0,
        atr_moderate_pct: 2.0,
        volume_strong: 1.5,
        volume_mild: 1.0,
        volume_below_average: 0.7,
        stoch_overbought: 80.0,
        stoch_oversold: 20.0,
        proximity_52w_pct: 5.0,
        correlation_strong: 0.7,
        correlation_moderate: 0.4,
        max_levels_listed: 3,
        max_divergences_listed: 3,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_tolerance_is_smallest_source_tolerance() {
        assert_eq!(ANALYSIS.levels.settle_tolerance(), TolerancePct::new(0.5));
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = serde_json::to_string(&ANALYSIS).unwrap();
        let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.trend.timeframes.as_ref(), ANALYSIS.trend.timeframes.as_ref());
        assert_eq!(parsed.levels.swing_long.order, 10);
    }

    #[test]
    fn partial_config_keeps_unnamed_defaults() {
        let parsed: AnalysisConfig =
            serde_json::from_str(r#"{"setups":{"rsi_oversold":25.0},"levels":{"round_step":10.0}}"#).unwrap();
        assert_eq!(parsed.setups.rsi_oversold, 25.0);
        assert_eq!(parsed.setups.rsi_rebound_ceiling, ANALYSIS.setups.rsi_rebound_ceiling);
        assert_eq!(parsed.setups.rsi_lookback_bars, 3);
        assert_eq!(parsed.levels.round_step, 10.0);
        assert_eq!(parsed.levels.weekly_swing.order, 2);
        assert_eq!(parsed.narrator.rsi_overbought, 70.0);
        assert_eq!(parsed.trend.timeframes.as_ref(), ANALYSIS.trend.timeframes.as_ref());

        let empty: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.fibonacci.lookback, 252);
    }
}
