use {
    crate::{config::Price, domain::Timeframe},
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Sideways,
}

/// Ordering of the short/medium/long averages at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum MaStack {
    BullishStack,
    BearishStack,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum TrendLabel {
    #[strum(serialize = "strong downtrend")]
    StrongDowntrend,
    #[strum(serialize = "moderate downtrend")]
    ModerateDowntrend,
    #[strum(serialize = "sideways")]
    Sideways,
    #[strum(serialize = "moderate uptrend")]
    ModerateUptrend,
    #[strum(serialize = "strong uptrend")]
    StrongUptrend,
}

impl TrendLabel {
    pub fn is_uptrend(self) -> bool {
        matches!(self, TrendLabel::ModerateUptrend | TrendLabel::StrongUptrend)
    }

    pub fn is_downtrend(self) -> bool {
        matches!(self, TrendLabel::ModerateDowntrend | TrendLabel::StrongDowntrend)
    }

    pub fn is_neutral_or_better(self) -> bool {
        self >= TrendLabel::Sideways
    }
}

/// Directional read for one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub timeframe: Timeframe,
    pub direction: TrendDirection,
    pub slope_short: f64,
    pub slope_medium: f64,
    pub slope_long: f64,
    pub stack: MaStack,
    /// Latest values of the short/medium/long averages.
    pub ma_short: Option<f64>,
    pub ma_medium: Option<f64>,
    pub ma_long: Option<f64>,
}

impl TrendSnapshot {
    /// Strength label. `price_above_long_ma` is `None` when no long-term average is known.
    pub fn label(&self, price_above_long_ma: Option<bool>) -> TrendLabel {
        match self.direction {
            TrendDirection::Uptrend => {
                if self.stack == MaStack::BullishStack && price_above_long_ma != Some(false) {
                    TrendLabel::StrongUptrend
                } else {
                    TrendLabel::ModerateUptrend
                }
            }
            TrendDirection::Downtrend => {
                if self.stack == MaStack::BearishStack && price_above_long_ma != Some(true) {
                    TrendLabel::StrongDowntrend
                } else {
                    TrendLabel::ModerateDowntrend
                }
            }
            TrendDirection::Sideways => TrendLabel::Sideways,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BreakoutKind {
    BreakoutUp,
    FalseBreakoutUp,
    BreakoutDown,
    FalseBreakoutDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutSignal {
    pub kind: BreakoutKind,
    pub price: Price,
    pub reference_level: Price,
    pub date: NaiveDate,
}
