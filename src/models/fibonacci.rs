use {
    crate::config::{HighPrice, LowPrice, Price, PriceLike},
    chrono::NaiveDate,
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SwingDirection {
    /// Low formed first, then the high.
    Advance,
    /// High formed first, then the low.
    Decline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub label: String,
    pub ratio: f64,
    pub price: Price,
}

/// Retracement and extension prices of one swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub base_high: HighPrice,
    pub base_low: LowPrice,
    pub high_date: NaiveDate,
    pub low_date: NaiveDate,
    pub retracements: Vec<FibLevel>,
    pub extensions: Vec<FibLevel>,
}

impl FibonacciLevels {
    pub fn swing(&self) -> SwingDirection {
        if self.high_date < self.low_date {
            SwingDirection::Decline
        } else {
            SwingDirection::Advance
        }
    }

    pub fn range(&self) -> f64 {
        self.base_high.value() - self.base_low.value()
    }

    /// Looks a level up by its label, e.g. "61.8%".
    pub fn level(&self, label: &str) -> Option<Price> {
        self.all_levels().find(|l| l.label == label).map(|l| l.price)
    }

    pub fn all_levels(&self) -> impl Iterator<Item = &FibLevel> {
        self.retracements.iter().chain(self.extensions.iter())
    }
}
