use {
    crate::config::{HighPrice, LowPrice, Price, PriceLike, Weight},
    serde::{Deserialize, Serialize},
    std::collections::BTreeSet,
    strum_macros::{Display, EnumIter},
};

/// Which detection method (and scale) contributed to a level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum LevelTag {
    SwingShort,
    SwingMedium,
    SwingLong,
    WeeklySwing,
    RoundNumber,
    #[strum(serialize = "min_52w")]
    Min52w,
    #[strum(serialize = "max_52w")]
    Max52w,
    HistoricalMin,
    HistoricalMax,
    BrokenResistance,
}

/// A consolidated support/resistance level: the weight-weighted mean of every
/// contribution merged into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDetail {
    pub value: Price,
    pub weight: Weight,
    pub count: usize,
    pub tags: BTreeSet<LevelTag>,
}

impl LevelDetail {
    pub fn new(value: Price, weight: Weight, tag: LevelTag) -> Self {
        Self {
            value,
            weight,
            count: 1,
            tags: BTreeSet::from([tag]),
        }
    }

    /// The detail that results from merging one more contribution into `self`.
    pub fn merged(&self, candidate: Price, weight: Weight, tag: LevelTag) -> Self {
        self.combined(&LevelDetail::new(candidate, weight, tag))
    }

    /// Union of two details (weights and counts add, value re-weighted, tags joined).
    pub fn combined(&self, other: &LevelDetail) -> Self {
        let total = self.weight + other.weight;
        let value = if total.value() > f64::EPSILON {
            (self.value.value() * self.weight.value() + other.value.value() * other.weight.value())
                / total.value()
        } else {
            let n = (self.count + other.count).max(1) as f64;
            (self.value.value() * self.count as f64 + other.value.value() * other.count as f64) / n
        };

        Self {
            value: Price::new(value),
            weight: total,
            count: self.count + other.count,
            tags: self.tags.union(&other.tags).copied().collect(),
        }
    }

    pub fn has_tag(&self, tag: LevelTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn tag_list(&self) -> String {
        self.tags.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
    }
}

/// All levels of one snapshot. Supports and resistances are sorted ascending by value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceLevels {
    pub supports: Vec<LevelDetail>,
    pub resistances: Vec<LevelDetail>,
    pub round_numbers: Vec<Price>,
    pub historical_min: Option<LowPrice>,
    pub historical_max: Option<HighPrice>,
    pub min_52w: Option<LowPrice>,
    pub max_52w: Option<HighPrice>,
}

fn nearest(details: &[LevelDetail], price: Price) -> Option<&LevelDetail> {
    details.iter().min_by(|a, b| {
        let da = (a.value - price).abs();
        let db = (b.value - price).abs();
        da.total_cmp(&db)
    })
}

impl PriceLevels {
    pub fn is_empty(&self) -> bool {
        self.supports.is_empty() && self.resistances.is_empty()
    }

    pub fn supports_tagged(&self, tag: LevelTag) -> impl Iterator<Item = &LevelDetail> {
        self.supports.iter().filter(move |d| d.has_tag(tag))
    }

    /// Support closest to `price` by absolute distance, on either side.
    pub fn nearest_support(&self, price: Price) -> Option<&LevelDetail> {
        nearest(&self.supports, price)
    }

    /// Resistance closest to `price` by absolute distance, on either side.
    pub fn nearest_resistance(&self, price: Price) -> Option<&LevelDetail> {
        nearest(&self.resistances, price)
    }

    /// Supports under `price`, closest first.
    pub fn supports_below(&self, price: Price) -> Vec<&LevelDetail> {
        self.supports.iter().rev().filter(|d| d.value < price).collect()
    }

    /// Resistances over `price`, closest first.
    pub fn resistances_above(&self, price: Price) -> Vec<&LevelDetail> {
        self.resistances.iter().filter(|d| d.value > price).collect()
    }
}
