use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::utils::{month_key, week_key};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Key shared by every date that falls into the same bar of this timeframe.
    pub fn bucket(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Timeframe::Daily => (date.year(), date.ordinal()),
            Timeframe::Weekly => week_key(date),
            Timeframe::Monthly => month_key(date),
        }
    }
}
