use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One validated daily row: a calendar date plus finite OHLCV values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    // Largest of high-low, |high-prev_close| and |low-prev_close|.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let range = self.high - self.low;
        match prev_close {
            Some(pc) => range.max((self.high - pc).abs()).max((self.low - pc).abs()),
            None => range,
        }
    }

    /// Folds a later bar of the same bucket into this one (open kept, close replaced).
    pub fn absorb(&mut self, later: &Bar) {
        self.date = later.date;
        self.high = self.high.max(later.high);
        self.low = self.low.min(later.low);
        self.close = later.close;
        self.volume += later.volume;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn true_range_uses_previous_close_gap() {
        let bar = Bar::new(day(2), 10.0, 11.0, 9.5, 10.5, 100.0);
        assert_eq!(bar.true_range(None), 1.5);
        assert_eq!(bar.true_range(Some(8.0)), 3.0);
    }

    #[test]
    fn absorb_builds_bucket_bar() {
        let mut bucket = Bar::new(day(1), 10.0, 12.0, 9.0, 11.0, 100.0);
        bucket.absorb(&Bar::new(day(2), 11.0, 13.0, 10.0, 12.5, 50.0));
        assert_eq!(bucket.date, day(2));
        assert_eq!(bucket.open, 10.0);
        assert_eq!(bucket.high, 13.0);
        assert_eq!(bucket.low, 9.0);
        assert_eq!(bucket.close, 12.5);
        assert_eq!(bucket.volume, 150.0);
    }
}
