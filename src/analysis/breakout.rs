use {
    crate::{
        config::{BreakoutConfig, PriceLike},
        models::{BreakoutKind, BreakoutSignal, PriceLevels, PriceSeries},
    },
    std::collections::BTreeMap,
};

/// Breakout and false-breakout signals of the latest bar against the nearest levels.
/// At most one signal per kind; no levels means no signals.
pub fn breakout_signals(
    series: &PriceSeries,
    levels: &PriceLevels,
    config: &BreakoutConfig,
) -> BTreeMap<BreakoutKind, BreakoutSignal> {
    let mut signals = BTreeMap::new();
    let (Some(price), Some(date)) = (series.latest_close(), series.latest_date()) else {
        return signals;
    };
    let previous = series.previous_close();

    let mut emit = |kind, reference_level| {
        signals.insert(
            kind,
            BreakoutSignal {
                kind,
                price,
                reference_level,
                date,
            },
        );
    };

    if let Some(res) = levels.nearest_resistance(price).map(|d| d.value) {
        if price.value() > config.tolerance.above(res.value()) {
            emit(BreakoutKind::BreakoutUp, res);
        }
        if price < res && previous.is_some_and(|p| p > res) {
            emit(BreakoutKind::FalseBreakoutUp, res);
        }
    }

    if let Some(sup) = levels.nearest_support(price).map(|d| d.value) {
        if price.value() < config.tolerance.below(sup.value()) {
            emit(BreakoutKind::BreakoutDown, sup);
        }
        if price > sup && previous.is_some_and(|p| p < sup) {
            emit(BreakoutKind::FalseBreakoutDown, sup);
        }
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ANALYSIS, Price, Weight},
        domain::Bar,
        models::{LevelDetail, LevelTag},
    };
    use chrono::{Days, NaiveDate};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_bars(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(start + Days::new(i as u64), c, c, c, c, 1.0))
                .collect(),
        )
    }

    fn level(v: f64) -> LevelDetail {
        LevelDetail::new(Price::new(v), Weight::new(1.0), LevelTag::SwingMedium)
    }

    #[test]
    fn no_levels_no_signals() {
        let s = series(&[100.0, 120.0]);
        assert!(breakout_signals(&s, &PriceLevels::default(), &ANALYSIS.breakout).is_empty());
    }

    #[test]
    fn clearing_resistance_beyond_tolerance_is_a_breakout() {
        let levels = PriceLevels {
            resistances: vec![level(100.0)],
            ..Default::default()
        };
        let up = breakout_signals(&series(&[99.0, 101.0]), &levels, &ANALYSIS.breakout);
        assert!(up.contains_key(&BreakoutKind::BreakoutUp));

        let marginal = breakout_signals(&series(&[99.0, 100.3]), &levels, &ANALYSIS.breakout);
        assert!(!marginal.contains_key(&BreakoutKind::BreakoutUp));
    }

    #[test]
    fn falling_back_under_resistance_is_false_breakout() {
        let levels = PriceLevels {
            resistances: vec![level(100.0)],
            ..Default::default()
        };
        let signals = breakout_signals(&series(&[101.0, 99.5]), &levels, &ANALYSIS.breakout);
        let signal = &signals[&BreakoutKind::FalseBreakoutUp];
        assert_eq!(signal.reference_level, Price::new(100.0));
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn support_side_is_symmetric() {
        let levels = PriceLevels {
            supports: vec![level(50.0)],
            ..Default::default()
        };
        let down = breakout_signals(&series(&[51.0, 49.0]), &levels, &ANALYSIS.breakout);
        assert!(down.contains_key(&BreakoutKind::BreakoutDown));

        let fake = breakout_signals(&series(&[49.9, 50.1]), &levels, &ANALYSIS.breakout);
        assert!(fake.contains_key(&BreakoutKind::FalseBreakoutDown));
        assert!(!fake.contains_key(&BreakoutKind::BreakoutDown));
    }
}
