use {
    crate::{
        analysis::extrema::{local_maxima, local_minima},
        config::{DF, HighPrice, LevelConfig, LowPrice, Price, PriceLike, TolerancePct, Weight},
        domain::Timeframe,
        models::{LevelDetail, LevelTag, PriceLevels, PriceSeries},
    },
    statrs::statistics::Statistics,
};

/// One value offered to the merge pass.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    value: Price,
    weight: Weight,
    tolerance: TolerancePct,
    tag: LevelTag,
}

/// Whether an unmatched candidate may start its own level.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Seeding {
    Seed,
    ConfluenceOnly,
}

/// First-fit merge of `candidate` into `pool`. Returns false if it was neither merged nor seeded.
fn merge_candidate(pool: &mut Vec<LevelDetail>, candidate: Candidate, seeding: Seeding) -> bool {
    if !candidate.value.value().is_finite() || !candidate.value.is_positive() {
        return false;
    }

    if let Some(slot) = pool
        .iter_mut()
        .find(|d| candidate.tolerance.admits(&candidate.value, &d.value))
    {
        *slot = slot.merged(candidate.value, candidate.weight, candidate.tag);
        return true;
    }

    if seeding == Seeding::Seed {
        pool.push(LevelDetail::new(candidate.value, candidate.weight, candidate.tag));
        return true;
    }
    false
}

/// Sorts ascending and coalesces neighbours closer than `tolerance`.
fn settle(mut pool: Vec<LevelDetail>, tolerance: TolerancePct) -> Vec<LevelDetail> {
    pool.sort_by(|a, b| a.value.value().total_cmp(&b.value.value()));

    let mut settled: Vec<LevelDetail> = Vec::with_capacity(pool.len());
    for detail in pool {
        match settled.last_mut() {
            Some(last) if tolerance.admits(&detail.value, &last.value) => {
                *last = last.combined(&detail);
            }
            _ => settled.push(detail),
        }
    }
    settled
}

/// Evenly spaced round numbers around the mean close: `2 * width + 1` values.
pub fn round_numbers(closes: &[f64], step: f64, width: usize) -> Vec<Price> {
    let finite: Vec<f64> = closes.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || step <= 0.0 {
        return Vec::new();
    }

    let center = finite.iter().mean();
    let start = ((center / step).floor() - width as f64) * step;

    (0..=2 * width)
        .map(|i| start + i as f64 * step)
        .filter(|v| *v > 0.0)
        .map(Price::new)
        .collect()
}

/// Lowest low / highest high over the trailing `weeks` weekly bars.
pub fn rolling_extremes(weekly: &PriceSeries, weeks: usize) -> (Option<LowPrice>, Option<HighPrice>) {
    let recent = weekly.tail(weeks.max(1));
    (recent.historical_low(), recent.historical_high())
}

fn swing_candidates(
    series: &PriceSeries,
    source: &crate::config::SwingSource,
    tag: LevelTag,
) -> (Vec<Candidate>, Vec<Candidate>) {
    let as_candidate = |(_, v): (usize, f64)| Candidate {
        value: Price::new(v),
        weight: source.weight,
        tolerance: source.tolerance,
        tag,
    };

    let supports = local_minima(&series.low_prices, source.order)
        .into_iter()
        .map(as_candidate)
        .collect();
    let resistances = local_maxima(&series.high_prices, source.order)
        .into_iter()
        .map(as_candidate)
        .collect();
    (supports, resistances)
}

/// Builds the weighted, tagged support/resistance set for a daily series.
pub fn consolidate_levels(series: &PriceSeries, config: &LevelConfig) -> PriceLevels {
    crate::trace_time!("Consolidate Levels", 5000, {
        let Some(latest_close) = series.latest_close() else {
            return PriceLevels::default();
        };
        let weekly = series.resample(Timeframe::Weekly);

        // Step 1: Swing sources, finest scale first (processing order is the tie-break)
        let mut support_seeds = Vec::new();
        let mut resistance_seeds = Vec::new();
        let daily_sources = [
            (&config.swing_short, LevelTag::SwingShort),
            (&config.swing_medium, LevelTag::SwingMedium),
            (&config.swing_long, LevelTag::SwingLong),
        ];
        for (source, tag) in daily_sources {
            let (s, r) = swing_candidates(series, source, tag);
            support_seeds.extend(s);
            resistance_seeds.extend(r);
        }

        // Step 2: Weekly structure
        let (s, r) = swing_candidates(&weekly, &config.weekly_swing, LevelTag::WeeklySwing);
        support_seeds.extend(s);
        resistance_seeds.extend(r);

        let mut supports = Vec::new();
        let mut resistances = Vec::new();
        for c in support_seeds {
            merge_candidate(&mut supports, c, Seeding::Seed);
        }
        for c in resistance_seeds {
            merge_candidate(&mut resistances, c, Seeding::Seed);
        }

        // Step 3: Round numbers and extremes only reinforce existing levels
        let rounds = round_numbers(&series.close_prices, config.round_step, config.round_width);
        for &value in &rounds {
            let c = Candidate {
                value,
                weight: config.round_weight,
                tolerance: config.round_tolerance,
                tag: LevelTag::RoundNumber,
            };
            merge_candidate(&mut supports, c, Seeding::ConfluenceOnly);
            merge_candidate(&mut resistances, c, Seeding::ConfluenceOnly);
        }

        let (min_52w, max_52w) = rolling_extremes(&weekly, config.rolling_weeks);
        let historical_min = series.historical_low();
        let historical_max = series.historical_high();

        let extreme = |value: f64, tag: LevelTag| Candidate {
            value: Price::new(value),
            weight: config.extreme_weight,
            tolerance: config.extreme_tolerance,
            tag,
        };
        let low_extremes = [
            min_52w.map(|p| extreme(p.value(), LevelTag::Min52w)),
            historical_min.map(|p| extreme(p.value(), LevelTag::HistoricalMin)),
        ];
        let high_extremes = [
            max_52w.map(|p| extreme(p.value(), LevelTag::Max52w)),
            historical_max.map(|p| extreme(p.value(), LevelTag::HistoricalMax)),
        ];
        for c in low_extremes.into_iter().flatten() {
            merge_candidate(&mut supports, c, Seeding::ConfluenceOnly);
        }
        for c in high_extremes.into_iter().flatten() {
            merge_candidate(&mut resistances, c, Seeding::ConfluenceOnly);
        }

        // Step 4: Broken weekly resistance now acts as support
        let (broken, still_resistance): (Vec<_>, Vec<_>) = resistances
            .into_iter()
            .partition(|d| d.has_tag(LevelTag::WeeklySwing) && d.value < latest_close);
        resistances = still_resistance;

        for mut detail in broken {
            detail.tags.insert(LevelTag::BrokenResistance);
            match supports
                .iter_mut()
                .find(|d| config.weekly_swing.tolerance.admits(&detail.value, &d.value))
            {
                Some(slot) => *slot = slot.combined(&detail),
                None => supports.push(detail),
            }
        }

        // Step 5: Sort and settle
        let settle_tolerance = config.settle_tolerance();
        let supports = settle(supports, settle_tolerance);
        let resistances = settle(resistances, settle_tolerance);

        if DF.log_levels {
            log::info!(
                "Levels: {} supports, {} resistances (latest close {})",
                supports.len(),
                resistances.len(),
                latest_close
            );
        }

        PriceLevels {
            supports,
            resistances,
            round_numbers: rounds,
            historical_min,
            historical_max,
            min_52w,
            max_52w,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ANALYSIS, domain::Bar};
    use approx::assert_abs_diff_eq;
    use chrono::{Days, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Days::new(i as u64), c, c, c, c, 1000.0))
            .collect();
        PriceSeries::from_bars(bars)
    }

    fn zigzag(len: usize) -> Vec<f64> {
        // Period 20, amplitude 10, centred on 100
        (0..len)
            .map(|i| {
                let phase = (i % 20) as f64;
                let tri = if phase < 10.0 { phase } else { 20.0 - phase };
                95.0 + tri
            })
            .collect()
    }

    #[test]
    fn round_numbers_bracket_the_mean() {
        let rounds = round_numbers(&[100.0; 10], 5.0, 5);
        assert_eq!(rounds.len(), 11);
        assert_eq!(rounds.first().copied(), Some(Price::new(75.0)));
        assert!(rounds.contains(&Price::new(100.0)));
    }

    #[test]
    fn flat_series_has_no_swing_levels() {
        let levels = consolidate_levels(&series_from_closes(&[100.0; 300]), &ANALYSIS.levels);
        assert!(levels.supports.is_empty());
        assert!(levels.resistances.is_empty());
        assert!(levels.round_numbers.contains(&Price::new(100.0)));
        assert_eq!(levels.historical_min.map(|p| p.value()), Some(100.0));
    }

    #[test]
    fn zigzag_levels_are_sorted_and_separated() {
        let levels = consolidate_levels(&series_from_closes(&zigzag(200)), &ANALYSIS.levels);
        assert!(!levels.supports.is_empty());
        assert!(!levels.resistances.is_empty());

        let tol = ANALYSIS.levels.settle_tolerance();
        for pool in [&levels.supports, &levels.resistances] {
            for pair in pool.windows(2) {
                assert!(pair[0].value < pair[1].value);
                assert!(!tol.admits(&pair[1].value, &pair[0].value));
            }
            assert!(pool.iter().all(|d| d.value.is_positive()));
        }
    }

    #[test]
    fn repeated_troughs_accumulate_weight() {
        let levels = consolidate_levels(&series_from_closes(&zigzag(200)), &ANALYSIS.levels);
        let trough = levels
            .supports
            .iter()
            .find(|d| (d.value.value() - 95.0).abs() < 0.5)
            .unwrap();
        assert!(trough.count >= 10);
        assert!(trough.has_tag(LevelTag::SwingShort));
        assert!(trough.has_tag(LevelTag::SwingMedium));
        assert!(trough.has_tag(LevelTag::RoundNumber));
        assert!(trough.has_tag(LevelTag::HistoricalMin));
        assert_abs_diff_eq!(trough.value.value(), 95.0, epsilon = 1e-9);
    }

    /// One flat week (Monday to Sunday) per value, starting on a Monday.
    fn weekly_plateaus(weeks: &[f64]) -> Vec<f64> {
        weeks.iter().flat_map(|&w| [w; 7]).collect()
    }

    #[test]
    fn broken_weekly_resistance_turns_into_support() {
        // Weekly peaks at 110 twice and 130 once, last close back at 130
        let weeks = [
            100.0, 104.0, 110.0, 104.0, 100.0, 104.0, 110.0, 104.0, 100.0, 112.0, 118.0, 125.0, 130.0, 126.0,
            122.0, 125.0, 130.0,
        ];
        let series = series_from_closes(&weekly_plateaus(&weeks));
        let latest_close = series.latest_close().unwrap();
        let levels = consolidate_levels(&series, &ANALYSIS.levels);

        let migrated = levels
            .supports
            .iter()
            .find(|d| d.has_tag(LevelTag::BrokenResistance))
            .unwrap();
        assert_abs_diff_eq!(migrated.value.value(), 110.0, epsilon = 1e-9);
        assert!(migrated.has_tag(LevelTag::WeeklySwing));

        assert!(
            !levels
                .resistances
                .iter()
                .any(|d| d.has_tag(LevelTag::WeeklySwing) && d.value < latest_close)
        );

        // Resistance sitting exactly at the close is not broken
        let held = levels
            .resistances
            .iter()
            .find(|d| d.has_tag(LevelTag::WeeklySwing))
            .unwrap();
        assert_abs_diff_eq!(held.value.value(), 130.0, epsilon = 1e-9);
        assert!(held.value >= latest_close);
        assert!(!held.has_tag(LevelTag::BrokenResistance));
    }

    #[test]
    fn settle_coalesces_close_neighbours() {
        let pool = vec![
            LevelDetail::new(Price::new(100.3), Weight::new(1.0), LevelTag::SwingShort),
            LevelDetail::new(Price::new(100.0), Weight::new(1.0), LevelTag::SwingLong),
            LevelDetail::new(Price::new(110.0), Weight::new(1.0), LevelTag::SwingLong),
        ];
        let settled = settle(pool, TolerancePct::new(0.5));
        assert_eq!(settled.len(), 2);
        assert_abs_diff_eq!(settled[0].value.value(), 100.15, epsilon = 1e-9);
        assert_abs_diff_eq!(settled[0].weight.value(), 2.0);
    }

    #[test]
    fn confluence_candidates_never_seed() {
        let mut pool = Vec::new();
        let c = Candidate {
            value: Price::new(50.0),
            weight: Weight::new(5.0),
            tolerance: TolerancePct::new(1.0),
            tag: LevelTag::Max52w,
        };
        assert!(!merge_candidate(&mut pool, c, Seeding::ConfluenceOnly));
        assert!(pool.is_empty());
        assert!(merge_candidate(&mut pool, c, Seeding::Seed));
        assert!(!merge_candidate(
            &mut pool,
            Candidate {
                value: Price::new(-1.0),
                ..c
            },
            Seeding::Seed
        ));
        assert_eq!(pool.len(), 1);
    }
}
