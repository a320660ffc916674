//! Fixed-width tables for the terminal report.

use {
    crate::{
        config::PriceLike,
        models::{FibonacciLevels, LevelDetail, MomentumScore, PriceLevels, SetupResult},
    },
    tabled::{Table, Tabled, settings::Style},
};

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "Side")]
    side: &'static str,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Hits")]
    count: usize,
    #[tabled(rename = "Sources")]
    tags: String,
}

#[derive(Tabled)]
struct FibRow {
    #[tabled(rename = "Level")]
    label: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Tabled)]
struct SetupRow {
    #[tabled(rename = "Setup")]
    name: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Tabled)]
struct MomentumRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Returns")]
    returns: String,
    #[tabled(rename = "Score")]
    score: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

fn level_row(side: &'static str, detail: &LevelDetail, reference: f64) -> LevelRow {
    let distance = if reference > 0.0 {
        format!("{:+.2}%", (detail.value.value() - reference) / reference * 100.0)
    } else {
        "-".to_string()
    };
    LevelRow {
        side,
        price: detail.value.to_string(),
        distance,
        weight: detail.weight.to_string(),
        count: detail.count,
        tags: detail.tag_list(),
    }
}

/// Resistances (highest first) above supports (highest first), relative to `reference`.
pub fn levels_table(levels: &PriceLevels, reference: f64) -> String {
    let rows = levels
        .resistances
        .iter()
        .rev()
        .map(|d| level_row("resistance", d, reference))
        .chain(levels.supports.iter().rev().map(|d| level_row("support", d, reference)))
        .collect();
    render::<LevelRow>(rows)
}

pub fn fibonacci_table(fib: &FibonacciLevels) -> String {
    let rows = fib
        .retracements
        .iter()
        .map(|l| (l, "retracement"))
        .chain(fib.extensions.iter().map(|l| (l, "extension")))
        .map(|(l, kind)| FibRow {
            label: l.label.clone(),
            kind,
            price: l.price.to_string(),
        })
        .collect();
    render::<FibRow>(rows)
}

pub fn setups_table(results: &[SetupResult]) -> String {
    let rows = results
        .iter()
        .map(|r| SetupRow {
            name: r.name.clone(),
            active: if r.active { "yes" } else { "no" },
            details: r.details.clone(),
        })
        .collect();
    render::<SetupRow>(rows)
}

/// Ranking as returned by `rank_momentum` (best first).
pub fn momentum_table(scores: &[MomentumScore]) -> String {
    let rows = scores
        .iter()
        .enumerate()
        .map(|(i, s)| MomentumRow {
            rank: i + 1,
            symbol: s.symbol.clone(),
            close: s.last_close.to_string(),
            returns: s
                .returns
                .iter()
                .map(|(w, r)| format!("{}d {}", w, pct(*r)))
                .collect::<Vec<_>>()
                .join(", "),
            score: pct(s.score),
        })
        .collect();
    render::<MomentumRow>(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Price, Weight},
        models::LevelTag,
    };

    #[test]
    fn levels_table_lists_resistances_first() {
        let levels = PriceLevels {
            supports: vec![LevelDetail::new(Price::new(90.0), Weight::new(2.0), LevelTag::SwingShort)],
            resistances: vec![LevelDetail::new(Price::new(110.0), Weight::new(3.0), LevelTag::SwingLong)],
            ..Default::default()
        };
        let out = levels_table(&levels, 100.0);

        let res = out.find("resistance").unwrap();
        let sup = out.find("support").unwrap();
        assert!(res < sup);
        assert!(out.contains("+10.00%"));
        assert!(out.contains("-10.00%"));
        assert!(out.contains("Sources"));
    }

    #[test]
    fn momentum_table_marks_missing_windows() {
        let score = MomentumScore {
            symbol: "AAA".to_string(),
            last_close: Price::new(12.5),
            returns: vec![(21, Some(0.1)), (63, None)],
            score: Some(0.1),
        };
        let out = momentum_table(&[score]);
        assert!(out.contains("21d +10.00%, 63d -"));
        assert!(out.contains("AAA"));
    }

    #[test]
    fn setups_table_shows_activity() {
        let results = vec![SetupResult::new("RSI rebound", "desc", true, "ok")];
        let out = setups_table(&results);
        assert!(out.contains("RSI rebound"));
        assert!(out.contains("yes"));
    }
}
