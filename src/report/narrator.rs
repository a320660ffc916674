//! Plain-language statements over a snapshot. Presentation only: every number
//! shown here was already computed by the analysis stages.

use {
    crate::{
        analysis::recent_divergences,
        config::{AnalysisConfig, NarratorThresholds, PriceLike},
        domain::Timeframe,
        models::{
            IndicatorColumn, LevelDetail, LevelTag, MaStack, MarketSnapshot, TrendDirection,
        },
    },
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Topic {
    Trend,
    #[strum(serialize = "Moving averages")]
    MovingAverages,
    Volume,
    Volatility,
    Bollinger,
    #[strum(serialize = "RSI")]
    Rsi,
    #[strum(serialize = "MACD")]
    Macd,
    Stochastic,
    #[strum(serialize = "52 weeks")]
    YearRange,
    Macro,
    Breakout,
    Levels,
    Fibonacci,
    Divergences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub topic: Topic,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub statements: Vec<Statement>,
    pub summary: String,
}

impl Narrative {
    pub fn render(&self) -> String {
        let mut out = String::from("Market summary\n");
        for s in &self.statements {
            out.push_str(&format!("- {}: {}\n", s.topic, s.text));
        }
        out.push('\n');
        out.push_str(&self.summary);
        out
    }

    pub fn statement(&self, topic: Topic) -> Option<&str> {
        self.statements
            .iter()
            .find(|s| s.topic == topic)
            .map(|s| s.text.as_str())
    }
}

fn not_available(what: &str) -> String {
    format!("{} not available", what)
}

fn describe_trend(snapshot: &MarketSnapshot) -> String {
    let mut parts = Vec::new();
    for (timeframe, t) in &snapshot.trend_by_timeframe {
        let mut line = format!(
            "{} {} ({}, slopes {:.4}/{:.4}/{:.4})",
            timeframe,
            t.direction,
            t.stack,
            t.slope_short,
            t.slope_medium,
            t.slope_long
        );
        match (t.direction, t.stack) {
            (TrendDirection::Sideways, MaStack::BullishStack) => {
                line.push_str(", averages still stacked up: pullback inside an uptrend")
            }
            (TrendDirection::Sideways, MaStack::BearishStack) => {
                line.push_str(", averages still stacked down: bounce inside a downtrend")
            }
            _ => {}
        }
        parts.push(line);
    }
    if !snapshot.trend_by_timeframe.contains_key(&Timeframe::Weekly) {
        parts.push(not_available("weekly trend"));
    }
    parts.join("; ")
}

fn describe_moving_averages(snapshot: &MarketSnapshot) -> String {
    let price = snapshot.latest_price.value();
    [
        (IndicatorColumn::Sma21, "SMA 21"),
        (IndicatorColumn::Sma72, "SMA 72"),
        (IndicatorColumn::Sma200, "SMA 200"),
    ]
    .iter()
    .map(|&(column, name)| match snapshot.latest(column) {
        Some(ma) if price >= ma => format!("above {} ({:.2})", name, ma),
        Some(ma) => format!("below {} ({:.2})", name, ma),
        None => not_available(name),
    })
    .collect::<Vec<_>>()
    .join(", ")
}

fn describe_volume(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let Some(ratio) = snapshot.latest(IndicatorColumn::VolumeRatio) else {
        return not_available("volume ratio");
    };
    let quality = if ratio >= th.volume_strong {
        "strong"
    } else if ratio >= th.volume_mild {
        "above average"
    } else if ratio >= th.volume_below_average {
        "below average"
    } else {
        "weak"
    };
    format!("{} ({:.2}x the 20-day average)", quality, ratio)
}

fn describe_volatility(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let price = snapshot.latest_price.value();
    let Some(atr) = snapshot.latest(IndicatorColumn::Atr14).filter(|_| price > 0.0) else {
        return not_available("ATR");
    };
    let pct = atr / price * 100.0;
    let regime = if pct >= th.atr_high_pct {
        "high volatility"
    } else if pct >= th.atr_moderate_pct {
        "moderate volatility"
    } else {
        "low volatility"
    };
    format!("{} (ATR {:.2}, {:.2}% of price)", regime, atr, pct)
}

fn describe_bollinger(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let (Some(mid), Some(upper), Some(lower)) = (
        snapshot.latest(IndicatorColumn::BbMiddle),
        snapshot.latest(IndicatorColumn::BbUpper),
        snapshot.latest(IndicatorColumn::BbLower),
    ) else {
        return not_available("Bollinger bands");
    };
    if mid <= 0.0 {
        return not_available("Bollinger bandwidth");
    }

    let width = (upper - lower) / mid * 100.0;
    let mut text = if width <= th.bb_squeeze_pct {
        format!("squeeze, bandwidth {:.2}%", width)
    } else if width >= th.bb_wide_pct {
        format!("wide bands, bandwidth {:.2}%", width)
    } else {
        format!("bandwidth {:.2}%", width)
    };

    let price = snapshot.latest_price.value();
    if price >= upper {
        text.push_str(", price touching the upper band");
    } else if price <= lower {
        text.push_str(", price touching the lower band");
    }
    text
}

fn describe_rsi(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    match snapshot.latest(IndicatorColumn::Rsi14) {
        Some(rsi) if rsi >= th.rsi_overbought => format!("overbought ({:.1})", rsi),
        Some(rsi) if rsi <= th.rsi_oversold => format!("oversold ({:.1})", rsi),
        Some(rsi) => format!("neutral ({:.1})", rsi),
        None => not_available("RSI"),
    }
}

fn describe_macd(snapshot: &MarketSnapshot) -> String {
    let (Some(line), Some(signal), Some(hist)) = (
        snapshot.latest(IndicatorColumn::Macd),
        snapshot.latest(IndicatorColumn::MacdSignal),
        snapshot.latest(IndicatorColumn::MacdHist),
    ) else {
        return not_available("MACD");
    };

    let bias = if line > signal { "bullish" } else { "bearish" };
    let prev = snapshot.indicators.last_defined(IndicatorColumn::MacdHist, 2);
    let pace = match prev.as_slice() {
        [before, _] if hist.abs() > before.abs() => ", momentum building",
        [_, _] => ", momentum fading",
        _ => "",
    };
    format!("{} (MACD {:.3} vs signal {:.3}, histogram {:.3}{})", bias, line, signal, hist, pace)
}

fn describe_stochastic(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let Some(k) = snapshot.latest(IndicatorColumn::StochK) else {
        return not_available("stochastic");
    };
    let zone = if k >= th.stoch_overbought {
        "overbought"
    } else if k <= th.stoch_oversold {
        "oversold"
    } else {
        "neutral"
    };
    match snapshot.latest(IndicatorColumn::StochD) {
        Some(d) => format!("{} (%K {:.1}, %D {:.1})", zone, k, d),
        None => format!("{} (%K {:.1})", zone, k),
    }
}

fn describe_year_range(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let (Some(lo), Some(hi)) = (
        snapshot.latest(IndicatorColumn::Min52w),
        snapshot.latest(IndicatorColumn::Max52w),
    ) else {
        return not_available("52-week range");
    };
    let price = snapshot.latest_price.value();
    let near = th.proximity_52w_pct / 100.0;

    let position = if price >= hi * (1.0 - near) {
        "near the 52-week high"
    } else if price <= lo * (1.0 + near) {
        "near the 52-week low"
    } else {
        "inside the 52-week range"
    };
    format!("{} ({:.2} - {:.2})", position, lo, hi)
}

fn describe_macro(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let Some(ctx) = snapshot.macro_context.as_ref().filter(|c| !c.correlations.is_empty()) else {
        return not_available("macro correlation");
    };
    ctx.correlations
        .iter()
        .map(|(name, rho)| {
            let strength = if rho.abs() >= th.correlation_strong {
                "strong"
            } else if rho.abs() >= th.correlation_moderate {
                "moderate"
            } else {
                "weak"
            };
            let sign = if *rho >= 0.0 { "positive" } else { "negative" };
            format!("{} {} correlation with {} ({:.2})", strength, sign, name, rho)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_breakouts(snapshot: &MarketSnapshot) -> String {
    if snapshot.breakouts.is_empty() {
        return "no relevant breakout signal".to_string();
    }
    snapshot
        .breakouts
        .values()
        .map(|s| format!("{} near {} (price {})", s.kind.to_string().replace('_', " "), s.reference_level, s.price))
        .collect::<Vec<_>>()
        .join("; ")
}

fn level_list(levels: &[&LevelDetail]) -> String {
    levels
        .iter()
        .map(|d| {
            let broken = if d.has_tag(LevelTag::BrokenResistance) {
                ", former resistance"
            } else {
                ""
            };
            format!("{} (weight {}{})", d.value, d.weight, broken)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_levels(snapshot: &MarketSnapshot, th: &NarratorThresholds) -> String {
    let price = snapshot.latest_price;
    let supports: Vec<_> = snapshot
        .levels
        .supports_below(price)
        .into_iter()
        .take(th.max_levels_listed)
        .collect();
    let resistances: Vec<_> = snapshot
        .levels
        .resistances_above(price)
        .into_iter()
        .take(th.max_levels_listed)
        .collect();

    let supports = if supports.is_empty() {
        "none below price".to_string()
    } else {
        level_list(&supports)
    };
    let resistances = if resistances.is_empty() {
        "none above price".to_string()
    } else {
        level_list(&resistances)
    };
    let broken = snapshot
        .levels
        .supports_tagged(LevelTag::BrokenResistance)
        .count();
    if broken > 0 {
        format!(
            "supports {}; resistances {}; {} former weekly resistance(s) now act as support",
            supports, resistances, broken
        )
    } else {
        format!("supports {}; resistances {}", supports, resistances)
    }
}

fn describe_fibonacci(snapshot: &MarketSnapshot) -> String {
    let Some(fib) = &snapshot.fibonacci else {
        return not_available("Fibonacci swing");
    };
    let levels = fib
        .retracements
        .iter()
        .filter(|l| l.ratio > 0.0 && l.ratio < 1.0)
        .map(|l| format!("{} {}", l.label, l.price))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} from {} ({}) to {} ({}): {}",
        fib.swing(),
        fib.base_high,
        fib.high_date,
        fib.base_low,
        fib.low_date,
        levels
    )
}

fn describe_divergences(snapshot: &MarketSnapshot, config: &AnalysisConfig) -> String {
    let recent = recent_divergences(
        &snapshot.divergences,
        snapshot.latest_date,
        config.divergence.recency_days,
    );
    if recent.is_empty() {
        return "no recent divergence between price and indicators".to_string();
    }
    let skip = recent.len().saturating_sub(config.narrator.max_divergences_listed);
    recent[skip..]
        .iter()
        .map(|d| {
            format!(
                "{} {} divergence on {} (price {}, indicator {:.2})",
                d.kind, d.indicator, d.date, d.price, d.indicator_value
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn summarise(snapshot: &MarketSnapshot, config: &AnalysisConfig) -> String {
    let th = &config.narrator;
    let name = snapshot.symbol.as_deref().unwrap_or("The asset");
    let daily = snapshot.daily_label(snapshot.price_above_sma200());

    let mut sentences = vec![format!(
        "{} closed at {} on {}, in a {} on the daily chart.",
        name, snapshot.latest_price, snapshot.latest_date, daily
    )];

    if let Some(weekly) = snapshot.timeframe_label(Timeframe::Weekly, None) {
        sentences.push(format!("The weekly chart reads {}.", weekly));
    }

    match snapshot.latest(IndicatorColumn::Rsi14) {
        Some(rsi) if rsi >= th.rsi_overbought => sentences.push("RSI warns of an overbought market.".into()),
        Some(rsi) if rsi <= th.rsi_oversold => sentences.push("RSI shows an oversold market.".into()),
        _ => {}
    }

    let price = snapshot.latest_price;
    let support = snapshot.levels.supports_below(price).first().map(|d| d.value);
    let resistance = snapshot.levels.resistances_above(price).first().map(|d| d.value);
    match (support, resistance) {
        (Some(s), Some(r)) => sentences.push(format!("Price trades between support {} and resistance {}.", s, r)),
        (Some(s), None) => sentences.push(format!("Nearest support is {}, with no resistance overhead.", s)),
        (None, Some(r)) => sentences.push(format!("Nearest resistance is {}, with no support underneath.", r)),
        (None, None) => {}
    }

    if let Some(signal) = snapshot.breakouts.values().next() {
        sentences.push(format!(
            "Watch the {} around {}.",
            signal.kind.to_string().replace('_', " "),
            signal.reference_level
        ));
    }

    let recent = recent_divergences(&snapshot.divergences, snapshot.latest_date, config.divergence.recency_days);
    if let Some(last) = recent.last() {
        sentences.push(format!("A {} {} divergence formed on {}.", last.kind, last.indicator, last.date));
    }

    sentences.join(" ")
}

/// Ordered statements plus a closing summary.
pub fn narrate(snapshot: &MarketSnapshot, config: &AnalysisConfig) -> Narrative {
    let th = &config.narrator;
    let statements = vec![
        (Topic::Trend, describe_trend(snapshot)),
        (Topic::MovingAverages, describe_moving_averages(snapshot)),
        (Topic::Volume, describe_volume(snapshot, th)),
        (Topic::Volatility, describe_volatility(snapshot, th)),
        (Topic::Bollinger, describe_bollinger(snapshot, th)),
        (Topic::Rsi, describe_rsi(snapshot, th)),
        (Topic::Macd, describe_macd(snapshot)),
        (Topic::Stochastic, describe_stochastic(snapshot, th)),
        (Topic::YearRange, describe_year_range(snapshot, th)),
        (Topic::Macro, describe_macro(snapshot, th)),
        (Topic::Breakout, describe_breakouts(snapshot)),
        (Topic::Levels, describe_levels(snapshot, th)),
        (Topic::Fibonacci, describe_fibonacci(snapshot)),
        (Topic::Divergences, describe_divergences(snapshot, config)),
    ]
    .into_iter()
    .map(|(topic, text)| Statement { topic, text })
    .collect();

    Narrative {
        statements,
        summary: summarise(snapshot, config),
    }
}
