use {
    crate::{
        config::{ANALYSIS, DF, PriceLike, SetupConfig},
        domain::Timeframe,
        models::{IndicatorColumn, MarketSnapshot, SetupResult, TrendLabel},
    },
    anyhow::{Result, ensure},
};

/// One independent setup predicate. Returning `Err` never blocks the other rules.
pub trait SetupRule: Send + Sync {
    /// Stable identity, used to name the inactive result when evaluation fails.
    fn id(&self) -> &str;

    fn evaluate(&self, snapshot: &MarketSnapshot, config: &SetupConfig) -> Result<Vec<SetupResult>>;
}

fn ensure_aligned(snapshot: &MarketSnapshot) -> Result<()> {
    ensure!(
        snapshot.indicators.len() == snapshot.series.len(),
        "indicator table has {} rows but the price series has {}",
        snapshot.indicators.len(),
        snapshot.series.len()
    );
    Ok(())
}

/// Collects named conditions and renders the failing ones.
#[derive(Default)]
struct Checklist {
    items: Vec<(&'static str, bool)>,
}

impl Checklist {
    fn check(&mut self, label: &'static str, ok: bool) -> &mut Self {
        self.items.push((label, ok));
        self
    }

    fn all_met(&self) -> bool {
        self.items.iter().all(|(_, ok)| *ok)
    }

    fn missing(&self) -> String {
        self.items
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(label, _)| *label)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================================================
// 1. TREND FOLLOWING
// ============================================================================
pub struct TrendFollowing;

impl SetupRule for TrendFollowing {
    fn id(&self) -> &str {
        "trend_following"
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, config: &SetupConfig) -> Result<Vec<SetupResult>> {
        ensure_aligned(snapshot)?;

        let price = snapshot.latest_price.value();
        let above_sma200 = snapshot.price_above_sma200();
        let daily = snapshot.daily_label(above_sma200);
        let weekly = snapshot.timeframe_label(Timeframe::Weekly, above_sma200);
        let ema21 = snapshot.latest(IndicatorColumn::Ema21);
        let volume_ratio = snapshot.latest(IndicatorColumn::VolumeRatio);

        let mut checks = Checklist::default();
        checks
            .check("daily trend must be a strong uptrend", daily == TrendLabel::StrongUptrend)
            .check(
                "weekly trend must be neutral or better",
                weekly.is_none_or(TrendLabel::is_neutral_or_better),
            )
            .check("price must hold above EMA 21", ema21.is_some_and(|e| price >= e))
            .check(
                "volume must be at or above its 20-day average",
                volume_ratio.is_some_and(|v| v >= config.min_volume_ratio),
            );

        let active = checks.all_met();
        let details = if active {
            "Daily and weekly trends aligned, price above EMA 21, volume at or above average.".to_string()
        } else {
            format!("Waiting: {}.", checks.missing())
        };

        Ok(vec![SetupResult::new(
            "Trend Following",
            "Follow an established uptrend on a shallow pullback.",
            active,
            details,
        )])
    }
}

// ============================================================================
// 2. RSI REBOUND
// ============================================================================
pub struct RsiRebound;

impl SetupRule for RsiRebound {
    fn id(&self) -> &str {
        "rsi_rebound"
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, config: &SetupConfig) -> Result<Vec<SetupResult>> {
        ensure_aligned(snapshot)?;

        const NAME: &str = "RSI Rebound";
        const DESCRIPTION: &str = "Buy when RSI climbs back out of the oversold zone.";

        let window = config.rsi_lookback_bars.max(1) + 1;
        let rsi = snapshot.indicators.last_defined(IndicatorColumn::Rsi14, window);
        let Some(&now) = rsi.last().filter(|_| rsi.len() >= 2) else {
            return Ok(vec![SetupResult::new(
                NAME,
                DESCRIPTION,
                false,
                "Not enough RSI history to evaluate the cross.",
            )]);
        };

        let crossed_up = rsi
            .windows(2)
            .any(|w| w[0] <= config.rsi_oversold && w[1] > config.rsi_oversold);
        let in_band = now > config.rsi_oversold && now <= config.rsi_rebound_ceiling;
        let weekly = snapshot
            .timeframe_label(Timeframe::Weekly, None)
            .unwrap_or(TrendLabel::Sideways);

        let mut checks = Checklist::default();
        checks
            .check("RSI must cross up through the oversold line", crossed_up)
            .check("RSI must sit inside the rebound band", in_band)
            .check("weekly trend must not be a strong downtrend", weekly != TrendLabel::StrongDowntrend);

        let active = checks.all_met();
        let details = if active {
            format!("RSI left the oversold zone ({:.1}) and the weekly trend is not strongly bearish.", now)
        } else {
            format!("Waiting: {} (RSI {:.1}).", checks.missing(), now)
        };

        Ok(vec![SetupResult::new(NAME, DESCRIPTION, active, details)])
    }
}

// ============================================================================
// 3. MOVING-AVERAGE CROSSOVER
// ============================================================================
pub struct MaCrossover {
    id: String,
    short: IndicatorColumn,
    long: IndicatorColumn,
}

impl MaCrossover {
    pub fn new(short: IndicatorColumn, long: IndicatorColumn) -> Self {
        Self {
            id: format!("ma_cross_{}_{}", short, long).to_lowercase(),
            short,
            long,
        }
    }

    fn span_label(column: IndicatorColumn) -> String {
        column.to_string().rsplit('_').next().unwrap_or_default().to_string()
    }
}

impl SetupRule for MaCrossover {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _config: &SetupConfig) -> Result<Vec<SetupResult>> {
        ensure_aligned(snapshot)?;

        let n = snapshot.indicators.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let diff_at = |i: usize| -> Option<f64> {
            Some(snapshot.indicators.value_at(self.short, i)? - snapshot.indicators.value_at(self.long, i)?)
        };
        let (Some(prev), Some(latest)) = (diff_at(n - 2), diff_at(n - 1)) else {
            return Ok(Vec::new());
        };

        let daily = snapshot.daily_label(None);
        let (s, l) = (Self::span_label(self.short), Self::span_label(self.long));
        let pair = format!("EMA Cross ({} x {})", s, l);

        let mut results = Vec::new();
        if prev <= 0.0 && latest > 0.0 {
            let active = daily.is_uptrend();
            results.push(SetupResult::new(
                format!("{} buy", pair),
                format!("EMA {} crossing above EMA {}.", s, l),
                active,
                if active {
                    "Buy cross confirmed by the daily trend."
                } else {
                    "Buy cross, but the daily trend does not agree."
                },
            ));
        }
        if prev >= 0.0 && latest < 0.0 {
            let active = daily.is_downtrend();
            results.push(SetupResult::new(
                format!("{} sell", pair),
                format!("EMA {} crossing below EMA {}.", s, l),
                active,
                if active {
                    "Sell cross aligned with the daily trend."
                } else {
                    "Sell cross, but the daily trend is not bearish."
                },
            ));
        }
        Ok(results)
    }
}

/// Evaluates a list of rules in isolation from one another.
pub struct SetupEngine {
    rules: Vec<Box<dyn SetupRule>>,
    config: SetupConfig,
}

impl Default for SetupEngine {
    fn default() -> Self {
        Self::new(ANALYSIS.setups)
    }
}

impl SetupEngine {
    /// Engine with the standard rule set.
    pub fn new(config: SetupConfig) -> Self {
        Self::empty(config)
            .with_rule(TrendFollowing)
            .with_rule(RsiRebound)
            .with_rule(MaCrossover::new(IndicatorColumn::Ema9, IndicatorColumn::Ema21))
            .with_rule(MaCrossover::new(IndicatorColumn::Ema21, IndicatorColumn::Ema72))
    }

    pub fn empty(config: SetupConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    pub fn with_rule(mut self, rule: impl SetupRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn evaluate(&self, snapshot: &MarketSnapshot) -> Vec<SetupResult> {
        let mut results = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(snapshot, &self.config) {
                Ok(found) => results.extend(found),
                Err(e) => {
                    log::warn!("Setup rule '{}' failed: {:#}", rule.id(), e);
                    results.push(SetupResult::failed(rule.id(), &e));
                }
            }
        }

        if DF.log_setups {
            for r in &results {
                log::info!("Setup {} active={} :: {}", r.name, r.active, r.details);
            }
        }
        results
    }
}

pub fn evaluate_setups(snapshot: &MarketSnapshot, config: &SetupConfig) -> Vec<SetupResult> {
    SetupEngine::new(config.clone()).evaluate(snapshot)
}
