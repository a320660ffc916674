mod divergence;
mod error;
mod fibonacci;
mod indicators;
mod levels;
mod momentum;
mod ohlcv;
mod setup;
mod snapshot;
mod trend;

pub use {
    divergence::{DivergenceIndicator, DivergenceKind, DivergenceSignal},
    error::SnapshotError,
    fibonacci::{FibLevel, FibonacciLevels, SwingDirection},
    indicators::{IndicatorColumn, IndicatorRow, IndicatorTable},
    levels::{LevelDetail, LevelTag, PriceLevels},
    momentum::MomentumScore,
    ohlcv::{PriceSeries, RawBar},
    setup::SetupResult,
    snapshot::{MacroContext, MarketSnapshot},
    trend::{BreakoutKind, BreakoutSignal, MaStack, TrendDirection, TrendLabel, TrendSnapshot},
};
