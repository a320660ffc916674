// Detectors and primitive indicator math
pub mod breakout;
pub mod divergence;
pub mod extrema;
pub mod fibonacci;
pub mod indicators;
pub mod levels;
pub mod momentum;
pub mod trend;

pub use {
    breakout::breakout_signals,
    divergence::{detect_all_divergences, detect_divergences, recent_divergences},
    extrema::{Pivot, local_maxima, local_minima},
    fibonacci::compute_fibonacci,
    indicators::enrich,
    levels::{consolidate_levels, round_numbers},
    momentum::{MOMENTUM_WINDOWS, rank_momentum, return_correlation},
    trend::{trend_by_timeframe, trend_strength},
};
