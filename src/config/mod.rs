//! Configuration module for the market-snapshot library.

mod analysis;
mod debug;
mod types;

pub use analysis::{
    ANALYSIS, AnalysisConfig, BreakoutConfig, DivergenceConfig, FibonacciConfig, LevelConfig,
    NarratorThresholds, SetupConfig, SwingSource, TrendConfig,
};
pub use debug::{DF, LogFlags};
pub use types::{HighPrice, LowPrice, Price, PriceLike, TolerancePct, VolRatio, Weight};
