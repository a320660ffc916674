//! Debugging feature flags.

pub struct LogFlags {
    /// Per-source candidate counts and merge results in the level consolidator.
    pub log_levels: bool,

    /// Chosen swing anchors and fallbacks.
    pub log_fibonacci: bool,

    /// Every pivot pair that qualifies as a divergence.
    pub log_divergences: bool,

    /// Slopes per timeframe.
    pub log_trend: bool,

    /// Setup predicate outcomes (failures are always logged).
    pub log_setups: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_levels: false,
    log_fibonacci: false,
    log_divergences: false,
    log_trend: false,
    log_setups: false,
    log_performance: false,
};
