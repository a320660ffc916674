/// Times `$block` when `DF.log_performance` is on and logs it if it ran past `$threshold_micros`.
#[macro_export]
macro_rules! trace_time {
    // $threshold_micros: 500 for 0.5ms, 20_000 for 20ms
    ($name:expr, $threshold_micros:expr, $block:block) => {{
        if $crate::config::DF.log_performance {
            let start = std::time::Instant::now();
            let result = $block;
            let micros = start.elapsed().as_micros();
            if micros > $threshold_micros {
                let build = if cfg!(debug_assertions) { "debug" } else { "release" };
                log::error!(
                    "Slow section '{}' ({} build): {:.3}ms over a {:.3}ms budget",
                    $name,
                    build,
                    micros as f64 / 1000.0,
                    $threshold_micros as f64 / 1000.0
                );
            }
            result
        } else {
            $block
        }
    }};
}
